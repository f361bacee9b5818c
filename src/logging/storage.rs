//! Storage modes
//!
//! Bitmask of enabled output destinations. Flags are independent and any
//! combination may be active at once.

use crate::error::DispatchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// A single output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageMode {
    Console,
    File,
    Gui,
    Network,
    Database,
}

impl StorageMode {
    /// All modes in fan-out order
    pub const ALL: [StorageMode; 5] = [
        StorageMode::Console,
        StorageMode::File,
        StorageMode::Gui,
        StorageMode::Network,
        StorageMode::Database,
    ];

    #[inline]
    fn bit(self) -> u8 {
        match self {
            StorageMode::Console => 0x01,
            StorageMode::File => 0x02,
            StorageMode::Gui => 0x04,
            StorageMode::Network => 0x08,
            StorageMode::Database => 0x10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StorageMode::Console => "console",
            StorageMode::File => "file",
            StorageMode::Gui => "gui",
            StorageMode::Network => "network",
            StorageMode::Database => "database",
        }
    }
}

impl FromStr for StorageMode {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(StorageMode::Console),
            "file" => Ok(StorageMode::File),
            "gui" => Ok(StorageMode::Gui),
            "network" => Ok(StorageMode::Network),
            "database" => Ok(StorageMode::Database),
            _ => Err(DispatchError::UnknownStorageMode { name: s.to_string() }),
        }
    }
}

/// Set of enabled storage modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct StorageModes(u8);

impl StorageModes {
    pub const NONE: StorageModes = StorageModes(0);
    pub const CONSOLE: StorageModes = StorageModes(0x01);
    pub const FILE: StorageModes = StorageModes(0x02);
    pub const GUI: StorageModes = StorageModes(0x04);
    pub const NETWORK: StorageModes = StorageModes(0x08);
    pub const DATABASE: StorageModes = StorageModes(0x10);
    pub const ALL: StorageModes = StorageModes(0x1f);

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits, ignoring undeclared ones
    #[inline]
    pub fn from_bits_truncate(bits: u8) -> Self {
        StorageModes(bits & Self::ALL.0)
    }

    #[inline]
    pub fn contains(self, mode: StorageMode) -> bool {
        self.0 & mode.bit() != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, mode: StorageMode) {
        self.0 |= mode.bit();
    }

    pub fn remove(&mut self, mode: StorageMode) {
        self.0 &= !mode.bit();
    }

    /// Active modes in fan-out order
    pub fn iter(self) -> impl Iterator<Item = StorageMode> {
        StorageMode::ALL
            .into_iter()
            .filter(move |mode| self.contains(*mode))
    }
}

impl From<StorageMode> for StorageModes {
    fn from(mode: StorageMode) -> Self {
        StorageModes(mode.bit())
    }
}

impl FromIterator<StorageMode> for StorageModes {
    fn from_iter<I: IntoIterator<Item = StorageMode>>(iter: I) -> Self {
        let mut modes = StorageModes::NONE;
        for mode in iter {
            modes.insert(mode);
        }
        modes
    }
}

impl BitOr for StorageModes {
    type Output = StorageModes;

    fn bitor(self, rhs: StorageModes) -> StorageModes {
        StorageModes(self.0 | rhs.0)
    }
}

impl BitOr<StorageMode> for StorageModes {
    type Output = StorageModes;

    fn bitor(self, rhs: StorageMode) -> StorageModes {
        StorageModes(self.0 | rhs.bit())
    }
}

impl BitOrAssign for StorageModes {
    fn bitor_assign(&mut self, rhs: StorageModes) {
        self.0 |= rhs.0;
    }
}

/// Parses a comma-separated list such as `console,gui`
impl FromStr for StorageModes {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<StorageMode>)
            .collect()
    }
}

impl fmt::Display for StorageModes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(StorageMode::name).collect();
        f.write_str(&names.join(","))
    }
}

impl TryFrom<Vec<String>> for StorageModes {
    type Error = DispatchError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        names.iter().map(|n| n.parse::<StorageMode>()).collect()
    }
}

impl From<StorageModes> for Vec<String> {
    fn from(modes: StorageModes) -> Self {
        modes.iter().map(|m| m.name().to_string()).collect()
    }
}
