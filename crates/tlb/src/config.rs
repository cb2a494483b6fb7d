use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

pub const DEFAULT_SETS: usize = 16;
pub const DEFAULT_WAYS: usize = 4;
pub const DEFAULT_PAGE_SIZE: u64 = 0x1000;
pub const DEFAULT_ADDRESS_BITS: u32 = 64;

/// Geometry of a [`SetAssociativeTlb`](crate::SetAssociativeTlb).
///
/// Fixed at construction. Missing JSON fields fall back to the reference
/// geometry: 16 sets × 4 ways, 4 KiB pages, 64-bit addresses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TlbConfig {
    pub sets: usize,
    pub ways: usize,
    pub page_size: u64,
    pub address_bits: u32,
}

impl Default for TlbConfig {
    fn default() -> Self {
        Self {
            sets: DEFAULT_SETS,
            ways: DEFAULT_WAYS,
            page_size: DEFAULT_PAGE_SIZE,
            address_bits: DEFAULT_ADDRESS_BITS,
        }
    }
}

impl TlbConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: TlbConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sets.is_power_of_two() {
            return Err(ConfigError::InvalidSets(self.sets));
        }
        if self.ways == 0 || self.ways >= u32::MAX as usize {
            return Err(ConfigError::InvalidWays(self.ways));
        }
        if self.sets.checked_mul(self.ways).is_none() {
            return Err(ConfigError::TooManyLines {
                sets: self.sets,
                ways: self.ways,
            });
        }
        if !self.page_size.is_power_of_two() {
            return Err(ConfigError::InvalidPageSize(self.page_size));
        }
        if self.address_bits == 0 || self.address_bits > 64 {
            return Err(ConfigError::InvalidAddressBits(self.address_bits));
        }

        let offset_bits = self.page_size.trailing_zeros();
        let index_bits = self.sets.trailing_zeros();
        if offset_bits + index_bits >= self.address_bits {
            return Err(ConfigError::NoTagBits {
                offset_bits,
                index_bits,
                address_bits: self.address_bits,
            });
        }
        Ok(())
    }
}
