use std::fmt;
use std::io;

use crate::addr::VirtAddr;

/// The translation collaborator has no mapping for the requested address.
///
/// This is a normal outcome of [`SetAssociativeTlb::translate`], not a
/// fault: the TLB is left untouched and the miss is handed straight back.
///
/// [`SetAssociativeTlb::translate`]: crate::SetAssociativeTlb::translate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TranslationMiss {
    pub va: VirtAddr,
}

impl fmt::Display for TranslationMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no translation for virtual address {:#x}", self.va.val())
    }
}

impl std::error::Error for TranslationMiss {}

/// Rejected or unreadable TLB configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// `sets` must be a non-zero power of two.
    InvalidSets(usize),
    /// `ways` must be non-zero.
    InvalidWays(usize),
    /// `sets * ways` does not fit in a `usize`.
    TooManyLines { sets: usize, ways: usize },
    /// `page_size` must be a non-zero power of two.
    InvalidPageSize(u64),
    /// `address_bits` must be in `1..=64`.
    InvalidAddressBits(u32),
    /// Offset and set-index fields leave no room for a tag.
    NoTagBits {
        offset_bits: u32,
        index_bits: u32,
        address_bits: u32,
    },
    Parse(serde_json::Error),
    Io(io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSets(n) => {
                write!(f, "sets must be a non-zero power of two, got {}", n)
            }
            ConfigError::InvalidWays(n) => write!(f, "ways must be non-zero, got {}", n),
            ConfigError::TooManyLines { sets, ways } => {
                write!(f, "{} sets x {} ways overflows the line table", sets, ways)
            }
            ConfigError::InvalidPageSize(n) => {
                write!(f, "page_size must be a non-zero power of two, got {:#x}", n)
            }
            ConfigError::InvalidAddressBits(n) => {
                write!(f, "address_bits must be between 1 and 64, got {}", n)
            }
            ConfigError::NoTagBits {
                offset_bits,
                index_bits,
                address_bits,
            } => write!(
                f,
                "{} offset bits + {} index bits leave no tag bits in a {}-bit address",
                offset_bits, index_bits, address_bits
            ),
            ConfigError::Parse(e) => write!(f, "invalid config: {}", e),
            ConfigError::Io(e) => write!(f, "could not read config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}
