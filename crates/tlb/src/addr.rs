use std::fmt;

use crate::config::TlbConfig;
use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    #[inline(always)]
    pub fn new(addr: u64) -> Self {
        Self(addr)
    }

    #[inline(always)]
    pub fn val(&self) -> u64 {
        self.0
    }
}

impl PhysAddr {
    #[inline(always)]
    pub fn new(addr: u64) -> Self {
        Self(addr)
    }

    #[inline(always)]
    pub fn val(&self) -> u64 {
        self.0
    }
}

impl fmt::LowerHex for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Splits an address into `| tag | set index | page offset |`.
///
/// The offset width comes from the configured page size, never from the
/// size of a cache line record. Every TLB operation goes through the same
/// layout so lookups and fills always agree on the set and tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressLayout {
    offset_bits: u32,
    index_bits: u32,
    tag_bits: u32,
    set_mask: u64,
    offset_mask: u64,
}

impl AddressLayout {
    /// Validates `config` and derives the field widths from it.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the geometry does not validate.
    pub fn new(config: &TlbConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let offset_bits = config.page_size.trailing_zeros();
        let index_bits = config.sets.trailing_zeros();
        Ok(Self {
            offset_bits,
            index_bits,
            tag_bits: config.address_bits - offset_bits - index_bits,
            set_mask: (config.sets as u64) - 1,
            offset_mask: config.page_size - 1,
        })
    }

    #[inline(always)]
    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    #[inline(always)]
    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    #[inline(always)]
    pub fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// `(va >> offset_bits) mod sets`
    #[inline(always)]
    pub fn set_index(&self, va: VirtAddr) -> usize {
        ((va.val() >> self.offset_bits) & self.set_mask) as usize
    }

    /// `va >> (offset_bits + index_bits)`
    #[inline(always)]
    pub fn tag(&self, va: VirtAddr) -> u64 {
        va.val() >> (self.offset_bits + self.index_bits)
    }

    #[inline(always)]
    pub fn page_offset(&self, va: VirtAddr) -> u64 {
        va.val() & self.offset_mask
    }

    /// Physical page frame: `pa` with its offset bits cleared.
    #[inline(always)]
    pub fn frame(&self, pa: PhysAddr) -> u64 {
        pa.val() & !self.offset_mask
    }

    /// Re-applies the offset of `va` to a stored frame.
    #[inline(always)]
    pub fn compose(&self, frame: u64, va: VirtAddr) -> PhysAddr {
        PhysAddr::new(frame | self.page_offset(va))
    }
}
