use crate::addr::{PhysAddr, VirtAddr};

/// The page-table walker (or any other oracle) consulted on a TLB miss.
///
/// Returning `None` means the address has no mapping. Implementations are
/// expected to be deterministic for a fixed mapping table; the TLB never
/// looks at anything but the return value.
///
/// Mappings must preserve the page offset: for every mapped `va`, the low
/// `log2(page_size)` bits of the result equal those of `va`. The TLB caches
/// one frame per page and re-applies each request's offset to it, so a
/// translator that moves addresses within a page is answered wrongly on
/// every hit and miss.
pub trait Translator {
    fn translate(&mut self, va: VirtAddr) -> Option<PhysAddr>;
}

impl<T: Translator + ?Sized> Translator for &mut T {
    fn translate(&mut self, va: VirtAddr) -> Option<PhysAddr> {
        (**self).translate(va)
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(&mut self, va: VirtAddr) -> Option<PhysAddr> {
        (**self).translate(va)
    }
}

/// Adapts a closure into a [`Translator`]. See [`translator_fn`].
#[derive(Clone)]
pub struct FnTranslator<F> {
    f: F,
}

pub fn translator_fn<F>(f: F) -> FnTranslator<F>
where
    F: FnMut(VirtAddr) -> Option<PhysAddr>,
{
    FnTranslator { f }
}

impl<F> Translator for FnTranslator<F>
where
    F: FnMut(VirtAddr) -> Option<PhysAddr>,
{
    fn translate(&mut self, va: VirtAddr) -> Option<PhysAddr> {
        (self.f)(va)
    }
}

/// Flat page table used by the reference harness: every address below
/// `limit` maps to `va + displacement`, everything else is unmapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferencePageTable {
    pub limit: u64,
    pub displacement: u64,
}

impl ReferencePageTable {
    pub const LIMIT: u64 = 0x123_4000;
    pub const DISPLACEMENT: u64 = 0x2_0000;

    pub fn new(limit: u64, displacement: u64) -> Self {
        Self {
            limit,
            displacement,
        }
    }

    /// Whether the displacement keeps page offsets intact for `page_size`.
    pub fn preserves_offset(&self, page_size: u64) -> bool {
        page_size.is_power_of_two() && self.displacement & (page_size - 1) == 0
    }
}

impl Default for ReferencePageTable {
    fn default() -> Self {
        Self::new(Self::LIMIT, Self::DISPLACEMENT)
    }
}

impl Translator for ReferencePageTable {
    fn translate(&mut self, va: VirtAddr) -> Option<PhysAddr> {
        if va.val() < self.limit {
            va.val().checked_add(self.displacement).map(PhysAddr::new)
        } else {
            None
        }
    }
}
