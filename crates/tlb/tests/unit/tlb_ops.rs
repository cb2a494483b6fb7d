use pretty_assertions::assert_eq;
use tlbsim::{
    PhysAddr, ReferencePageTable, SetAssociativeTlb, TlbConfig, TlbStats, TranslationMiss,
    VirtAddr,
};

fn va(addr: u64) -> VirtAddr {
    VirtAddr::new(addr)
}

fn reference_tlb() -> SetAssociativeTlb<ReferencePageTable> {
    SetAssociativeTlb::new(TlbConfig::default(), ReferencePageTable::default()).unwrap()
}

/// Page `n` of set 1 under the reference geometry.
fn set1_page(n: u64) -> u64 {
    (n << 16) | 0x1000
}

#[test]
fn test_new_tlb_is_empty() {
    let tlb = reference_tlb();
    assert_eq!(tlb.lines().len(), 16 * 4);
    assert!(tlb.lines().iter().all(|l| !l.is_valid()));
    assert_eq!(tlb.peek(va(0)), 0);
    assert_eq!(*tlb.stats(), TlbStats::default());
}

#[test]
fn test_new_rejects_invalid_geometry() {
    let config = TlbConfig {
        sets: 6,
        ..TlbConfig::default()
    };
    assert!(SetAssociativeTlb::new(config, ReferencePageTable::default()).is_err());

    let config = TlbConfig {
        sets: 1 << (usize::BITS - 1),
        ways: 2,
        ..TlbConfig::default()
    };
    assert!(SetAssociativeTlb::new(config, ReferencePageTable::default()).is_err());
}

#[test]
fn test_miss_then_hit() {
    let mut tlb = reference_tlb();
    assert_eq!(tlb.translate(va(0)), Ok(PhysAddr::new(0x20000)));
    assert_eq!(tlb.peek(va(0)), 1);
    assert_eq!(tlb.stats().misses, 1);
    assert_eq!(tlb.stats().fills, 1);

    // Same page, different offset: a hit with the new offset applied.
    assert_eq!(tlb.translate(va(0x200)), Ok(PhysAddr::new(0x20200)));
    assert_eq!(tlb.stats().hits, 1);
    assert_eq!(tlb.peek(va(0xfff)), 1);
}

#[test]
fn test_stored_entry_is_page_frame() {
    let mut tlb = reference_tlb();
    tlb.translate(va(0x30_1800)).unwrap();
    let line = tlb.set(1).iter().find(|l| l.is_valid()).unwrap();
    assert_eq!(line.tag(), 0x30);
    assert_eq!(line.frame(), 0x32_1000);
    assert_eq!(line.lru_rank(), 1);
}

#[test]
fn test_fill_ranks() {
    let mut tlb = reference_tlb();
    for n in 0..4 {
        tlb.translate(va(set1_page(n))).unwrap();
    }
    assert_eq!(tlb.peek(va(set1_page(0))), 4);
    assert_eq!(tlb.peek(va(set1_page(1))), 3);
    assert_eq!(tlb.peek(va(set1_page(2))), 2);
    assert_eq!(tlb.peek(va(set1_page(3))), 1);
    assert_eq!(tlb.stats().fills, 4);
    assert_eq!(tlb.stats().evictions, 0);
}

#[test]
fn test_hit_only_shifts_more_recent_lines() {
    let mut tlb = reference_tlb();
    for n in 0..4 {
        tlb.translate(va(set1_page(n))).unwrap();
    }
    // Ranks: p3=1 p2=2 p1=3 p0=4. Hitting p1 moves p3 and p2 down, p0 stays.
    tlb.translate(va(set1_page(1))).unwrap();
    assert_eq!(tlb.peek(va(set1_page(1))), 1);
    assert_eq!(tlb.peek(va(set1_page(3))), 2);
    assert_eq!(tlb.peek(va(set1_page(2))), 3);
    assert_eq!(tlb.peek(va(set1_page(0))), 4);

    // Hitting the MRU line changes nothing.
    tlb.translate(va(set1_page(1))).unwrap();
    assert_eq!(tlb.peek(va(set1_page(1))), 1);
    assert_eq!(tlb.peek(va(set1_page(3))), 2);
}

#[test]
fn test_eviction_replaces_lru_only() {
    let mut tlb = reference_tlb();
    for n in 0..4 {
        tlb.translate(va(set1_page(n))).unwrap();
    }
    let before: Vec<_> = tlb.set(1).to_vec();

    tlb.translate(va(set1_page(9))).unwrap();
    assert_eq!(tlb.peek(va(set1_page(0))), 0);
    assert_eq!(tlb.peek(va(set1_page(9))), 1);
    assert_eq!(tlb.peek(va(set1_page(3))), 2);
    assert_eq!(tlb.peek(va(set1_page(2))), 3);
    assert_eq!(tlb.peek(va(set1_page(1))), 4);
    assert_eq!(tlb.stats().evictions, 1);

    let changed: Vec<usize> = (0..4)
        .filter(|&w| tlb.set(1)[w].tag() != before[w].tag())
        .collect();
    assert_eq!(changed.len(), 1);
    assert_eq!(before[changed[0]].tag(), 0);
}

#[test]
fn test_sets_are_independent() {
    let mut tlb = reference_tlb();
    for n in 0..6 {
        tlb.translate(va(set1_page(n))).unwrap();
    }
    tlb.translate(va(0x2000)).unwrap();
    assert_eq!(tlb.peek(va(0x2000)), 1);
    assert_eq!(tlb.peek(va(set1_page(5))), 1);
    assert!(tlb.set(2)[1..].iter().all(|l| !l.is_valid()));
}

#[test]
fn test_failed_translation_leaves_lines_untouched() {
    let mut tlb = reference_tlb();
    tlb.translate(va(0x1200)).unwrap();
    let before = tlb.lines().to_vec();

    let err = tlb.translate(va(0xA000_1200)).unwrap_err();
    assert_eq!(err, TranslationMiss { va: va(0xA000_1200) });
    assert_eq!(tlb.lines(), &before[..]);
    assert_eq!(tlb.peek(va(0x1200)), 1);
    assert_eq!(tlb.stats().faults, 1);
    assert_eq!(tlb.stats().misses, 1 + 1);
}

#[test]
fn test_clear() {
    let mut tlb = reference_tlb();
    for addr in [0x0, 0x1000, 0x10_1000, 0xF000] {
        tlb.translate(va(addr)).unwrap();
    }
    tlb.clear();
    assert!(tlb.lines().iter().all(|l| !l.is_valid()));
    for addr in [0x0, 0x1000, 0x10_1000, 0xF000] {
        assert_eq!(tlb.peek(va(addr)), 0);
    }
    // Stats survive a clear.
    assert_eq!(tlb.stats().misses, 4);

    tlb.clear();
    assert!(tlb.lines().iter().all(|l| !l.is_valid()));

    // Refill after clear starts from rank 1 again.
    tlb.translate(va(0x1000)).unwrap();
    assert_eq!(tlb.peek(va(0x1000)), 1);
}

#[test]
fn test_reset_stats() {
    let mut tlb = reference_tlb();
    tlb.translate(va(0)).unwrap();
    tlb.translate(va(0)).unwrap();
    assert_eq!(tlb.stats().accesses(), 2);
    assert_eq!(tlb.stats().hit_rate(), 0.5);
    tlb.reset_stats();
    assert_eq!(*tlb.stats(), TlbStats::default());
    assert_eq!(tlb.peek(va(0)), 1);
}

#[test]
fn test_direct_mapped() {
    let config = TlbConfig {
        ways: 1,
        ..TlbConfig::default()
    };
    let mut tlb = SetAssociativeTlb::new(config, ReferencePageTable::default()).unwrap();
    tlb.translate(va(0x1000)).unwrap();
    tlb.translate(va(0x1_1000)).unwrap();
    assert_eq!(tlb.peek(va(0x1000)), 0);
    assert_eq!(tlb.peek(va(0x1_1000)), 1);
}

#[test]
fn test_debug_dump_lists_valid_lines() {
    let mut tlb = reference_tlb();
    tlb.translate(va(0x30_1800)).unwrap();
    let dump = format!("{:?}", tlb);
    assert!(dump.contains("16 sets x 4 ways"));
    assert!(dump.contains("Set 1:"));
    assert!(dump.contains("tag=0x30 frame=0x321000 rank=1"));
    assert!(!dump.contains("Set 0:"));
}

#[test]
fn test_into_translator() {
    let tlb = reference_tlb();
    assert_eq!(tlb.into_translator(), ReferencePageTable::default());
}
