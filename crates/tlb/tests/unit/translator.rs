use rstest::rstest;
use tlbsim::{
    PhysAddr, ReferencePageTable, SetAssociativeTlb, TlbConfig, Translator, VirtAddr,
    translator_fn,
};

#[test]
fn test_reference_page_table() {
    let mut t = ReferencePageTable::default();
    assert_eq!(t.translate(VirtAddr::new(0)), Some(PhysAddr::new(0x20000)));
    assert_eq!(
        t.translate(VirtAddr::new(0x123_3fff)),
        Some(PhysAddr::new(0x125_3fff))
    );
    assert_eq!(t.translate(VirtAddr::new(0x123_4000)), None);
    assert_eq!(t.translate(VirtAddr::new(0xA000_1200)), None);
}

#[test]
fn test_reference_page_table_does_not_overflow() {
    let mut t = ReferencePageTable::new(u64::MAX, 0x2_0000);
    assert_eq!(t.translate(VirtAddr::new(u64::MAX - 1)), None);
}

#[test]
fn test_closure_translator() {
    let mut calls = 0;
    {
        let mut t = translator_fn(|va: VirtAddr| {
            calls += 1;
            (va.val() % 2 == 0).then(|| PhysAddr::new(va.val() << 1))
        });
        assert_eq!(t.translate(VirtAddr::new(4)), Some(PhysAddr::new(8)));
        assert_eq!(t.translate(VirtAddr::new(5)), None);
    }
    assert_eq!(calls, 2);
}

fn translate_with<T: Translator>(mut t: T, va: u64) -> Option<PhysAddr> {
    t.translate(VirtAddr::new(va))
}

#[test]
fn test_borrowed_and_boxed_translators() {
    let mut table = ReferencePageTable::default();
    assert_eq!(translate_with(&mut table, 0x1000), Some(PhysAddr::new(0x21000)));

    let boxed: Box<dyn Translator> = Box::new(ReferencePageTable::new(0x1000, 0x10));
    assert_eq!(translate_with(boxed, 0x0fff), Some(PhysAddr::new(0x100f)));
}

#[rstest]
#[case(0x2_0000, 0x1000, true)]
#[case(0x0, 0x1000, true)]
#[case(0x10, 0x1000, false)]
#[case(0x1800, 0x1000, false)]
#[case(0x1000, 0x2000, false)]
#[case(0x1000, 0, false)]
fn test_preserves_offset(#[case] displacement: u64, #[case] page_size: u64, #[case] ok: bool) {
    let t = ReferencePageTable::new(0x1_0000, displacement);
    assert_eq!(t.preserves_offset(page_size), ok);
}

#[test]
fn test_aligned_displacement_matches_translator_through_tlb() {
    let table = ReferencePageTable::new(0x10_0000, 0x5000);
    assert!(table.preserves_offset(0x1000));
    let mut oracle = table;
    let mut tlb = SetAssociativeTlb::new(TlbConfig::default(), table).unwrap();
    for addr in [0x0, 0x10, 0xfff, 0x10, 0x3_4567, 0x3_4000] {
        let va = VirtAddr::new(addr);
        assert_eq!(tlb.translate(va).ok(), oracle.translate(va));
    }
}
