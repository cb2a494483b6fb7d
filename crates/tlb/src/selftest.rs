//! The reference harness as data.
//!
//! [`REFERENCE_TRACE`] runs against a 16 × 4 TLB with 4 KiB pages in front of
//! [`ReferencePageTable`](crate::ReferencePageTable). It walks one set
//! (set 1) through fill, eviction of the two oldest tags, a rejected
//! translation and a hit promotion, checking `peek` ranks along the way.

use serde::Serialize;

use crate::addr::VirtAddr;
use crate::tlb::SetAssociativeTlb;
use crate::translator::Translator;

/// One operation of a trace, with its expected outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Clear,
    /// Expect `peek(va)` to return the given rank.
    Peek(u64, u32),
    /// Expect `translate(va)` to return the given address, or a miss on `None`.
    Translate(u64, Option<u64>),
}

/// The reference harness assertions, in order.
pub const REFERENCE_TRACE: &[Step] = &[
    Step::Clear,
    Step::Peek(0x0, 0),
    Step::Translate(0x0, Some(0x20000)),
    Step::Peek(0x0, 1),
    Step::Translate(0x200, Some(0x20200)),
    Step::Peek(0x0, 1),
    Step::Peek(0x200, 1),
    Step::Translate(0x1200, Some(0x21200)),
    Step::Translate(0x5200, Some(0x25200)),
    Step::Translate(0x8200, Some(0x28200)),
    Step::Translate(0x2200, Some(0x22200)),
    Step::Peek(0x1000, 1),
    Step::Peek(0x5000, 1),
    Step::Peek(0x8000, 1),
    Step::Peek(0x2000, 1),
    Step::Peek(0x0000, 1),
    Step::Translate(0x10_1200, Some(0x12_1200)),
    Step::Translate(0x80_1200, Some(0x82_1200)),
    Step::Translate(0x30_1200, Some(0x32_1200)),
    Step::Translate(0x50_1200, Some(0x52_1200)),
    Step::Translate(0xA0_1200, Some(0xA2_1200)),
    Step::Translate(0xA000_1200, None),
    Step::Peek(0x00_1200, 0),
    Step::Peek(0x10_1200, 0),
    Step::Peek(0x30_1200, 3),
    Step::Peek(0x50_1200, 2),
    Step::Peek(0x80_1200, 4),
    Step::Peek(0xA0_1200, 1),
    Step::Translate(0x30_1800, Some(0x32_1800)),
    Step::Peek(0x00_1000, 0),
    Step::Peek(0x10_1000, 0),
    Step::Peek(0x30_1000, 1),
    Step::Peek(0x50_1000, 3),
    Step::Peek(0x80_1000, 4),
    Step::Peek(0xA0_1000, 2),
];

/// Outcome of a single `Peek` or `Translate` step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckResult {
    pub step: usize,
    pub op: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

/// Every check recorded by [`run`], in trace order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SelfTestReport {
    pub checks: Vec<CheckResult>,
}

impl SelfTestReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

fn describe(result: Option<u64>) -> String {
    match result {
        Some(pa) => format!("{:#x}", pa),
        None => "miss".to_string(),
    }
}

/// Replays `trace` against `tlb`, recording every check. `Clear` steps
/// produce no check.
pub fn run<T: Translator>(tlb: &mut SetAssociativeTlb<T>, trace: &[Step]) -> SelfTestReport {
    let mut report = SelfTestReport::default();
    for (step, op) in trace.iter().enumerate() {
        match *op {
            Step::Clear => tlb.clear(),
            Step::Peek(va, expected) => {
                let actual = tlb.peek(VirtAddr::new(va));
                report.checks.push(CheckResult {
                    step,
                    op: format!("peek({:#x})", va),
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                    passed: actual == expected,
                });
            }
            Step::Translate(va, expected) => {
                let actual = tlb.translate(VirtAddr::new(va)).ok().map(|pa| pa.val());
                report.checks.push(CheckResult {
                    step,
                    op: format!("translate({:#x})", va),
                    expected: describe(expected),
                    actual: describe(actual),
                    passed: actual == expected,
                });
            }
        }
    }
    report
}
