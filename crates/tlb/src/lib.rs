//! Set-associative Translation Lookaside Buffer model.
//!
//! The TLB memoizes the results of an external virtual-to-physical
//! translation function (see [`Translator`]) in a fixed `sets × ways` table
//! of cache lines, replacing entries with strict per-set LRU.
//!
//! ```
//! use tlbsim::{ReferencePageTable, SetAssociativeTlb, TlbConfig, VirtAddr};
//!
//! let mut tlb = SetAssociativeTlb::new(TlbConfig::default(), ReferencePageTable::default())?;
//! assert_eq!(tlb.peek(VirtAddr::new(0)), 0);
//! assert_eq!(tlb.translate(VirtAddr::new(0))?.val(), 0x20000);
//! assert_eq!(tlb.peek(VirtAddr::new(0)), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Virtual/physical address types and the tag/set-index/offset split.
pub mod addr;
/// TLB geometry configuration.
pub mod config;
/// Error types.
pub mod error;
/// The reference harness trace.
pub mod selftest;
/// Hit/miss/eviction counters.
pub mod stats;
/// The set-associative TLB itself.
pub mod tlb;
/// The external translation collaborator.
pub mod translator;

pub use self::addr::{AddressLayout, PhysAddr, VirtAddr};
pub use self::config::TlbConfig;
pub use self::error::{ConfigError, TranslationMiss};
pub use self::stats::TlbStats;
pub use self::tlb::{CacheLine, SetAssociativeTlb};
pub use self::translator::{FnTranslator, ReferencePageTable, Translator, translator_fn};
