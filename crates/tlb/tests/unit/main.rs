//! # TLB Unit Tests
//!
//! Tests for the individual building blocks: address decomposition,
//! geometry configuration, the translator adapters and the TLB operations.



/// Closure adapter and reference page table.
mod translator;

/// `clear`, `peek` and `translate` on small hand-built scenarios.
mod tlb_ops;
