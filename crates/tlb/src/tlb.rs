//! Set-associative TLB with strict per-set LRU replacement.
//!
//! Lines are stored set-major in one flat table: set `s` occupies
//! `lines[s * ways .. (s + 1) * ways]`. Each valid line carries an LRU rank
//! (1 = most recently used); the ranks of the valid lines in a set always
//! form `1..=k` for `k` valid lines. Invalid lines carry no meaningful rank.

use log::{debug, trace};
use std::fmt;

use crate::addr::{AddressLayout, PhysAddr, VirtAddr};
use crate::config::TlbConfig;
use crate::error::{ConfigError, TranslationMiss};
use crate::stats::TlbStats;
use crate::translator::Translator;

/// One way of one set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    valid: bool,
    tag: u64,
    /// Page-aligned physical frame.
    frame: u64,
    lru_rank: u32,
}

impl CacheLine {
    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Rank within the set, `1..=ways`. Meaningless when the line is invalid.
    pub fn lru_rank(&self) -> u32 {
        self.lru_rank
    }

    #[inline(always)]
    fn matches(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }
}

pub struct SetAssociativeTlb<T> {
    config: TlbConfig,
    layout: AddressLayout,
    lines: Vec<CacheLine>,
    ways: usize,
    translator: T,
    stats: TlbStats,
}

impl<T: Translator> SetAssociativeTlb<T> {
    /// Creates an empty TLB (every line invalid) in front of `translator`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the geometry does not validate.
    pub fn new(config: TlbConfig, translator: T) -> Result<Self, ConfigError> {
        let layout = AddressLayout::new(&config)?;
        Ok(Self {
            lines: vec![CacheLine::default(); config.sets * config.ways],
            ways: config.ways,
            layout,
            config,
            translator,
            stats: TlbStats::default(),
        })
    }

    /// Invalidates every line. Geometry and statistics are untouched.
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.valid = false;
        }
        debug!("tlb: cleared {} lines", self.lines.len());
    }

    /// Returns the LRU rank of the line holding `va`, or 0 if `va` is not
    /// cached. Never calls the translator and never reorders the set.
    pub fn peek(&self, va: VirtAddr) -> u32 {
        let set_index = self.layout.set_index(va);
        let tag = self.layout.tag(va);
        self.set(set_index)
            .iter()
            .find(|line| line.matches(tag))
            .map_or(0, |line| line.lru_rank)
    }

    /// Looks `va` up, falling back to the translator on a miss, and makes
    /// its line the most recently used in its set.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationMiss`] when the translator has no mapping for
    /// `va`. In that case no line is modified.
    pub fn translate(&mut self, va: VirtAddr) -> Result<PhysAddr, TranslationMiss> {
        debug_assert!(
            self.config.address_bits == 64 || va.val() >> self.config.address_bits == 0,
            "virtual address {:#x} wider than {} bits",
            va.val(),
            self.config.address_bits
        );

        let set_index = self.layout.set_index(va);
        let tag = self.layout.tag(va);
        let base = set_index * self.ways;

        if let Some(way) = self.set(set_index).iter().position(|line| line.matches(tag)) {
            self.promote(set_index, way);
            self.stats.hits += 1;
            trace!("tlb: hit va={:#x} set={} way={}", va.val(), set_index, way);
            return Ok(self.layout.compose(self.lines[base + way].frame, va));
        }

        self.stats.misses += 1;
        trace!("tlb: miss va={:#x} set={}", va.val(), set_index);

        // Must be resolved before anything in the set changes.
        let Some(paddr) = self.translator.translate(va) else {
            self.stats.faults += 1;
            debug!("tlb: no mapping for va={:#x}", va.val());
            return Err(TranslationMiss { va });
        };

        let way = self.victim(set_index);
        let victim = self.lines[base + way];
        if victim.valid {
            self.stats.evictions += 1;
            debug!(
                "tlb: set {} evicting tag={:#x} frame={:#x} (rank {}) for tag={:#x}",
                set_index, victim.tag, victim.frame, victim.lru_rank, tag
            );
        } else {
            self.stats.fills += 1;
            debug!("tlb: set {} filling way {} with tag={:#x}", set_index, way, tag);
        }

        let frame = self.layout.frame(paddr);
        self.lines[base + way] = CacheLine {
            valid: true,
            tag,
            frame,
            // Ranked below every valid line so promotion shifts them all.
            lru_rank: self.ways as u32 + 1,
        };
        self.promote(set_index, way);

        Ok(self.layout.compose(frame, va))
    }

    /// Moves `way` to rank 1, pushing every valid line that was more
    /// recently used one step down. Lines ranked below it keep their rank.
    fn promote(&mut self, set_index: usize, way: usize) {
        let base = set_index * self.ways;
        let old_rank = self.lines[base + way].lru_rank;
        for (i, line) in self.set_mut(set_index).iter_mut().enumerate() {
            if i != way && line.valid && line.lru_rank < old_rank {
                line.lru_rank += 1;
            }
        }
        self.lines[base + way].lru_rank = 1;
    }

    /// First invalid way if there is one, otherwise the valid line with the
    /// highest rank.
    fn victim(&self, set_index: usize) -> usize {
        let set = self.set(set_index);
        if let Some(way) = set.iter().position(|line| !line.valid) {
            return way;
        }
        set.iter()
            .enumerate()
            .max_by_key(|(_, line)| line.lru_rank)
            .map_or(0, |(way, _)| way)
    }

    pub fn config(&self) -> &TlbConfig {
        &self.config
    }

    pub fn layout(&self) -> &AddressLayout {
        &self.layout
    }

    /// The whole line table, set-major.
    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    /// The `ways` lines of set `set_index`.
    ///
    /// # Panics
    ///
    /// Panics if `set_index >= sets`.
    pub fn set(&self, set_index: usize) -> &[CacheLine] {
        let base = set_index * self.ways;
        &self.lines[base..base + self.ways]
    }

    fn set_mut(&mut self, set_index: usize) -> &mut [CacheLine] {
        let base = set_index * self.ways;
        &mut self.lines[base..base + self.ways]
    }

    pub fn stats(&self) -> &TlbStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = TlbStats::default();
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    pub fn translator_mut(&mut self) -> &mut T {
        &mut self.translator
    }

    pub fn into_translator(self) -> T {
        self.translator
    }
}

impl<T> fmt::Debug for SetAssociativeTlb<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "TLB ({} sets x {} ways, {:#x}-byte pages):",
            self.config.sets, self.ways, self.config.page_size
        )?;
        for (set_index, set) in self.lines.chunks(self.ways).enumerate() {
            if !set.iter().any(|line| line.valid) {
                continue;
            }
            writeln!(f, "\tSet {:x}:", set_index)?;
            for (way, line) in set.iter().enumerate().filter(|(_, l)| l.valid) {
                writeln!(
                    f,
                    "\t\tway {}: tag={:#x} frame={:#x} rank={}",
                    way, line.tag, line.frame, line.lru_rank
                )?;
            }
        }
        Ok(())
    }
}
