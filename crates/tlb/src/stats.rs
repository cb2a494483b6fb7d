use serde::Serialize;

/// Running counters for a [`SetAssociativeTlb`](crate::SetAssociativeTlb).
///
/// These live outside the cache-line table: a failed translation bumps
/// `misses` and `faults` without touching any line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TlbStats {
    pub hits: u64,
    pub misses: u64,
    /// Misses the translator could not resolve.
    pub faults: u64,
    /// Misses installed into an empty way.
    pub fills: u64,
    /// Misses that replaced a valid line.
    pub evictions: u64,
}

impl TlbStats {
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn print(&self) {
        println!("--- TLB Statistics ---");
        println!("accesses:   {}", self.accesses());
        println!("hits:       {}", self.hits);
        println!("misses:     {}", self.misses);
        println!("  faults:    {}", self.faults);
        println!("  fills:     {}", self.fills);
        println!("  evictions: {}", self.evictions);
        println!("hit rate:   {:.2}%", self.hit_rate() * 100.0);
    }
}
