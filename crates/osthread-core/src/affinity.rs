//! CPU affinity mask
//!
//! Bit `i` (0-indexed) set means "may run on logical CPU `i`".
//! The mask covers the first 64 logical CPUs.

use core::fmt;
use core::ops::{BitAnd, BitOr, BitOrAssign};

/// Number of bits per mask
const BITS: usize = 64;

/// Set of logical CPUs a thread may run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CpuMask(u64);

impl CpuMask {
    /// No CPUs. Never accepted by `set_affinity`.
    pub const EMPTY: CpuMask = CpuMask(0);

    pub const CPU0: CpuMask = CpuMask(0x01);
    pub const CPU1: CpuMask = CpuMask(0x02);
    pub const CPU2: CpuMask = CpuMask(0x04);
    pub const CPU3: CpuMask = CpuMask(0x08);
    pub const CPU4: CpuMask = CpuMask(0x10);
    pub const CPU5: CpuMask = CpuMask(0x20);
    pub const CPU6: CpuMask = CpuMask(0x40);
    pub const CPU7: CpuMask = CpuMask(0x80);

    /// Highest number of CPUs a mask can name
    pub const MAX_CPUS: usize = BITS;

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        CpuMask(bits)
    }

    #[inline]
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Mask naming a single CPU. Out-of-range indices give `EMPTY`.
    #[inline]
    pub const fn cpu(idx: usize) -> Self {
        if idx >= BITS {
            CpuMask::EMPTY
        } else {
            CpuMask(1u64 << idx)
        }
    }

    /// This mask plus CPU `idx`
    #[inline]
    pub const fn with(self, idx: usize) -> Self {
        CpuMask(self.0 | CpuMask::cpu(idx).0)
    }

    #[inline]
    pub const fn contains(&self, idx: usize) -> bool {
        idx < BITS && (self.0 >> idx) & 1 == 1
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of CPUs in the mask
    #[inline]
    pub const fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// True if every CPU in `self` is also in `other`
    #[inline]
    pub const fn is_subset_of(&self, other: CpuMask) -> bool {
        self.0 & other.0 == self.0
    }

    /// Lowest CPU index in the mask
    #[inline]
    pub const fn first(&self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    /// Iterate CPU indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        let bits = self.0;
        (0..BITS).filter(move |i| (bits >> i) & 1 == 1)
    }
}

impl From<u64> for CpuMask {
    fn from(bits: u64) -> Self {
        CpuMask(bits)
    }
}

impl From<CpuMask> for u64 {
    fn from(mask: CpuMask) -> u64 {
        mask.0
    }
}

impl BitOr for CpuMask {
    type Output = CpuMask;

    fn bitor(self, rhs: CpuMask) -> CpuMask {
        CpuMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for CpuMask {
    fn bitor_assign(&mut self, rhs: CpuMask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CpuMask {
    type Output = CpuMask;

    fn bitand(self, rhs: CpuMask) -> CpuMask {
        CpuMask(self.0 & rhs.0)
    }
}

impl fmt::Display for CpuMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
