//! Thread priority levels

use core::fmt;

/// Scheduling priority hint for an OS thread.
///
/// Five ordinal levels centered on `Normal`. The runtime maps each one
/// onto the platform's native priority scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i8)]
pub enum Priority {
    Lowest = -2,
    BelowNormal = -1,
    Normal = 0,
    AboveNormal = 1,
    Highest = 2,
}

impl Priority {
    /// Number of priority levels
    pub const COUNT: usize = 5;

    /// Signed level, `-2..=2`
    #[inline]
    pub const fn level(&self) -> i8 {
        *self as i8
    }

    /// Get priority from its signed level
    #[inline]
    pub const fn from_level(level: i32) -> Option<Priority> {
        match level {
            -2 => Some(Priority::Lowest),
            -1 => Some(Priority::BelowNormal),
            0 => Some(Priority::Normal),
            1 => Some(Priority::AboveNormal),
            2 => Some(Priority::Highest),
            _ => None,
        }
    }

    /// Iterator over all priorities (lowest to highest)
    pub fn iter() -> impl Iterator<Item = Priority> {
        [
            Priority::Lowest,
            Priority::BelowNormal,
            Priority::Normal,
            Priority::AboveNormal,
            Priority::Highest,
        ]
        .into_iter()
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl From<Priority> for i8 {
    fn from(p: Priority) -> i8 {
        p.level()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Lowest => write!(f, "LOWEST"),
            Priority::BelowNormal => write!(f, "BELOW_NORMAL"),
            Priority::Normal => write!(f, "NORMAL"),
            Priority::AboveNormal => write!(f, "ABOVE_NORMAL"),
            Priority::Highest => write!(f, "HIGHEST"),
        }
    }
}
