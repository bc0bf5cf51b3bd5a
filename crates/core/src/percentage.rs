//! Bounded completion percentage.

use serde::{Deserialize, Serialize};

/// A completion percentage, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    /// Nothing done.
    pub const ZERO: Percentage = Percentage(0);

    /// Everything done.
    pub const COMPLETE: Percentage = Percentage(100);

    /// Build a percentage, clamping into range.
    pub fn of(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// The percentage as an integer.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Percentage {
    type Error = std::convert::Infallible;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Ok(Self::of(value))
    }
}

impl From<Percentage> for u8 {
    fn from(p: Percentage) -> u8 {
        p.0
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
