//! Method permission mask.

use core::ops::{BitOr, BitOrAssign};

/// Combinable set of {READ, WRITE, EXECUTE}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Methods(u8);

impl Methods {
    pub const NONE: Self = Self(0);
    pub const READ: Self = Self(0b0000_0001);
    pub const WRITE: Self = Self(0b0000_0010);
    pub const EXECUTE: Self = Self(0b0000_0100);

    /// Return the raw bitmask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// `true` if every method in `other` is permitted.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Methods {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Methods {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
