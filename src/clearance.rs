use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Role bitmask stored on every account.
///
/// Roles combine freely: an account can be an admin wannabe, a plain
/// user, or hold nothing at all. Authorization checks test single flags
/// with [`Clearance::contains`] and never compare full masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clearance(i32);

impl Clearance {
    pub const NONE: Self = Self(0);
    pub const USER: Self = Self(1);
    pub const ADMIN: Self = Self(2);
    pub const WANNABE: Self = Self(4);

    const ALL_BITS: i32 = 0b111;

    /// Builds a clearance from a raw stored mask. Unknown bits are kept;
    /// they are meaningless but harmless.
    #[must_use]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 != 0
    }

    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    #[must_use]
    pub const fn without(self, flag: Self) -> Self {
        Self(self.0 & !flag.0)
    }

    /// Every combination of the three flags, the empty mask included.
    pub fn power_set() -> impl Iterator<Item = Self> {
        (0..=Self::ALL_BITS).map(Self)
    }

    /// Display label, e.g. `"User|Admin"`. The empty mask reads `"None"`.
    #[must_use]
    pub fn label(self) -> String {
        let mut parts = Vec::new();
        if self.contains(Self::USER) {
            parts.push("User");
        }
        if self.contains(Self::ADMIN) {
            parts.push("Admin");
        }
        if self.contains(Self::WANNABE) {
            parts.push("Wannabe");
        }

        if parts.is_empty() {
            "None".to_string()
        } else {
            parts.join("|")
        }
    }
}

impl BitOr for Clearance {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Clearance {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for Clearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
