//! Delegation feature bits

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// One operation a backend can run on the caller's behalf
///
/// Each value is a single distinct bit. `1 << 5` is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum DelegationFeature {
    Filter = 1 << 0,
    Top = 1 << 1,
    Columns = 1 << 2,
    Sort = 1 << 3,
    ApplyGroupBy = 1 << 4,
    ApplyTopLevelAggregation = 1 << 6,
    Count = 1 << 7,
}

impl DelegationFeature {
    /// Every defined feature, lowest bit first
    pub const ALL: [DelegationFeature; 7] = [
        DelegationFeature::Filter,
        DelegationFeature::Top,
        DelegationFeature::Columns,
        DelegationFeature::Sort,
        DelegationFeature::ApplyGroupBy,
        DelegationFeature::ApplyTopLevelAggregation,
        DelegationFeature::Count,
    ];

    pub const fn bit(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            DelegationFeature::Filter => "Filter",
            DelegationFeature::Top => "Top",
            DelegationFeature::Columns => "Columns",
            DelegationFeature::Sort => "Sort",
            DelegationFeature::ApplyGroupBy => "ApplyGroupBy",
            DelegationFeature::ApplyTopLevelAggregation => "ApplyTopLevelAggregation",
            DelegationFeature::Count => "Count",
        }
    }
}

/// Mask of every defined feature bit
const KNOWN_BITS: u32 = {
    let mut bits = 0;
    let mut i = 0;
    while i < DelegationFeature::ALL.len() {
        bits |= DelegationFeature::ALL[i].bit();
        i += 1;
    }
    bits
};

/// Set of delegation features
///
/// May carry bits outside the defined set; such bits are kept so the
/// compiler can reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DelegationFeatures(u32);

impl DelegationFeatures {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every defined feature
    pub const fn all() -> Self {
        Self(KNOWN_BITS)
    }

    /// Wrap raw bits as-is, unknown bits included
    pub const fn from_bits_retain(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, feature: DelegationFeature) -> bool {
        self.0 & feature.bit() != 0
    }

    /// Whether every bit of `other` is also set here
    pub const fn contains_all(self, other: DelegationFeatures) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, feature: DelegationFeature) {
        self.0 |= feature.bit();
    }

    /// Bits set here but not in `other`
    #[must_use]
    pub const fn difference(self, other: DelegationFeatures) -> Self {
        Self(self.0 & !other.0)
    }

    /// Only the defined feature bits
    #[must_use]
    pub const fn known(self) -> Self {
        Self(self.0 & KNOWN_BITS)
    }

    /// Bits outside the defined set
    #[must_use]
    pub const fn unknown(self) -> Self {
        Self(self.0 & !KNOWN_BITS)
    }

    /// Defined features in this set, lowest bit first
    pub fn iter(self) -> impl Iterator<Item = DelegationFeature> {
        DelegationFeature::ALL
            .into_iter()
            .filter(move |feature| self.contains(*feature))
    }
}

impl From<DelegationFeature> for DelegationFeatures {
    fn from(feature: DelegationFeature) -> Self {
        Self(feature.bit())
    }
}

impl FromIterator<DelegationFeature> for DelegationFeatures {
    fn from_iter<I: IntoIterator<Item = DelegationFeature>>(iter: I) -> Self {
        let mut features = Self::empty();
        for feature in iter {
            features.insert(feature);
        }
        features
    }
}

impl BitOr for DelegationFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<DelegationFeature> for DelegationFeatures {
    type Output = Self;

    fn bitor(self, rhs: DelegationFeature) -> Self::Output {
        Self(self.0 | rhs.bit())
    }
}

impl BitOr for DelegationFeature {
    type Output = DelegationFeatures;

    fn bitor(self, rhs: Self) -> Self::Output {
        DelegationFeatures(self.bit() | rhs.bit())
    }
}

impl BitOrAssign<DelegationFeature> for DelegationFeatures {
    fn bitor_assign(&mut self, rhs: DelegationFeature) {
        self.insert(rhs);
    }
}

impl fmt::Display for DelegationFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(none)");
        }
        let mut first = true;
        for feature in self.iter() {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(feature.name())?;
            first = false;
        }
        let unknown = self.unknown();
        if !unknown.is_empty() {
            if !first {
                f.write_str(" | ")?;
            }
            write!(f, "0x{:x}", unknown.bits())?;
        }
        Ok(())
    }
}
