//! Selector specificity weight

use std::ops::{Add, AddAssign};

/// Selector weight (a, b, c) where:
/// a = id terms
/// b = class and pseudo-class terms
/// c = type terms
///
/// Ordering is lexicographic, so any id outranks any number of classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weight(pub u32, pub u32, pub u32);

impl Weight {
    pub const ZERO: Weight = Weight(0, 0, 0);
    pub const ID: Weight = Weight(1, 0, 0);
    pub const CLASS: Weight = Weight(0, 1, 0);
    pub const TYPE: Weight = Weight(0, 0, 1);

    pub fn new(ids: u32, classes: u32, types: u32) -> Self {
        Self(ids, classes, types)
    }

    #[inline]
    pub fn ids(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn classes(self) -> u32 {
        self.1
    }

    #[inline]
    pub fn types(self) -> u32 {
        self.2
    }
}

impl Add for Weight {
    type Output = Weight;

    fn add(self, rhs: Weight) -> Weight {
        Weight(
            self.0.saturating_add(rhs.0),
            self.1.saturating_add(rhs.1),
            self.2.saturating_add(rhs.2),
        )
    }
}

impl AddAssign for Weight {
    fn add_assign(&mut self, rhs: Weight) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Weight {
    fn sum<I: Iterator<Item = Weight>>(iter: I) -> Weight {
        iter.fold(Weight::ZERO, Add::add)
    }
}
