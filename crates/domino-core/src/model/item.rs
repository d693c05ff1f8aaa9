use core::fmt;
use std::hash::Hash;

/// A unit drawn from the shared pool. Items carry one or more attributes
/// and are used as map keys, so identity must be stable and cheap to copy.
pub trait Item: Copy + Ord + Hash + fmt::Debug + fmt::Display {
    type Attribute: Copy + Ord + Hash + fmt::Debug + fmt::Display;

    fn attributes(&self) -> impl Iterator<Item = Self::Attribute>;

    fn has_attribute(&self, attribute: Self::Attribute) -> bool {
        self.attributes().any(|a| a == attribute)
    }
}
