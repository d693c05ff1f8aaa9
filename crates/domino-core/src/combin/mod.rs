//! Exact combinatorics over zone capacities.

mod binomial;
mod counter;
mod subpartition;

pub use binomial::{BinomialTable, binomial};
pub use counter::{Branch, Branches, CombinatorialCounter};
pub use subpartition::{Subpartition, SubpartitionEnumerator, Subpartitions};
