//! Merging per-zone events into one "holds at least one" probability.

use num_rational::BigRational;
use num_traits::{One, Zero};

/// Probability that at least one of `events` happens, for independent events.
///
/// Folds the pairwise rule `P(A ∪ B) = A + B - A·B`, which expands to the full
/// inclusion-exclusion polynomial for any number of events. A term at or above
/// one makes the union certain and stops the fold before an out-of-range term
/// can enter the polynomial.
pub fn union_probability(events: &[BigRational]) -> BigRational {
    let one = BigRational::one();
    let mut union = BigRational::zero();
    for event in events {
        if *event >= one {
            return one;
        }
        if event.is_zero() {
            continue;
        }
        union = &union + event - &union * event;
    }
    union
}
