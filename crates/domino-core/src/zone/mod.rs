//! Zone partition: which parties could still own each live item.

mod key;
mod partition;
mod snapshot;

use std::collections::BTreeMap;

pub use key::ZoneKey;
pub use partition::{ShrinkOutcome, ZoneError, ZonePartition};
pub use snapshot::ZoneSnapshot;

/// A count per zone, e.g. sizes, remaining capacity or attribute matches.
pub type ZoneCounts = BTreeMap<ZoneKey, usize>;
