//! The functions
//!
use itertools::Itertools;
use crate::observation::{NodeObservation, MasterGroups, ObservationSet};

/// True when at least two observations report a different master.
pub fn check_split_brain(
    successes: &[NodeObservation],
) -> bool
{
    !successes.iter()
        .map(|r| &r.reported_master)
        .all_equal()
}

/// Group the observations by the master they report, keeping the order of `successes` per group.
///
/// An empty master name is a group of its own.
pub fn group_by_master(
    successes: &[NodeObservation],
) -> MasterGroups
{
    let mut master_groups = MasterGroups::new();
    for observation in successes {
        master_groups
            .entry(observation.reported_master.clone())
            .or_default()
            .push(observation.clone());
    }
    master_groups
}

impl ObservationSet {
    pub fn is_split_brain(&self) -> bool {
        check_split_brain(&self.successes)
    }
    pub fn master_groups(&self) -> MasterGroups {
        group_by_master(&self.successes)
    }
}
