use serde::Serialize;

use crate::geometry::Location;

/// What happened to one requested placement, removal or upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Accepted,
    RejectedUnaffordable,
    RejectedBlocked,
}

/// Per-location outcomes of one attempt call, in request order.
///
/// A multi-unit spawn records one `Accepted` per unit placed and at most one
/// rejection per location (the first refusal ends that location).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AttemptReport {
    pub entries: Vec<(Location, AttemptOutcome)>,
}

impl AttemptReport {
    pub fn push(&mut self, location: Location, outcome: AttemptOutcome) {
        self.entries.push((location, outcome));
    }

    pub fn extend(&mut self, other: AttemptReport) {
        self.entries.extend(other.entries);
    }

    pub fn count(&self, outcome: AttemptOutcome) -> usize {
        self.entries.iter().filter(|(_, o)| *o == outcome).count()
    }

    pub fn accepted(&self) -> usize {
        self.count(AttemptOutcome::Accepted)
    }

    pub fn rejected(&self) -> usize {
        self.entries.len() - self.accepted()
    }
}
