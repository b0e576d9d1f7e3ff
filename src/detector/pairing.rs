use std::fmt;
use std::sync::Arc;

use crate::Query;

/// Candidate waterfall: `from` finished and `to` started within the same
/// change interval.
///
/// Only temporal adjacency is known; nothing says `from` caused `to` to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waterfall {
    pub from: Arc<Query>,
    pub to: Arc<Query>,
}

impl Waterfall {
    pub fn new(
        from: Arc<Query>,
        to: Arc<Query>,
    ) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Waterfall {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} --> {}", self.from.hash(), self.to.hash())
    }
}

/// Every (finished, started) pair of one cycle.
///
/// The detector cannot tell which finished query held back which started
/// one, so the full cross product is emitted, grouped by finished query.
pub fn pair_waterfalls(
    finished: &[Arc<Query>],
    started: &[Arc<Query>],
) -> Vec<Waterfall> {
    finished
        .iter()
        .flat_map(|from| started.iter().map(move |to| Waterfall::new(from.clone(), to.clone())))
        .collect()
}
