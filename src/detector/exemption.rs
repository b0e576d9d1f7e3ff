use serde::Deserialize;
use serde::Serialize;
use tracing::trace;

use super::Waterfall;
use crate::QueryCache;
use crate::QueryKey;

/// Marks a waterfall between two key patterns as intentional.
///
/// In TOML:
///
/// ```toml
/// [[exemptions]]
/// from = ["users"]
/// to = ["users", "*", "posts"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionRule {
    pub from: QueryKey,
    pub to: QueryKey,
}

impl ExemptionRule {
    pub fn new(
        from: impl Into<QueryKey>,
        to: impl Into<QueryKey>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Both patterns must match, each against its own end of the waterfall.
    pub fn matches<C: QueryCache + ?Sized>(
        &self,
        cache: &C,
        waterfall: &Waterfall,
    ) -> bool {
        cache.matches(&self.from, waterfall.from.key()) && cache.matches(&self.to, waterfall.to.key())
    }
}

/// Immutable set of exemption rules.
#[derive(Debug, Clone, Default)]
pub struct ExemptionList {
    rules: Vec<ExemptionRule>,
}

impl ExemptionList {
    pub fn new(rules: Vec<ExemptionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ExemptionRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True when at least one rule matches `waterfall`.
    pub fn is_exempt<C: QueryCache + ?Sized>(
        &self,
        cache: &C,
        waterfall: &Waterfall,
    ) -> bool {
        self.rules.iter().any(|rule| rule.matches(cache, waterfall))
    }

    /// Drop exempt waterfalls. Returns the survivors and the number dropped.
    pub fn filter<C: QueryCache + ?Sized>(
        &self,
        cache: &C,
        waterfalls: Vec<Waterfall>,
    ) -> (Vec<Waterfall>, usize) {
        if self.rules.is_empty() {
            return (waterfalls, 0);
        }

        let total = waterfalls.len();
        let kept: Vec<Waterfall> = waterfalls
            .into_iter()
            .filter(|waterfall| {
                let exempt = self.is_exempt(cache, waterfall);
                if exempt {
                    trace!(%waterfall, "Waterfall exempted");
                }
                !exempt
            })
            .collect();
        let exempted = total - kept.len();
        (kept, exempted)
    }
}
