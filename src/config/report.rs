use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Upper bound for `max_listed`; larger blocks stop being readable.
pub const MAX_LISTED_LIMIT: usize = 10_000;

/// Level of the tracing event carrying a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    #[default]
    Warn,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub level: ReportLevel,

    /// Append remediation tips after the waterfall list
    #[serde(default = "default_include_guidance")]
    pub include_guidance: bool,

    /// Maximum waterfall lines per report (0 means unlimited).
    /// The rest are summarised in a single trailing line.
    #[serde(default)]
    pub max_listed: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            level: ReportLevel::default(),
            include_guidance: default_include_guidance(),
            max_listed: 0,
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_listed > MAX_LISTED_LIMIT {
            return Err(Error::InvalidConfig(format!(
                "report.max_listed {} exceeds the limit of {}",
                self.max_listed, MAX_LISTED_LIMIT
            )));
        }
        Ok(())
    }
}

fn default_include_guidance() -> bool {
    true
}
