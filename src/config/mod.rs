//! Detector configuration.
//!
//! Loaded from up to three sources, later ones overriding earlier ones:
//! 1. Default values (hardcoded)
//! 2. An optional TOML file
//! 3. Environment variables prefixed `WATERFALL`, `__` as the nesting
//!    separator (e.g. `WATERFALL__REPORT__LEVEL=info`)
//!
//! The configuration is fixed once a detector starts watching.

mod report;
pub use report::*;


//---
use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::ExemptionRule;
use crate::QueryKey;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Waterfalls that are known to be intentional and never reported
    pub exemptions: Vec<ExemptionRule>,
    /// Diagnostic output settings
    pub report: ReportConfig,
}

impl DetectorConfig {
    /// Merge defaults, the optional TOML file at `path` and `WATERFALL__*`
    /// environment variables, then validate the result.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = Config::builder();

        if let Some(path) = path {
            config = config.add_source(File::with_name(path).required(true));
        }

        config = config.add_source(
            Environment::with_prefix("WATERFALL")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: Self = config.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_exemption(
        mut self,
        from: impl Into<QueryKey>,
        to: impl Into<QueryKey>,
    ) -> Self {
        self.exemptions.push(ExemptionRule::new(from, to));
        self
    }

    pub fn with_report(
        mut self,
        report: ReportConfig,
    ) -> Self {
        self.report = report;
        self
    }

    /// Rule shapes are never rejected: a rule that cannot match any key is
    /// simply inert.
    pub fn validate(&self) -> Result<()> {
        for (index, rule) in self.exemptions.iter().enumerate() {
            if rule.from.is_empty() && rule.to.is_empty() {
                warn!(index, "Exemption rule with empty patterns exempts every waterfall");
            }
        }

        self.report.validate()?;
        Ok(())
    }
}
