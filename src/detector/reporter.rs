use std::fmt::Write;

#[cfg(test)]
use mockall::automock;
use tracing::info;
use tracing::warn;

use super::Waterfall;
use crate::ReportConfig;
use crate::ReportLevel;

const REPORT_HEADER: &str = "Detected query waterfalls:";

const REPORT_GUIDANCE: &str = "\
This can lead to performance issues.

If you REALLY think it's normal, you can add an exemption rule for this waterfall.

Otherwise, try these tips to fix it:
- If the backend allows it, try batching the queries together in a single query.
- Do not start two suspending queries in the same component, or in a parent and a child. \
Instead, issue each query as close as possible to where its data is needed, and reorganize components if needed.
- Fetch several independent queries in parallel rather than one after another.
- As a last resort, prefetch the query ahead of time.";

/// Sink for the waterfalls that survived exemption in one cycle.
///
/// Called at most once per cycle and never with an empty slice.
#[cfg_attr(test, automock)]
pub trait Reporter: Send + Sync + 'static {
    fn report(
        &self,
        waterfalls: &[Waterfall],
    );
}

/// Emits each cycle's waterfalls as one `tracing` event.
#[derive(Debug, Clone, Default)]
pub struct LogReporter {
    config: ReportConfig,
}

impl LogReporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }
}

impl Reporter for LogReporter {
    fn report(
        &self,
        waterfalls: &[Waterfall],
    ) {
        if waterfalls.is_empty() {
            return;
        }
        let message = format_report(waterfalls, &self.config);
        match self.config.level {
            ReportLevel::Warn => warn!("{}", message),
            ReportLevel::Info => info!("{}", message),
        }
    }
}

/// Render one diagnostic block listing `from --> to` per waterfall.
pub fn format_report(
    waterfalls: &[Waterfall],
    config: &ReportConfig,
) -> String {
    let listed = match config.max_listed {
        0 => waterfalls.len(),
        max => max.min(waterfalls.len()),
    };

    let mut out = String::from(REPORT_HEADER);
    for waterfall in &waterfalls[..listed] {
        let _ = write!(out, "\n{waterfall}");
    }
    if listed < waterfalls.len() {
        let _ = write!(out, "\n... and {} more", waterfalls.len() - listed);
    }
    if config.include_guidance {
        out.push_str("\n\n");
        out.push_str(REPORT_GUIDANCE);
    }
    out
}
