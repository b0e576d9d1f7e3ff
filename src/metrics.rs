use lazy_static::lazy_static;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;

lazy_static! {
    pub static ref DETECTION_CYCLES: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "waterfall_detection_cycles",
            "Detection cycles run, by whether the in-flight set changed"
        ),
        &["outcome"]
    )
    .expect("metric can not be created");

    pub static ref WATERFALLS_REPORTED: IntCounter = IntCounter::new(
        "waterfalls_reported",
        "Waterfalls reported after exemption filtering"
    )
    .expect("metric can not be created");

    pub static ref WATERFALLS_EXEMPTED: IntCounter = IntCounter::new(
        "waterfalls_exempted",
        "Waterfalls suppressed by an exemption rule"
    )
    .expect("metric can not be created");
}

/// Register the detector's collectors with a host registry.
pub fn register_metrics(registry: &Registry) -> prometheus::Result<()> {
    registry.register(Box::new(DETECTION_CYCLES.clone()))?;
    registry.register(Box::new(WATERFALLS_REPORTED.clone()))?;
    registry.register(Box::new(WATERFALLS_EXEMPTED.clone()))?;
    Ok(())
}
