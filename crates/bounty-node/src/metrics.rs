use prometheus::{Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    // Self-check outcomes
    pub self_checks_total: IntCounter,
    pub self_checks_approved: IntCounter,
    pub self_checks_rejected: IntCounter,
    pub self_checks_failed: IntCounter,
    pub self_check_duration: Histogram,

    pub social_checks_total: IntCounter,
    pub social_check_failures: IntCounter,

    pub ai_reviews_total: IntCounter,
    pub ai_reviews_approved: IntCounter,

    pub attestations_signed: IntCounter,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let counter = |name: &str, help: &str| -> prometheus::Result<IntCounter> {
            let counter = IntCounter::new(name, help)?;
            registry.register(Box::new(counter.clone()))?;
            Ok(counter)
        };

        let self_checks_total = counter("self_checks_total", "Self-check requests received")?;
        let self_checks_approved =
            counter("self_checks_approved", "Self-checks that produced an attestation")?;
        let self_checks_rejected = counter(
            "self_checks_rejected",
            "Self-checks refused because of the submission",
        )?;
        let self_checks_failed = counter(
            "self_checks_failed",
            "Self-checks aborted by an internal or upstream fault",
        )?;
        let social_checks_total = counter("social_checks_total", "Social verifications run")?;
        let social_check_failures =
            counter("social_check_failures", "Social verifications that failed")?;
        let ai_reviews_total = counter("ai_reviews_total", "AI reviews run")?;
        let ai_reviews_approved =
            counter("ai_reviews_approved", "AI reviews that approved the submission")?;
        let attestations_signed = counter("attestations_signed", "Attestations signed")?;

        let self_check_duration = Histogram::with_opts(HistogramOpts::new(
            "self_check_duration_seconds",
            "End-to-end self-check duration",
        ))?;
        registry.register(Box::new(self_check_duration.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            self_checks_total,
            self_checks_approved,
            self_checks_rejected,
            self_checks_failed,
            self_check_duration,
            social_checks_total,
            social_check_failures,
            ai_reviews_total,
            ai_reviews_approved,
            attestations_signed,
        })
    }

    pub fn gather(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }
}
