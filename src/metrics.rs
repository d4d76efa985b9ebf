//! Prometheus metrics for the HTTP surface and analysis runs

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

use crate::models::report::Report;

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub analysis_runs_total: IntCounter,
    pub analysis_failures_total: IntCounter,
    pub analysis_duration_seconds: Histogram,
    pub assets_evaluated_total: IntCounter,
    pub assets_skipped_total: IntCounter,
    pub candidates_reported: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::with_opts(Opts::new("http_requests_total", "Total HTTP requests"))?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = IntGauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "HTTP requests currently being served",
        ))?;
        let analysis_runs_total =
            IntCounter::with_opts(Opts::new("analysis_runs_total", "Completed analysis runs"))?;
        let analysis_failures_total = IntCounter::with_opts(Opts::new(
            "analysis_failures_total",
            "Analysis runs that failed before producing a report",
        ))?;
        let analysis_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "analysis_duration_seconds",
                "Wall time of one analysis run in seconds",
            )
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        )?;
        let assets_evaluated_total = IntCounter::with_opts(Opts::new(
            "assets_evaluated_total",
            "Assets requested across all runs",
        ))?;
        let assets_skipped_total = IntCounter::with_opts(Opts::new(
            "assets_skipped_total",
            "Assets skipped for missing or invalid data",
        ))?;
        let candidates_reported = IntGauge::with_opts(Opts::new(
            "candidates_reported",
            "Candidates in the latest report",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(analysis_runs_total.clone()))?;
        registry.register(Box::new(analysis_failures_total.clone()))?;
        registry.register(Box::new(analysis_duration_seconds.clone()))?;
        registry.register(Box::new(assets_evaluated_total.clone()))?;
        registry.register(Box::new(assets_skipped_total.clone()))?;
        registry.register(Box::new(candidates_reported.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            analysis_runs_total,
            analysis_failures_total,
            analysis_duration_seconds,
            assets_evaluated_total,
            assets_skipped_total,
            candidates_reported,
        })
    }

    /// Record the outcome of a successful run
    pub fn record_report(&self, report: &Report, duration_seconds: f64) {
        self.analysis_runs_total.inc();
        self.analysis_duration_seconds.observe(duration_seconds);
        self.assets_evaluated_total
            .inc_by(report.summary.evaluated as u64);
        self.assets_skipped_total
            .inc_by(report.summary.skipped() as u64);
        self.candidates_reported.set(report.summary.reported as i64);
    }

    /// Text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
