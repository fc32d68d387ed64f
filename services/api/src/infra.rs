use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Expectation weights are relative, so any finite non-negative value is accepted.
pub(crate) fn parse_weight(raw: &str) -> Result<f64, String> {
    let weight: f64 = raw
        .trim()
        .parse()
        .map_err(|err| format!("failed to parse '{raw}' as a number ({err})"))?;

    if !weight.is_finite() || weight < 0.0 {
        return Err(format!("weight must be a non-negative number, got {raw}"));
    }

    Ok(weight)
}
