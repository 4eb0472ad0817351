//! Call metrics.
//!
//! # Metrics
//! - `easyhttp_calls_total` (counter): invocations by interface, method, outcome
//! - `easyhttp_call_duration_seconds` (histogram): invocation latency by interface, method
//! - `easyhttp_templates_compiled_total` (counter): compilations by interface, outcome
//!
//! Without an installed recorder these are no-ops.

use std::time::Instant;

use metrics::{counter, histogram};

pub fn record_call(interface: &str, method: &str, outcome: &'static str, start: Instant) {
    let interface = interface.to_string();
    let method = method.to_string();
    counter!(
        "easyhttp_calls_total",
        "interface" => interface.clone(),
        "method" => method.clone(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "easyhttp_call_duration_seconds",
        "interface" => interface,
        "method" => method
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_compile(interface: &str, outcome: &'static str) {
    counter!(
        "easyhttp_templates_compiled_total",
        "interface" => interface.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
