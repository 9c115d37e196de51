//! Prometheus instrumentation for the HTTP surface and SMTP deliveries.

use axum::extract::{MatchedPath, Request};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use certmail_common::CertmailError;
use prometheus::{
    Encoder, HistogramVec, IntCounterVec, TextEncoder, register_histogram_vec,
    register_int_counter_vec,
};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::warn;

struct Metrics {
    http_requests: IntCounterVec,
    http_latency: HistogramVec,
    mail_deliveries: IntCounterVec,
}

impl Metrics {
    fn register() -> prometheus::Result<Self> {
        Ok(Self {
            http_requests: register_int_counter_vec!(
                "certmail_http_requests_total",
                "HTTP requests by method, route and status",
                &["method", "route", "status"]
            )?,
            http_latency: register_histogram_vec!(
                "certmail_http_request_duration_seconds",
                "HTTP handling time by method and route",
                &["method", "route"]
            )?,
            mail_deliveries: register_int_counter_vec!(
                "certmail_mail_deliveries_total",
                "Messages handed to the mailer by kind and outcome",
                &["kind", "outcome"]
            )?,
        })
    }

    /// `None` when registration failed; recording is then a no-op.
    fn get() -> Option<&'static Metrics> {
        static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();
        METRICS
            .get_or_init(|| match Metrics::register() {
                Ok(metrics) => Some(metrics),
                Err(err) => {
                    warn!(error = %err, "metrics disabled");
                    None
                }
            })
            .as_ref()
    }
}

/// `kind` is `single` or `bulk`.
pub fn record_mail_delivery(kind: &str, ok: bool) {
    if let Some(metrics) = Metrics::get() {
        let outcome = if ok { "sent" } else { "failed" };
        metrics.mail_deliveries.with_label_values(&[kind, outcome]).inc();
    }
}

/// Counts and times every request, labelled by its route template so ids do
/// not explode the label set.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or("unmatched", MatchedPath::as_str)
        .to_owned();

    let started = Instant::now();
    let response = next.run(req).await;

    if let Some(metrics) = Metrics::get() {
        let status = response.status();
        metrics
            .http_requests
            .with_label_values(&[method.as_str(), route.as_str(), status.as_str()])
            .inc();
        metrics
            .http_latency
            .with_label_values(&[method.as_str(), route.as_str()])
            .observe(started.elapsed().as_secs_f64());
    }
    response
}

/// The default registry in Prometheus text exposition format.
pub fn render_metrics() -> Result<Response, CertmailError> {
    let encoder = TextEncoder::new();
    let body = encoder
        .encode_to_string(&prometheus::gather())
        .map_err(anyhow::Error::from)?;
    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_owned())], body).into_response())
}
