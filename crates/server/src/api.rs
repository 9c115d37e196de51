use crate::auth::require_bearer;
use crate::metrics;
use crate::repository::parse_certificate_id;
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::Response;
use axum::routing::{get, post};
use certmail_common::CertmailError;
use certmail_common::entities::certificates;
use certmail_common::models::{BulkSendRequest, CertificatePayload, SendRequest};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;

type ApiResult<T> = std::result::Result<T, CertmailError>;

type CertificateModel = certificates::Model;

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route(
            "/certificates",
            post(create_certificate).get(list_certificates),
        )
        .route(
            "/certificates/{id}",
            get(get_certificate).put(update_certificate),
        )
        .route("/send/{id}", post(send_certificate))
        .route("/send_bulk", post(send_bulk))
        .route("/metrics", get(get_metrics))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_bearer,
        ))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bodies are JSON whatever the Content-Type header says.
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|err| CertmailError::bad_request(err.to_string()))
}

async fn get_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CertificateModel>> {
    let id = parse_certificate_id(&id)?;
    let certificate = state.certificates.get(id).await?;
    Ok(Json(certificate))
}

async fn create_certificate(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<CertificateModel>)> {
    let payload: CertificatePayload = decode_body(&body)?;
    let certificate = state.certificates.create(payload).await?;
    Ok((StatusCode::CREATED, Json(certificate)))
}

async fn list_certificates(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CertificateModel>>> {
    let list = state.certificates.list().await?;
    Ok(Json(list))
}

async fn update_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<CertificateModel>> {
    let id = parse_certificate_id(&id)?;
    let payload: CertificatePayload = decode_body(&body)?;
    let updated = state.certificates.update(id, payload).await?;
    Ok(Json(updated))
}

async fn send_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<&'static str> {
    let id = parse_certificate_id(&id)?;
    let request: SendRequest = decode_body(&body)?;
    state.dispatcher.send_certificate(id, &request.email).await?;
    Ok("Certificate sent successfully!")
}

async fn send_bulk(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<&'static str> {
    let request: BulkSendRequest = decode_body(&body)?;
    state
        .dispatcher
        .send_bulk(&request.emails, &request.content)
        .await?;
    Ok("Bulk emails sent successfully!")
}

async fn get_metrics() -> ApiResult<Response> {
    metrics::render_metrics()
}
