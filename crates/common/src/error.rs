//! Shared error types for the certificate service.
//!
//! One error type flows through the repository, the mail dispatcher and the
//! HTTP handlers; the `server` feature turns it into an axum response.

use thiserror::Error;

/// Failures raised while building or delivering a single message.
#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}

/// First failure of a bulk send. Earlier recipients have already been mailed.
#[derive(Error, Debug)]
#[error("error sending email to {recipient}: {source}")]
pub struct BulkSendError {
    pub recipient: String,
    pub delivered: Vec<String>,
    #[source]
    pub source: MailError,
}

#[derive(Error, Debug)]
pub enum CertmailError {
    /// Malformed id, body or address (400)
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or wrong bearer token (401)
    #[error("unauthorized")]
    Unauthorized,

    /// No record for the requested id (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage failure (500)
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// SMTP failure for a single send (500)
    #[error("mail error: {0}")]
    Mail(MailError),

    /// Bulk send stopped at the first failing recipient (500)
    #[error(transparent)]
    BulkSend(#[from] BulkSendError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MailError> for CertmailError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::InvalidAddress(addr) => {
                Self::BadRequest(format!("invalid email address: {}", addr))
            }
            other => Self::Mail(other),
        }
    }
}

impl CertmailError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::BadRequest(_) | Self::Unauthorized | Self::NotFound(_)
        )
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized => 401,
            Self::NotFound(_) => 404,
            _ => 500,
        }
    }

    #[cfg(feature = "server")]
    pub fn axum_status_code(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::from_u16(self.http_status_code())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub type Result<T> = std::result::Result<T, CertmailError>;

#[cfg(feature = "server")]
mod axum_impl {
    use super::*;
    use axum::{
        Json,
        response::{IntoResponse, Response},
    };
    use serde_json::json;

    impl IntoResponse for CertmailError {
        fn into_response(self) -> Response {
            let status = self.axum_status_code();

            match &self {
                CertmailError::BadRequest(msg) => {
                    tracing::info!(status = status.as_u16(), reason = %msg, "Bad request");
                }
                CertmailError::Unauthorized => {
                    tracing::info!(status = status.as_u16(), "Rejected unauthenticated request");
                }
                CertmailError::NotFound(resource) => {
                    tracing::info!(
                        status = status.as_u16(),
                        resource = %resource,
                        "Resource not found"
                    );
                }
                CertmailError::Database(db_err) => {
                    tracing::error!(
                        status = status.as_u16(),
                        error = %db_err,
                        "Database operation failed"
                    );
                }
                // SMTP relays fail for reasons outside our control
                CertmailError::Mail(mail_err) => {
                    tracing::warn!(
                        status = status.as_u16(),
                        mail_error = %mail_err,
                        "Mail delivery failed"
                    );
                }
                CertmailError::BulkSend(bulk) => {
                    tracing::warn!(
                        status = status.as_u16(),
                        recipient = %bulk.recipient,
                        delivered = bulk.delivered.len(),
                        mail_error = %bulk.source,
                        "Bulk mail delivery stopped"
                    );
                }
                CertmailError::Internal(internal_err) => {
                    tracing::error!(
                        status = status.as_u16(),
                        internal_error = ?internal_err,
                        "Internal server error"
                    );
                }
            }

            let body = match &self {
                CertmailError::BulkSend(bulk) => json!({
                    "error": self.to_string(),
                    "recipient": bulk.recipient,
                    "delivered": bulk.delivered,
                }),
                _ => json!({"error": self.to_string()}),
            };
            (status, Json(body)).into_response()
        }
    }
}
