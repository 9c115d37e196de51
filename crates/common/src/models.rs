use serde::{Deserialize, Serialize};

/// Body of `POST /certificates` and `PUT /certificates/{id}`.
///
/// Missing fields fall back to their zero value and any `id` sent by the
/// caller is ignored; storage owns the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificatePayload {
    pub name: String,
    pub content: String,
    pub owner: String,
    pub date: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    pub email: String,
}

/// Body of `POST /send_bulk`. Missing fields decode as empty, so a request
/// without `emails` sends nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkSendRequest {
    pub emails: Vec<String>,
    pub content: String,
}
