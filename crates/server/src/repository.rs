use certmail_common::entities::certificates;
use certmail_common::models::CertificatePayload;
use certmail_common::{CertmailError, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::debug;

type CertificateModel = certificates::Model;

/// Parses the `{id}` path segment of a certificate route.
pub fn parse_certificate_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|_| CertmailError::bad_request(format!("invalid certificate id: {}", raw)))
}

#[derive(Clone)]
pub struct CertificateRepository {
    db: DatabaseConnection,
}

impl CertificateRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: i64) -> Result<CertificateModel> {
        certificates::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| CertmailError::not_found(format!("certificate {}", id)))
    }

    pub async fn create(&self, payload: CertificatePayload) -> Result<CertificateModel> {
        let active = certificates::ActiveModel {
            name: Set(payload.name),
            content: Set(payload.content),
            owner: Set(payload.owner),
            date: Set(payload.date),
            ..Default::default()
        };
        let certificate = active.insert(&self.db).await?;
        debug!(certificate_id = certificate.id, "certificate created");
        Ok(certificate)
    }

    /// Every stored certificate, in whatever order storage returns them.
    pub async fn list(&self) -> Result<Vec<CertificateModel>> {
        Ok(certificates::Entity::find().all(&self.db).await?)
    }

    /// Overwrites all mutable fields of an existing certificate.
    pub async fn update(&self, id: i64, payload: CertificatePayload) -> Result<CertificateModel> {
        let certificate = self.get(id).await?;

        let mut active: certificates::ActiveModel = certificate.into();
        active.name = Set(payload.name);
        active.content = Set(payload.content);
        active.owner = Set(payload.owner);
        active.date = Set(payload.date);

        let updated = active.update(&self.db).await?;
        debug!(certificate_id = updated.id, "certificate updated");
        Ok(updated)
    }
}
