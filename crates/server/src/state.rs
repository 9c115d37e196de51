use crate::auth::BearerAuth;
use crate::mailer::{MailDispatcher, Mailer};
use crate::repository::CertificateRepository;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub certificates: CertificateRepository,
    pub dispatcher: MailDispatcher,
    pub auth: BearerAuth,
}

impl AppState {
    pub fn new(db: DatabaseConnection, mailer: Arc<dyn Mailer>, auth: BearerAuth) -> Self {
        let certificates = CertificateRepository::new(db);
        let dispatcher = MailDispatcher::new(certificates.clone(), mailer);
        Self {
            certificates,
            dispatcher,
            auth,
        }
    }
}
