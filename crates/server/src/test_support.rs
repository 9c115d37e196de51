use crate::db::migrate;
use crate::mailer::{Mailer, OutgoingMail};
use async_trait::async_trait;
use certmail_common::MailError;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Mutex;

/// A migrated SQLite database that lives as long as its single connection.
pub async fn memory_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migrate(&db).await.unwrap();
    db
}

/// A migrated database whose pool is already closed, so every query fails
/// with a storage error.
pub async fn closed_db() -> DatabaseConnection {
    let db = memory_db().await;
    db.close_by_ref().await.unwrap();
    db
}

/// Records every message instead of talking SMTP. Optionally fails for one
/// recipient address.
#[derive(Default)]
pub struct RecordingMailer {
    fail_for: Option<String>,
    attempts: Mutex<Vec<String>>,
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub fn failing_for(address: &str) -> Self {
        Self {
            fail_for: Some(address.to_string()),
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let address = mail.to.email.to_string();
        self.attempts.lock().unwrap().push(address.clone());
        if self.fail_for.as_deref() == Some(address.as_str()) {
            return Err(MailError::Smtp("550 mailbox unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}
