pub mod config;
pub mod entities;
pub mod error;
pub mod models;

pub use config::{AppConfig, SmtpConfig, SmtpTls};
pub use error::{BulkSendError, CertmailError, MailError};

pub use error::Result;
