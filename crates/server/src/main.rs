mod api;
mod auth;
mod db;
mod mailer;
mod metrics;
mod repository;
mod state;

#[cfg(test)]
mod test_support;

use crate::auth::BearerAuth;
use crate::db::init_db;
use crate::mailer::SmtpMailer;
use crate::state::AppState;
use anyhow::Result;
use certmail_common::config::AppConfig;
use std::future::IntoFuture;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env()?;
    info!(
        listen_addr = %config.listen_addr,
        smtp_host = %config.smtp.host,
        smtp_port = config.smtp.port,
        "starting certificate service"
    );

    let db = init_db(&config.database_url, config.db_max_connections).await?;
    let mailer = SmtpMailer::new(&config.smtp)?;
    let state = AppState::new(db, Arc::new(mailer), BearerAuth::new(&config.auth_token));

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("certificate service listening on {}", config.listen_addr);

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            if let Err(err) = result {
                warn!("http server exited: {}", err);
                return Err(err.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
        }
    }

    Ok(())
}
