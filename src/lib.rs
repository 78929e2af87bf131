//! Clinicdesk — front-desk, consultation, and pharmacy workflow for a
//! small clinic, served as a local HTTP API over SQLite.

pub mod api;
pub mod auth;
pub mod billing;
pub mod config;
pub mod core_state;
pub mod db;
pub mod document;
pub mod layout;
pub mod models;
pub mod suggest;
pub mod validation;
pub mod visibility;
pub mod workflow;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::core_state::CoreState;

/// Initialize logging, storage, and the HTTP server, then run until
/// interrupted.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let db_path = config::database_path();
    let conn = db::open_database(&db_path)?;
    bootstrap_admin_account(&conn)?;
    drop(conn);

    let core = Arc::new(CoreState::new(db_path));
    let mut server = api::server::start_server(core, config::bind_addr()).await?;

    tracing::info!(addr = %server.addr, "{} ready", config::APP_NAME);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupt received, shutting down");
    server.shutdown();

    Ok(())
}

/// First-run bootstrap: when no login account exists, create `admin`.
///
/// The password comes from `CLINICDESK_ADMIN_PASSWORD`; otherwise a
/// random one is generated and logged once so the operator can log in
/// and is forced to note it down.
fn bootstrap_admin_account(conn: &rusqlite::Connection) -> Result<(), Box<dyn std::error::Error>> {
    if db::get_account(conn, "admin")?.is_some() {
        return Ok(());
    }

    let (password, generated) = match std::env::var("CLINICDESK_ADMIN_PASSWORD") {
        Ok(p) if !p.is_empty() => (p, false),
        _ => (auth::generate_token(), true),
    };

    let account = db::UserAccount {
        username: "admin".to_string(),
        password_hash: auth::hash_password(&password)?,
    };
    db::insert_account(conn, &account)?;

    if generated {
        tracing::warn!("Created admin account with generated password: {password}");
    } else {
        tracing::info!("Created admin account from CLINICDESK_ADMIN_PASSWORD");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn bootstrap_creates_admin_once() {
        let conn = open_memory_database().unwrap();
        assert!(db::get_account(&conn, "admin").unwrap().is_none());

        bootstrap_admin_account(&conn).unwrap();
        let account = db::get_account(&conn, "admin").unwrap().unwrap();
        assert!(account.password_hash.starts_with("$pbkdf2"));

        // Second call leaves the existing account alone
        bootstrap_admin_account(&conn).unwrap();
        let again = db::get_account(&conn, "admin").unwrap().unwrap();
        assert_eq!(account.password_hash, again.password_hash);
    }
}
