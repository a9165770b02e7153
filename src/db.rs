use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::models::{member, role};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Seed role definitions and, when no administrator exists yet, an admin
/// account with the given credentials.
pub async fn seed(pool: &SqlitePool, admin_email: &str, admin_password_hash: &str) -> Result<(), sqlx::Error> {
    role::seed(pool).await?;

    if role::count_members_with(pool, role::ADMIN).await? > 0 {
        log::info!("Administrator present, skipping admin seed");
        return Ok(());
    }

    let member_id = match member::find_by_email(pool, admin_email).await? {
        Some(existing) => existing.id,
        None => {
            member::create(
                pool,
                &member::NewMember {
                    email: admin_email.to_string(),
                    full_name: "Administrator".to_string(),
                    form_class: None,
                    password_hash: admin_password_hash.to_string(),
                },
            )
            .await?
        }
    };

    if let Some(admin) = role::find_by_name(pool, role::ADMIN).await? {
        role::assign(pool, member_id, admin.id).await?;
    }
    log::info!("Seeded administrator account {admin_email}");
    Ok(())
}
