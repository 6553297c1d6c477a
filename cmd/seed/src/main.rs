//! Provisioning utility: creates an administrative identity.
//!
//! ```text
//! seed <username> <password>
//! ```
//!
//! Hashes the password with Argon2 and emits the admin row as JSON for
//! out-of-band insertion. With the `db-postgres` feature and `DATABASE_URL`
//! set, the row is inserted directly instead.

use anyhow::Result;
use chrono::Utc;
use secrecy::SecretString;
use uuid::Uuid;

use auth_adapters::hash_password;
use domains::AdminUser;

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (username, password) = match (args.next(), args.next()) {
        (Some(username), Some(password)) => (username, password),
        _ => {
            eprintln!("usage: seed <username> <password>");
            std::process::exit(2);
        }
    };

    let password_hash = hash_password(&SecretString::from(password))?;
    let admin = AdminUser {
        id: Uuid::new_v4(),
        username,
        password_hash,
        is_active: true,
        created_at: Utc::now(),
        last_login: None,
    };

    #[cfg(feature = "db-postgres")]
    {
        use anyhow::Context;
        use domains::IdentityRepo;
        use storage_adapters::postgres::PgIdentityRepo;

        let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await?;
        PgIdentityRepo::new(pool).insert(admin.clone()).await?;
        println!("admin '{}' provisioned", admin.username);
    }

    #[cfg(not(feature = "db-postgres"))]
    {
        let row = serde_json::json!({
            "id": admin.id,
            "username": admin.username,
            "password_hash": admin.password_hash,
            "is_active": admin.is_active,
            "created_at": admin.created_at,
        });
        println!("{}", serde_json::to_string_pretty(&row)?);
    }

    Ok(())
}
