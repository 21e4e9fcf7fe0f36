use sqlx::PgPool;

use crate::interceptors::AppResult;
use crate::models::role::ROLE_ADMIN;
use crate::models::User;
use crate::services::role_service;
use crate::utils::hash_password;

/// Idempotent bootstrap of the admin account. Roles and permissions are
/// seeded by the migrations; the admin user needs a hashed password, so it
/// happens here at startup.
pub async fn run(db: &PgPool) -> AppResult<()> {
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "12345678".to_string());

    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(db)
        .await?;

    let admin = match existing {
        Some(user) => user,
        None => {
            let hashed = hash_password(&password)?;
            let user = sqlx::query_as::<_, User>(
                "INSERT INTO users (first_name, last_name, email, password, status)
                 VALUES ('Admin', 'Root', $1, $2, 'ACTIVE')
                 RETURNING *",
            )
            .bind(&email)
            .bind(&hashed)
            .fetch_one(db)
            .await?;

            tracing::info!("Seeded admin user {}", email);
            user
        }
    };

    role_service::assign_roles(db, admin.id, &[ROLE_ADMIN.to_string()]).await?;

    Ok(())
}
