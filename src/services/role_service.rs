//! Role/permission authority, scoped to the `api` guard.

use sqlx::PgPool;

use crate::interceptors::{AppError, AppResult};
use crate::models::{role::API_GUARD, Role, RoleSummary};

pub async fn role_names_for_user(db: &PgPool, user_id: i64) -> AppResult<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT r.name FROM roles r
         JOIN role_user ru ON ru.role_id = r.id
         WHERE ru.user_id = $1 AND r.guard_name = $2
         ORDER BY r.name",
    )
    .bind(user_id)
    .bind(API_GUARD)
    .fetch_all(db)
    .await?;

    Ok(names)
}

pub async fn roles_for_user(db: &PgPool, user_id: i64) -> AppResult<Vec<RoleSummary>> {
    let roles = sqlx::query_as::<_, RoleSummary>(
        "SELECT r.id, r.name FROM roles r
         JOIN role_user ru ON ru.role_id = r.id
         WHERE ru.user_id = $1 AND r.guard_name = $2
         ORDER BY r.name",
    )
    .bind(user_id)
    .bind(API_GUARD)
    .fetch_all(db)
    .await?;

    Ok(roles)
}

pub async fn has_role(db: &PgPool, user_id: i64, role_name: &str) -> AppResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
            SELECT 1 FROM roles r
            JOIN role_user ru ON ru.role_id = r.id
            WHERE ru.user_id = $1 AND r.name = $2 AND r.guard_name = $3
        )",
    )
    .bind(user_id)
    .bind(role_name)
    .bind(API_GUARD)
    .fetch_one(db)
    .await?;

    Ok(exists)
}

/// Permission check, derived transitively through the user's roles.
pub async fn has_permission(db: &PgPool, user_id: i64, permission_name: &str) -> AppResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
            SELECT 1 FROM permissions p
            JOIN permission_role pr ON pr.permission_id = p.id
            JOIN role_user ru ON ru.role_id = pr.role_id
            WHERE ru.user_id = $1 AND p.name = $2 AND p.guard_name = $3
        )",
    )
    .bind(user_id)
    .bind(permission_name)
    .bind(API_GUARD)
    .fetch_one(db)
    .await?;

    Ok(exists)
}

/// Resolve role names to rows, failing validation on unknown names.
async fn resolve_roles(db: &PgPool, role_names: &[String]) -> AppResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT * FROM roles WHERE name = ANY($1) AND guard_name = $2",
    )
    .bind(role_names)
    .bind(API_GUARD)
    .fetch_all(db)
    .await?;

    if roles.len() != role_names.len() {
        return Err(AppError::field_validation("roles", "One or more roles do not exist"));
    }

    Ok(roles)
}

/// Additive role assignment.
pub async fn assign_roles(db: &PgPool, user_id: i64, role_names: &[String]) -> AppResult<()> {
    let roles = resolve_roles(db, role_names).await?;

    for role in &roles {
        sqlx::query("INSERT INTO role_user (role_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(role.id)
            .bind(user_id)
            .execute(db)
            .await?;
    }

    Ok(())
}

/// Replace the user's full role set in one operation.
pub async fn sync_roles(db: &PgPool, user_id: i64, role_names: &[String]) -> AppResult<()> {
    let roles = resolve_roles(db, role_names).await?;

    sqlx::query("DELETE FROM role_user WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await?;

    for role in &roles {
        sqlx::query("INSERT INTO role_user (role_id, user_id) VALUES ($1, $2)")
            .bind(role.id)
            .bind(user_id)
            .execute(db)
            .await?;
    }

    Ok(())
}
