use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Guard scoping the role set used by this API.
pub const API_GUARD: &str = "api";

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Permission gating read access to the catalog.
pub const PERM_VIEW_PRODUCT: &str = "view product";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub guard_name: String,
}

/// Role shape embedded in user payloads.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleSummary {
    pub id: i64,
    pub name: String,
}
