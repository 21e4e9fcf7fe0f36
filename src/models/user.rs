use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const STATUS_ACTIVE: &str = "ACTIVE";
pub const STATUS_INACTIVE: &str = "INACTIVE";

/// User model (database entity). The password hash never leaves this type;
/// wire representations are built in the dto layer.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub mobile: Option<String>,
    pub password: String,
    pub status: String,
    pub device_id: Option<String>,
    pub avatar: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim().to_string();
        if name.is_empty() {
            "Unknown User".to_string()
        } else {
            name
        }
    }
}

/// Audit summary resolved from created_by/updated_by references.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;

    pub(crate) fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 1,
            first_name: Some("Jane".to_string()),
            last_name: Some("Smith".to_string()),
            email: "jane@example.com".to_string(),
            mobile: None,
            password: "hash".to_string(),
            status: STATUS_ACTIVE.to_string(),
            device_id: None,
            avatar: None,
            email_verified_at: None,
            created_by: None,
            updated_by: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::tests_support::sample_user;

    #[test]
    fn full_name_joins_and_trims() {
        let mut user = sample_user();
        assert_eq!(user.full_name(), "Jane Smith");

        user.last_name = None;
        assert_eq!(user.full_name(), "Jane");
    }

    #[test]
    fn full_name_falls_back_when_empty() {
        let mut user = sample_user();
        user.first_name = None;
        user.last_name = None;
        assert_eq!(user.full_name(), "Unknown User");
    }
}
