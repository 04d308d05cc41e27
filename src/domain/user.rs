use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, role: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            role,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update(&mut self, name: Option<String>, email: Option<String>, role: Option<String>) {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(role) = role {
            self.role = role;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new(
            "Manager User".to_string(),
            "manager@test.com".to_string(),
            "manager".to_string(),
        );

        assert_eq!(user.role, "manager");
        assert!(user.active);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_update_keeps_unset_fields() {
        let mut user = User::new(
            "Staff User".to_string(),
            "staff@test.com".to_string(),
            "staff".to_string(),
        );

        user.update(None, None, Some("manager".to_string()));

        assert_eq!(user.name, "Staff User");
        assert_eq!(user.email, "staff@test.com");
        assert_eq!(user.role, "manager");
    }
}
