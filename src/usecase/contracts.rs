use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::notification::Notification;
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::domain::user::User;
use crate::repository::errors::RepositoryError;

#[cfg_attr(test, mockall::automock)]
pub trait NotificationRepository: Send + Sync {
    /// Inserts the whole batch in one transaction: all records or none.
    async fn create_batch(&self, notifications: &[Notification]) -> Result<(), RepositoryError>;
    async fn find_by_recipient(
        &self,
        recipient: Uuid,
        unread_only: bool,
        types: Option<Vec<String>>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, RepositoryError>;
    async fn find_owned(&self, recipient: Uuid, id: Uuid) -> Result<Option<Notification>, RepositoryError>;
    async fn count_unread(&self, recipient: Uuid) -> Result<i64, RepositoryError>;
    async fn mark_read(&self, recipient: Uuid, ids: Vec<Uuid>) -> Result<u64, RepositoryError>;
    async fn mark_all_read(&self, recipient: Uuid) -> Result<u64, RepositoryError>;
    async fn delete_by_recipient(&self, recipient: Uuid) -> Result<u64, RepositoryError>;
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;
    async fn find_by_roles(&self, roles: Vec<String>) -> Result<Vec<User>, RepositoryError>;
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: &Order) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError>;
    async fn find_by_assignee(&self, user_id: Uuid) -> Result<Vec<Order>, RepositoryError>;
    async fn update(&self, order: &Order) -> Result<(), RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn update(&self, product: &Product) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait SettingsRepository: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError>;
    async fn set_value(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError>;
}
