use chrono::{DateTime, Utc};
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::{
    domain::notification::Notification,
    domain::order::Order,
    domain::product::Product,
    domain::user::User,
    repository::errors::RepositoryError,
    usecase::contracts::{
        NotificationRepository, OrderRepository, ProductRepository, SettingsRepository,
        UserRepository,
    },
};

fn map_db_err(e: sqlx::Error) -> RepositoryError {
    if let Some(db_err) = e.as_database_error() {
        // 23505 = unique_violation
        if db_err.code().as_deref() == Some("23505") {
            return RepositoryError::Conflict(db_err.to_string());
        }
    }
    RepositoryError::DatabaseError(e.to_string())
}

/// Enum-typed fields are persisted as their wire strings; rows are decoded
/// through this intermediate so that an unknown string surfaces as a store
/// error instead of panicking.
#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient: Uuid,
    notification_type: String,
    content: String,
    severity: String,
    related_entity: Option<serde_json::Value>,
    metadata: serde_json::Value,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = RepositoryError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let notification_type = row
            .notification_type
            .parse()
            .map_err(RepositoryError::DatabaseError)?;
        let severity = row.severity.parse().map_err(RepositoryError::DatabaseError)?;
        let related_entity = row
            .related_entity
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(Notification {
            id: row.id,
            recipient: row.recipient,
            notification_type,
            content: row.content,
            severity,
            related_entity,
            metadata: row.metadata,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl NotificationRepository for PostgresNotificationRepository {
    #[tracing::instrument(skip(self, notifications), fields(count = notifications.len()))]
    async fn create_batch(&self, notifications: &[Notification]) -> Result<(), RepositoryError> {
        tracing::debug!("inserting notification batch");

        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        for notification in notifications {
            let related_entity = notification
                .related_entity
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

            sqlx::query(
                r#"
                INSERT INTO notifications
                    (id, recipient, notification_type, content, severity, related_entity, metadata, is_read, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(notification.id)
            .bind(notification.recipient)
            .bind(notification.notification_type.as_str())
            .bind(&notification.content)
            .bind(notification.severity.as_str())
            .bind(related_entity)
            .bind(&notification.metadata)
            .bind(notification.is_read)
            .bind(notification.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        tx.commit().await.map_err(map_db_err)?;

        tracing::debug!(count = notifications.len(), "notification batch inserted");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(%recipient, unread_only, %limit, %offset))]
    async fn find_by_recipient(
        &self,
        recipient: Uuid,
        unread_only: bool,
        types: Option<Vec<String>>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        tracing::debug!("finding notifications by recipient");

        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, recipient, notification_type, content, severity, related_entity, metadata, is_read, created_at
            FROM notifications
            WHERE recipient = $1
              AND (NOT $2::bool OR is_read = FALSE)
              AND ($3::text[] IS NULL OR notification_type = ANY($3))
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(recipient)
        .bind(unread_only)
        .bind(types)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        let notifications = rows
            .into_iter()
            .map(Notification::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = notifications.len(), "found notifications");
        Ok(notifications)
    }

    #[tracing::instrument(skip(self), fields(%recipient, notification_id = %id))]
    async fn find_owned(&self, recipient: Uuid, id: Uuid) -> Result<Option<Notification>, RepositoryError> {
        tracing::debug!("finding owned notification");

        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, recipient, notification_type, content, severity, related_entity, metadata, is_read, created_at
            FROM notifications
            WHERE id = $1 AND recipient = $2
            "#,
        )
        .bind(id)
        .bind(recipient)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(Notification::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(%recipient))]
    async fn count_unread(&self, recipient: Uuid) -> Result<i64, RepositoryError> {
        tracing::debug!("counting unread notifications");

        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM notifications WHERE recipient = $1 AND is_read = FALSE
            "#,
        )
        .bind(recipient)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        tracing::debug!(count = count.0, "counted unread notifications");
        Ok(count.0)
    }

    #[tracing::instrument(skip(self, ids), fields(%recipient, id_count = ids.len()))]
    async fn mark_read(&self, recipient: Uuid, ids: Vec<Uuid>) -> Result<u64, RepositoryError> {
        tracing::debug!("marking notifications as read");

        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE recipient = $1 AND id = ANY($2) AND is_read = FALSE
            "#,
        )
        .bind(recipient)
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        tracing::debug!(updated = result.rows_affected(), "notifications marked as read");
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(%recipient))]
    async fn mark_all_read(&self, recipient: Uuid) -> Result<u64, RepositoryError> {
        tracing::debug!("marking all notifications as read");

        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE recipient = $1 AND is_read = FALSE
            "#,
        )
        .bind(recipient)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        tracing::debug!(updated = result.rows_affected(), "all notifications marked as read");
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(%recipient))]
    async fn delete_by_recipient(&self, recipient: Uuid) -> Result<u64, RepositoryError> {
        tracing::debug!("deleting notifications by recipient");

        let result = sqlx::query(
            r#"
            DELETE FROM notifications WHERE recipient = $1
            "#,
        )
        .bind(recipient)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        tracing::debug!(deleted = result.rows_affected(), "notifications deleted");
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(%cutoff))]
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        tracing::debug!("deleting expired notifications");

        let result = sqlx::query(
            r#"
            DELETE FROM notifications WHERE created_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        tracing::debug!(deleted = result.rows_affected(), "expired notifications deleted");
        Ok(result.rows_affected())
    }
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id, role = %user.role))]
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        tracing::debug!("creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.role)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        tracing::debug!(user_id = %user.id, "user created successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(user_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        tracing::debug!("finding user by id");

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(user)
    }

    #[tracing::instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        tracing::debug!("finding user by email");

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        tracing::debug!("finding all users");

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, active, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        tracing::debug!(count = users.len(), "found users");
        Ok(users)
    }

    #[tracing::instrument(skip(self), fields(?roles))]
    async fn find_by_roles(&self, roles: Vec<String>) -> Result<Vec<User>, RepositoryError> {
        tracing::debug!("finding users by roles");

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, active, created_at, updated_at
            FROM users
            WHERE role = ANY($1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(roles)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        tracing::debug!(count = users.len(), "found users by roles");
        Ok(users)
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        tracing::debug!("updating user");

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, role = $4, active = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.role)
        .bind(user.active)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(user_id = %user.id, "user updated successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(user_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        tracing::debug!("deleting user");

        let result = sqlx::query(
            r#"
            DELETE FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(user_id = %id, "user deleted successfully");
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    customer_name: String,
    total_amount: f64,
    status: String,
    payment_status: String,
    manager_id: Uuid,
    assigned_to: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(RepositoryError::DatabaseError)?;
        let payment_status = row
            .payment_status
            .parse()
            .map_err(RepositoryError::DatabaseError)?;

        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            customer_name: row.customer_name,
            total_amount: row.total_amount,
            status,
            payment_status,
            manager_id: row.manager_id,
            assigned_to: row.assigned_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for PostgresOrderRepository {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id, order_number = %order.order_number))]
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        tracing::debug!("creating order");

        sqlx::query(
            r#"
            INSERT INTO orders
                (id, order_number, customer_name, total_amount, status, payment_status, manager_id, assigned_to, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id)
        .bind(&order.order_number)
        .bind(&order.customer_name)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.manager_id)
        .bind(order.assigned_to)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        tracing::debug!(order_id = %order.id, "order created successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(order_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError> {
        tracing::debug!("finding order by id");

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, order_number, customer_name, total_amount, status, payment_status, manager_id, assigned_to, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(Order::try_from).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        tracing::debug!("finding all orders");

        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, order_number, customer_name, total_amount, status, payment_status, manager_id, assigned_to, created_at, updated_at
            FROM orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = orders.len(), "found orders");
        Ok(orders)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    async fn find_by_assignee(&self, user_id: Uuid) -> Result<Vec<Order>, RepositoryError> {
        tracing::debug!("finding orders by assignee");

        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, order_number, customer_name, total_amount, status, payment_status, manager_id, assigned_to, created_at, updated_at
            FROM orders
            WHERE assigned_to = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = orders.len(), "found orders by assignee");
        Ok(orders)
    }

    #[tracing::instrument(skip(self, order), fields(order_id = %order.id))]
    async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
        tracing::debug!("updating order");

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET customer_name = $2, total_amount = $3, status = $4, payment_status = $5,
                manager_id = $6, assigned_to = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(order.id)
        .bind(&order.customer_name)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.manager_id)
        .bind(order.assigned_to)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(order_id = %order.id, "order updated successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(order_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        tracing::debug!("deleting order");

        let result = sqlx::query(
            r#"
            DELETE FROM orders WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(order_id = %id, "order deleted successfully");
        Ok(())
    }
}

pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for PostgresProductRepository {
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        tracing::debug!("finding product by id");

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, quantity, reorder_level, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        tracing::debug!("finding all products");

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, quantity, reorder_level, created_at, updated_at
            FROM products
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        tracing::debug!(count = products.len(), "found products");
        Ok(products)
    }

    #[tracing::instrument(skip(self, product), fields(product_id = %product.id, quantity = product.quantity))]
    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        tracing::debug!("updating product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, sku = $3, quantity = $4, reorder_level = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.quantity)
        .bind(product.reorder_level)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(product_id = %product.id, "product updated successfully");
        Ok(())
    }
}

pub struct PostgresSettingsRepository {
    pool: PgPool,
}

impl PostgresSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SettingsRepository for PostgresSettingsRepository {
    #[tracing::instrument(skip(self))]
    async fn get_value(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        tracing::debug!("getting setting value");

        let row: Option<(serde_json::Value,)> = sqlx::query_as(
            r#"
            SELECT value FROM settings WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(row.map(|r| r.0))
    }

    #[tracing::instrument(skip(self, value))]
    async fn set_value(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        tracing::debug!("setting value");

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key)
            DO UPDATE SET value = $2, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        tracing::debug!("setting saved");
        Ok(())
    }
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
