use uuid::Uuid;

use crate::domain::notification::{Notification, NotificationType, RelatedEntity, Severity};
use crate::usecase::capabilities::{self, Visibility};
use crate::usecase::contracts::{NotificationRepository, UserRepository};
use crate::usecase::error::UsecaseError;

/// A logical notification request: one event, any number of explicit
/// recipients and/or roles to fan out to.
#[derive(Debug, Clone)]
pub struct CreateNotificationParams {
    pub notification_type: NotificationType,
    pub content: String,
    pub severity: Option<Severity>,
    pub recipients: Vec<Uuid>,
    pub roles: Vec<String>,
    pub related_entity: Option<RelatedEntity>,
    pub metadata: Option<serde_json::Value>,
}

impl CreateNotificationParams {
    pub fn new(notification_type: NotificationType, content: impl Into<String>) -> Self {
        Self {
            notification_type,
            content: content.into(),
            severity: None,
            recipients: Vec::new(),
            roles: Vec::new(),
            related_entity: None,
            metadata: None,
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn recipients(mut self, recipients: Vec<Uuid>) -> Self {
        self.recipients = recipients;
        self
    }

    pub fn roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn related_entity(mut self, related_entity: RelatedEntity) -> Self {
        self.related_entity = Some(related_entity);
        self
    }
}

#[derive(Debug, Clone)]
pub struct NotificationQuery {
    pub limit: i64,
    pub page: i64,
    pub unread_only: bool,
    pub types: Vec<NotificationType>,
}

impl Default for NotificationQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            page: 1,
            unread_only: false,
            types: Vec::new(),
        }
    }
}

/// Narrows an already-fetched notification list to what the given role may
/// see. Pure display policy consulting the capability table; admin passes
/// everything through, unknown roles see nothing.
pub fn filter_notifications_by_role(notifications: Vec<Notification>, role: &str) -> Vec<Notification> {
    match capabilities::visible_notification_types(role) {
        Visibility::All => notifications,
        Visibility::Only(types) => notifications
            .into_iter()
            .filter(|n| types.contains(&n.notification_type))
            .collect(),
        Visibility::None => Vec::new(),
    }
}

pub struct NotificationsUseCase<N, U>
where
    N: NotificationRepository,
    U: UserRepository,
{
    notification_repository: N,
    user_repository: U,
}

impl<N, U> NotificationsUseCase<N, U>
where
    N: NotificationRepository,
    U: UserRepository,
{
    pub fn new(notification_repository: N, user_repository: U) -> Self {
        Self {
            notification_repository,
            user_repository,
        }
    }

    /// Expands roles to their current user ids, unions with the explicit
    /// recipients, deduplicates, and inserts one record per recipient in a
    /// single transaction. An empty union is not an error.
    #[tracing::instrument(
        skip(self, params),
        fields(notification_type = %params.notification_type, recipient_count = params.recipients.len(), role_count = params.roles.len())
    )]
    pub async fn create_notification(
        &self,
        params: CreateNotificationParams,
    ) -> Result<Vec<Notification>, UsecaseError> {
        tracing::debug!("creating notification");

        if params.content.trim().is_empty() {
            return Err(UsecaseError::Validation(
                "Notification must have content".to_string(),
            ));
        }

        let mut recipients = params.recipients.clone();
        if !params.roles.is_empty() {
            let users = self.user_repository.find_by_roles(params.roles.clone()).await?;
            recipients.extend(users.into_iter().map(|u| u.id));
        }

        let mut seen = std::collections::HashSet::new();
        recipients.retain(|id| seen.insert(*id));

        if recipients.is_empty() {
            tracing::debug!("no recipients resolved, nothing to create");
            return Ok(Vec::new());
        }

        let severity = params.severity.unwrap_or_default();
        let metadata = params.metadata.unwrap_or_else(|| serde_json::json!({}));

        let notifications: Vec<Notification> = recipients
            .into_iter()
            .map(|recipient| {
                Notification::new(
                    recipient,
                    params.notification_type,
                    params.content.clone(),
                    severity,
                    params.related_entity.clone(),
                    metadata.clone(),
                )
            })
            .collect();

        self.notification_repository.create_batch(&notifications).await?;
        metrics::counter!("notifications_created_total").increment(notifications.len() as u64);

        tracing::info!(count = notifications.len(), "notifications created");
        Ok(notifications)
    }

    /// Same as [`create_notification`](Self::create_notification) but never
    /// fails: intended for domain-event side effects whose triggering action
    /// must not depend on notification delivery. Failures are logged and the
    /// notification is dropped.
    #[tracing::instrument(skip(self, params), fields(notification_type = %params.notification_type))]
    pub async fn notify_best_effort(&self, params: CreateNotificationParams) {
        if let Err(e) = self.create_notification(params).await {
            metrics::counter!("notifications_dropped_total").increment(1);
            tracing::error!(error = %e, "failed to create notification, dropping");
        }
    }

    #[tracing::instrument(skip(self, query), fields(user_id = %user_id, limit = query.limit, page = query.page))]
    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        query: NotificationQuery,
    ) -> Result<Vec<Notification>, UsecaseError> {
        tracing::debug!("listing notifications");

        // Non-positive pagination values are clamped rather than rejected.
        let limit = query.limit.max(1);
        let page = query.page.max(1);
        let offset = (page - 1) * limit;

        let types = if query.types.is_empty() {
            None
        } else {
            Some(query.types.iter().map(|t| t.as_str().to_string()).collect())
        };

        let notifications = self
            .notification_repository
            .find_by_recipient(user_id, query.unread_only, types, limit, offset)
            .await?;

        tracing::debug!(count = notifications.len(), "retrieved notifications");
        Ok(notifications)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn count_unread(&self, user_id: Uuid) -> Result<i64, UsecaseError> {
        tracing::debug!("counting unread notifications");

        let count = self.notification_repository.count_unread(user_id).await?;

        tracing::debug!(count, "unread count retrieved");
        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id, notification_id = %id))]
    pub async fn find_owned(&self, user_id: Uuid, id: Uuid) -> Result<Option<Notification>, UsecaseError> {
        let notification = self.notification_repository.find_owned(user_id, id).await?;
        Ok(notification)
    }

    /// Empty `ids` marks ALL of the user's unread notifications as read. The
    /// update is always scoped to the user's own records, so foreign ids fall
    /// out of the intersection. Returns the number of records flipped.
    #[tracing::instrument(skip(self, ids), fields(user_id = %user_id, id_count = ids.len()))]
    pub async fn mark_notifications_read(
        &self,
        user_id: Uuid,
        ids: Vec<Uuid>,
    ) -> Result<u64, UsecaseError> {
        tracing::debug!("marking notifications as read");

        let updated = if ids.is_empty() {
            self.notification_repository.mark_all_read(user_id).await?
        } else {
            self.notification_repository.mark_read(user_id, ids).await?
        };

        tracing::debug!(updated, "notifications marked as read");
        Ok(updated)
    }

    /// Deletes notifications created before the cutoff. Read and unread alike
    /// expire; retention is time-based only.
    #[tracing::instrument(skip(self), fields(%cutoff))]
    pub async fn purge_expired(
        &self,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, UsecaseError> {
        let deleted = self.notification_repository.delete_expired(cutoff).await?;

        if deleted > 0 {
            metrics::counter!("notifications_purged_total").increment(deleted);
            tracing::info!(deleted, "expired notifications purged");
        }
        Ok(deleted)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_all(&self, user_id: Uuid) -> Result<u64, UsecaseError> {
        tracing::debug!("clearing all notifications");

        let deleted = self.notification_repository.delete_by_recipient(user_id).await?;

        tracing::info!(deleted, "notifications cleared");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::User;
    use crate::usecase::contracts::{MockNotificationRepository, MockUserRepository};

    fn user_with_role(role: &str) -> User {
        User::new(
            format!("{} user", role),
            format!("{}@test.com", role),
            role.to_string(),
        )
    }

    fn notification_of_type(notification_type: NotificationType) -> Notification {
        Notification::new(
            Uuid::new_v4(),
            notification_type,
            "content".to_string(),
            Severity::Low,
            None,
            serde_json::json!({}),
        )
    }

    #[tokio::test]
    async fn test_role_fanout_one_record_per_user() {
        let mut notification_repo = MockNotificationRepository::new();
        let mut user_repo = MockUserRepository::new();

        let users = vec![
            user_with_role("admin"),
            user_with_role("manager"),
            user_with_role("staff"),
        ];
        let expected_ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();

        user_repo
            .expect_find_by_roles()
            .times(1)
            .returning(move |_| Ok(users.clone()));

        notification_repo
            .expect_create_batch()
            .withf(|batch: &[Notification]| batch.len() == 3)
            .times(1)
            .returning(|_| Ok(()));

        let usecase = NotificationsUseCase::new(notification_repo, user_repo);
        let params = CreateNotificationParams::new(
            NotificationType::SystemMaintenance,
            "System maintenance scheduled",
        )
        .severity(Severity::Medium)
        .roles(vec!["admin".to_string(), "manager".to_string(), "staff".to_string()]);

        let created = usecase.create_notification(params).await.unwrap();

        assert_eq!(created.len(), 3);
        for notification in &created {
            assert!(expected_ids.contains(&notification.recipient));
            assert!(!notification.is_read);
        }
    }

    #[tokio::test]
    async fn test_explicit_recipients_and_roles_deduplicated() {
        let mut notification_repo = MockNotificationRepository::new();
        let mut user_repo = MockUserRepository::new();

        let manager = user_with_role("manager");
        let manager_id = manager.id;

        user_repo
            .expect_find_by_roles()
            .times(1)
            .returning(move |_| Ok(vec![manager.clone()]));

        // Manager appears both explicitly and via role expansion: one record.
        notification_repo
            .expect_create_batch()
            .withf(move |batch: &[Notification]| {
                batch.len() == 2 && batch.iter().filter(|n| n.recipient == manager_id).count() == 1
            })
            .times(1)
            .returning(|_| Ok(()));

        let other_recipient = Uuid::new_v4();
        let usecase = NotificationsUseCase::new(notification_repo, user_repo);
        let params = CreateNotificationParams::new(NotificationType::LowStockAlert, "Low stock")
            .recipients(vec![other_recipient, manager_id])
            .roles(vec!["manager".to_string()]);

        let created = usecase.create_notification(params).await.unwrap();
        assert_eq!(created.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_union_is_not_an_error() {
        let notification_repo = MockNotificationRepository::new();
        let mut user_repo = MockUserRepository::new();

        user_repo
            .expect_find_by_roles()
            .times(1)
            .returning(|_| Ok(vec![]));

        let usecase = NotificationsUseCase::new(notification_repo, user_repo);
        let params = CreateNotificationParams::new(NotificationType::LowStockAlert, "Low stock")
            .roles(vec!["manager".to_string()]);

        let created = usecase.create_notification(params).await.unwrap();
        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn test_empty_content_is_rejected() {
        let notification_repo = MockNotificationRepository::new();
        let user_repo = MockUserRepository::new();

        let usecase = NotificationsUseCase::new(notification_repo, user_repo);
        let params = CreateNotificationParams::new(NotificationType::SecurityAlert, "   ")
            .recipients(vec![Uuid::new_v4()]);

        let result = usecase.create_notification(params).await;
        assert!(matches!(result, Err(UsecaseError::Validation(_))));
    }

    #[tokio::test]
    async fn test_severity_defaults_to_low() {
        let mut notification_repo = MockNotificationRepository::new();
        let user_repo = MockUserRepository::new();

        notification_repo
            .expect_create_batch()
            .times(1)
            .returning(|_| Ok(()));

        let usecase = NotificationsUseCase::new(notification_repo, user_repo);
        let params = CreateNotificationParams::new(NotificationType::OrderCreated, "New order")
            .recipients(vec![Uuid::new_v4()]);

        let created = usecase.create_notification(params).await.unwrap();
        assert_eq!(created[0].severity, Severity::Low);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_to_caller() {
        let mut notification_repo = MockNotificationRepository::new();
        let user_repo = MockUserRepository::new();

        notification_repo
            .expect_create_batch()
            .times(1)
            .returning(|_| Err(crate::repository::errors::RepositoryError::DatabaseError("connection reset".to_string())));

        let usecase = NotificationsUseCase::new(notification_repo, user_repo);
        let params = CreateNotificationParams::new(NotificationType::OrderCreated, "New order")
            .recipients(vec![Uuid::new_v4()]);

        let result = usecase.create_notification(params).await;
        assert!(matches!(result, Err(UsecaseError::Internal(_))));
    }

    #[tokio::test]
    async fn test_mark_read_with_empty_ids_marks_all() {
        let mut notification_repo = MockNotificationRepository::new();
        let user_repo = MockUserRepository::new();

        notification_repo
            .expect_mark_all_read()
            .times(1)
            .returning(|_| Ok(5));

        let usecase = NotificationsUseCase::new(notification_repo, user_repo);
        let updated = usecase
            .mark_notifications_read(Uuid::new_v4(), vec![])
            .await
            .unwrap();

        assert_eq!(updated, 5);
    }

    #[tokio::test]
    async fn test_mark_read_with_ids_scopes_to_given_set() {
        let mut notification_repo = MockNotificationRepository::new();
        let user_repo = MockUserRepository::new();

        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let expected = ids.clone();

        notification_repo
            .expect_mark_read()
            .withf(move |_, given| *given == expected)
            .times(1)
            .returning(|_, _| Ok(2));

        let usecase = NotificationsUseCase::new(notification_repo, user_repo);
        let updated = usecase
            .mark_notifications_read(Uuid::new_v4(), ids)
            .await
            .unwrap();

        assert_eq!(updated, 2);
    }

    #[tokio::test]
    async fn test_mark_read_foreign_ids_update_nothing() {
        let mut notification_repo = MockNotificationRepository::new();
        let user_repo = MockUserRepository::new();

        let caller = Uuid::new_v4();
        let foreign_id = Uuid::new_v4();

        // The update is scoped to the caller; ids owned by someone else fall
        // out of the intersection and flip zero rows.
        notification_repo
            .expect_mark_read()
            .withf(move |recipient, _| *recipient == caller)
            .times(1)
            .returning(|_, _| Ok(0));

        let usecase = NotificationsUseCase::new(notification_repo, user_repo);
        let updated = usecase
            .mark_notifications_read(caller, vec![foreign_id])
            .await
            .unwrap();

        assert_eq!(updated, 0);
    }

    #[tokio::test]
    async fn test_find_owned_is_scoped_to_caller() {
        let mut notification_repo = MockNotificationRepository::new();
        let user_repo = MockUserRepository::new();

        let caller = Uuid::new_v4();
        let foreign_id = Uuid::new_v4();

        notification_repo
            .expect_find_owned()
            .withf(move |recipient, id| *recipient == caller && *id == foreign_id)
            .times(1)
            .returning(|_, _| Ok(None));

        let usecase = NotificationsUseCase::new(notification_repo, user_repo);
        let found = usecase.find_owned(caller, foreign_id).await.unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_clamps_non_positive_pagination() {
        let mut notification_repo = MockNotificationRepository::new();
        let user_repo = MockUserRepository::new();

        notification_repo
            .expect_find_by_recipient()
            .withf(|_, _, _, limit, offset| *limit == 1 && *offset == 0)
            .times(1)
            .returning(|_, _, _, _, _| Ok(vec![]));

        let usecase = NotificationsUseCase::new(notification_repo, user_repo);
        let query = NotificationQuery {
            limit: -3,
            page: 0,
            ..Default::default()
        };

        usecase.list_notifications(Uuid::new_v4(), query).await.unwrap();
    }

    #[tokio::test]
    async fn test_purge_passes_cutoff_through() {
        let mut notification_repo = MockNotificationRepository::new();
        let user_repo = MockUserRepository::new();

        let cutoff = chrono::Utc::now() - chrono::Duration::days(30);

        notification_repo
            .expect_delete_expired()
            .withf(move |given| *given == cutoff)
            .times(1)
            .returning(|_| Ok(7));

        let usecase = NotificationsUseCase::new(notification_repo, user_repo);
        let deleted = usecase.purge_expired(cutoff).await.unwrap();

        assert_eq!(deleted, 7);
    }

    #[test]
    fn test_filter_admin_is_identity() {
        let notifications = vec![
            notification_of_type(NotificationType::TaskAssigned),
            notification_of_type(NotificationType::SecurityAlert),
            notification_of_type(NotificationType::LowStockAlert),
        ];
        let ids: Vec<Uuid> = notifications.iter().map(|n| n.id).collect();

        let filtered = filter_notifications_by_role(notifications, "admin");

        assert_eq!(filtered.iter().map(|n| n.id).collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_filter_staff_only_task_types() {
        let notifications = vec![
            notification_of_type(NotificationType::TaskAssigned),
            notification_of_type(NotificationType::OrderStatusChange),
            notification_of_type(NotificationType::OrderAssigned),
            notification_of_type(NotificationType::SecurityAlert),
        ];

        let filtered = filter_notifications_by_role(notifications, "staff");

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|n| matches!(
            n.notification_type,
            NotificationType::TaskAssigned
                | NotificationType::TaskCompleted
                | NotificationType::OrderAssigned
        )));
    }

    #[test]
    fn test_filter_manager_allow_list() {
        let notifications = vec![
            notification_of_type(NotificationType::LowStockAlert),
            notification_of_type(NotificationType::TaskAssigned),
            notification_of_type(NotificationType::PurchaseOrderCreated),
        ];

        let filtered = filter_notifications_by_role(notifications, "manager");

        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_unknown_role_is_empty() {
        let notifications = vec![notification_of_type(NotificationType::SystemMaintenance)];

        let filtered = filter_notifications_by_role(notifications, "intern");

        assert!(filtered.is_empty());
    }
}
