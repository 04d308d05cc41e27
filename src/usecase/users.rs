use uuid::Uuid;

use crate::domain::user::User;
use crate::usecase::capabilities::{self, Visibility};
use crate::usecase::contracts::UserRepository;
use crate::usecase::error::UsecaseError;

pub struct UsersUseCase<U>
where
    U: UserRepository,
{
    user_repository: U,
}

impl<U> UsersUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repository: U) -> Self {
        Self { user_repository }
    }

    /// Lists users scoped to what the requester's role may see, per the
    /// capability table.
    #[tracing::instrument(skip(self), fields(%requester_role))]
    pub async fn list_users(&self, requester_role: &str) -> Result<Vec<User>, UsecaseError> {
        tracing::debug!("listing users");

        let users = match capabilities::visible_user_roles(requester_role) {
            Visibility::All => self.user_repository.find_all().await?,
            Visibility::Only(roles) => {
                let roles = roles.iter().map(|r| r.to_string()).collect();
                self.user_repository.find_by_roles(roles).await?
            }
            Visibility::None => {
                tracing::warn!("unknown role attempted to list users");
                return Err(UsecaseError::Forbidden("Unauthorized".to_string()));
            }
        };

        tracing::debug!(count = users.len(), "retrieved users");
        Ok(users)
    }

    #[tracing::instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, UsecaseError> {
        let user = self
            .user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("User".to_string()))?;

        Ok(user)
    }

    #[tracing::instrument(skip(self, name, email), fields(%role))]
    pub async fn create_user(
        &self,
        name: String,
        email: String,
        role: String,
    ) -> Result<User, UsecaseError> {
        tracing::debug!("creating user");

        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(UsecaseError::Validation(
                "Please provide name and email".to_string(),
            ));
        }

        if self.user_repository.find_by_email(&email).await?.is_some() {
            return Err(UsecaseError::Validation(
                "User with this email already exists".to_string(),
            ));
        }

        let user = User::new(name, email, role);
        self.user_repository.create(&user).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    /// Updates a user. Returns the updated user and whether the role changed,
    /// so the caller can fire the role-change notification.
    #[tracing::instrument(skip(self, name, email, role), fields(user_id = %id))]
    pub async fn update_user(
        &self,
        id: Uuid,
        name: Option<String>,
        email: Option<String>,
        role: Option<String>,
    ) -> Result<(User, bool), UsecaseError> {
        tracing::debug!("updating user");

        let mut user = self
            .user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("User".to_string()))?;

        let role_changed = role.as_ref().is_some_and(|r| *r != user.role);

        user.update(name, email, role);
        self.user_repository.update(&user).await?;

        tracing::info!(user_id = %user.id, role_changed, "user updated");
        Ok((user, role_changed))
    }

    #[tracing::instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), UsecaseError> {
        tracing::debug!("deleting user");

        match self.user_repository.delete(id).await {
            Ok(()) => {
                tracing::info!(user_id = %id, "user deleted");
                Ok(())
            }
            Err(crate::repository::errors::RepositoryError::NotFound) => {
                Err(UsecaseError::NotFound("User".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::contracts::MockUserRepository;

    #[tokio::test]
    async fn test_admin_lists_all_users() {
        let mut user_repo = MockUserRepository::new();

        user_repo.expect_find_all().times(1).returning(|| Ok(vec![]));

        let usecase = UsersUseCase::new(user_repo);
        assert!(usecase.list_users("admin").await.is_ok());
    }

    #[tokio::test]
    async fn test_manager_listing_excludes_admins() {
        let mut user_repo = MockUserRepository::new();

        user_repo
            .expect_find_by_roles()
            .withf(|roles| !roles.contains(&"admin".to_string()))
            .times(1)
            .returning(|_| Ok(vec![]));

        let usecase = UsersUseCase::new(user_repo);
        assert!(usecase.list_users("manager").await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_role_cannot_list() {
        let user_repo = MockUserRepository::new();

        let usecase = UsersUseCase::new(user_repo);
        let result = usecase.list_users("auditor").await;

        assert!(matches!(result, Err(UsecaseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let mut user_repo = MockUserRepository::new();
        let existing = User::new(
            "Existing".to_string(),
            "dup@test.com".to_string(),
            "staff".to_string(),
        );

        user_repo
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        let usecase = UsersUseCase::new(user_repo);
        let result = usecase
            .create_user("New".to_string(), "dup@test.com".to_string(), "staff".to_string())
            .await;

        assert!(matches!(result, Err(UsecaseError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_user_reports_role_change() {
        let mut user_repo = MockUserRepository::new();
        let user = User::new(
            "Staff".to_string(),
            "staff@test.com".to_string(),
            "staff".to_string(),
        );
        let id = user.id;

        user_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        user_repo.expect_update().times(1).returning(|_| Ok(()));

        let usecase = UsersUseCase::new(user_repo);
        let (updated, role_changed) = usecase
            .update_user(id, None, None, Some("manager".to_string()))
            .await
            .unwrap();

        assert!(role_changed);
        assert_eq!(updated.role, "manager");
    }

    #[tokio::test]
    async fn test_update_user_same_role_is_not_a_change() {
        let mut user_repo = MockUserRepository::new();
        let user = User::new(
            "Staff".to_string(),
            "staff@test.com".to_string(),
            "staff".to_string(),
        );
        let id = user.id;

        user_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        user_repo.expect_update().times(1).returning(|_| Ok(()));

        let usecase = UsersUseCase::new(user_repo);
        let (_, role_changed) = usecase
            .update_user(id, Some("Renamed".to_string()), None, Some("staff".to_string()))
            .await
            .unwrap();

        assert!(!role_changed);
    }
}
