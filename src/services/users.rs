use std::collections::HashSet;
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::User;
use crate::storage::UserStore;
use crate::validation;

/// Relationship service: user records plus the friendship operations.
///
/// Both user ids are resolved before any graph mutation, so a request or
/// removal naming an unknown user fails without touching the graph.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn get_all(&self) -> AppResult<Vec<User>> {
        self.users.get_all().await
    }

    pub async fn add(&self, mut user: User) -> AppResult<User> {
        validation::user(&user)?;
        default_blank_name(&mut user);
        self.users.add(user).await
    }

    pub async fn update(&self, mut user: User) -> AppResult<User> {
        validation::user(&user)?;
        default_blank_name(&mut user);
        self.users.update(user).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        self.users.get_by_id(id).await
    }

    pub async fn make_friends(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        self.users.ensure_exists(user_id).await?;
        self.users.ensure_exists(friend_id).await?;
        self.users.add_friend(user_id, friend_id).await
    }

    pub async fn remove_friends(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        self.users.ensure_exists(user_id).await?;
        self.users.ensure_exists(friend_id).await?;
        self.users.remove_friend(user_id, friend_id).await
    }

    pub async fn friend_list(&self, user_id: i64) -> AppResult<Vec<User>> {
        self.users.ensure_exists(user_id).await?;
        self.users.friends_of(user_id).await
    }

    /// Intersection of two users' friend lists, ordered by ascending id.
    /// Both users must exist even when either list is empty.
    pub async fn common_friends(&self, user_id: i64, other_id: i64) -> AppResult<Vec<User>> {
        self.users.ensure_exists(user_id).await?;
        self.users.ensure_exists(other_id).await?;

        let friends = self.users.friends_of(user_id).await?;
        let other_ids: HashSet<i64> = self
            .users
            .friends_of(other_id)
            .await?
            .iter()
            .filter_map(|user| user.id)
            .collect();

        Ok(friends
            .into_iter()
            .filter(|user| user.id.is_some_and(|id| other_ids.contains(&id)))
            .collect())
    }
}

/// A blank display name falls back to the login.
fn default_blank_name(user: &mut User) {
    if user.name.trim().is_empty() {
        user.name = user.login.clone();
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mockall::predicate::eq;

    use super::*;
    use crate::error::AppError;
    use crate::storage::MockUserStore;

    fn user(id: Option<i64>, login: &str) -> User {
        User {
            id,
            email: format!("{login}@example.com"),
            login: login.to_string(),
            name: login.to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 3, 14).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_blank_name_defaults_to_login() {
        let mut store = MockUserStore::new();
        store.expect_add().returning(|user| {
            let mut stored = user;
            stored.id = Some(1);
            Ok(stored)
        });
        let service = UserService::new(Arc::new(store));

        let mut candidate = user(None, "ada");
        candidate.name = "   ".to_string();

        let stored = service.add(candidate).await.unwrap();
        assert_eq!(stored.name, "ada");
    }

    #[tokio::test]
    async fn test_invalid_user_never_reaches_store() {
        // No expect_add: a store call would panic the test.
        let store = MockUserStore::new();
        let service = UserService::new(Arc::new(store));

        let mut candidate = user(None, "ada");
        candidate.email = String::new();

        let err = service.add(candidate).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_make_friends_reports_the_missing_user() {
        let mut store = MockUserStore::new();
        store
            .expect_ensure_exists()
            .with(eq(1))
            .returning(|_| Ok(()));
        store
            .expect_ensure_exists()
            .with(eq(99))
            .returning(|id| Err(AppError::user_not_found(id)));
        let service = UserService::new(Arc::new(store));

        let err = service.make_friends(1, 99).await.unwrap_err();
        match err {
            AppError::NotFound(message) => assert!(message.contains("99")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_common_friends_intersects_by_id() {
        let mut store = MockUserStore::new();
        store.expect_ensure_exists().returning(|_| Ok(()));
        store.expect_friends_of().with(eq(1)).returning(|_| {
            Ok(vec![user(Some(3), "edsger"), user(Some(4), "barbara")])
        });
        store.expect_friends_of().with(eq(2)).returning(|_| {
            Ok(vec![user(Some(4), "barbara"), user(Some(5), "donald")])
        });
        let service = UserService::new(Arc::new(store));

        let common = service.common_friends(1, 2).await.unwrap();
        let ids: Vec<i64> = common.iter().filter_map(|u| u.id).collect();
        assert_eq!(ids, vec![4]);
    }

    #[tokio::test]
    async fn test_common_friends_requires_both_users() {
        let mut store = MockUserStore::new();
        store
            .expect_ensure_exists()
            .with(eq(1))
            .returning(|_| Ok(()));
        store
            .expect_ensure_exists()
            .with(eq(2))
            .returning(|id| Err(AppError::user_not_found(id)));
        let service = UserService::new(Arc::new(store));

        let err = service.common_friends(1, 2).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
