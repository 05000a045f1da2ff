use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use repair_api::domain::repository::{
    FeedbackRepository, Notifier, RepairRequestRepository, UserRepository,
    VerificationTokenRepository,
};
use repair_api::domain::types::{
    Feedback, NewFeedback, NewRepairRequest, NewToken, NewUser, RepairFilter, RepairRequest, User,
    VerificationPolicy, VerificationToken,
};
use repair_api::error::ApiServiceError;
use repair_api::usecase::password::PasswordHasher;
use repair_domain::pagination::Sort;
use repair_domain::repair::{RepairSortBy, RepairStatus};
use repair_domain::user::UserRole;

pub const ADMIN_INVITE_CODE: &str = "JNUTechnicians";

// ── MockStore ────────────────────────────────────────────────────────────────

/// Users and tokens shared between the user and token mocks, so that
/// `create_with_token` and the token repository see the same rows.
#[derive(Clone, Default)]
pub struct MockStore {
    users: Arc<Mutex<Vec<User>>>,
    tokens: Arc<Mutex<Vec<VerificationToken>>>,
    next_id: Arc<AtomicI64>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn insert_user(&self, mut user: User) -> User {
        user.id = self.next_id();
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn insert_token(&self, user_id: i64, token: &NewToken) -> VerificationToken {
        let token = VerificationToken {
            id: self.next_id(),
            user_id,
            token: token.token.clone(),
            created_at: token.created_at,
            expires_at: token.expires_at,
        };
        self.tokens.lock().unwrap().push(token.clone());
        token
    }

    pub fn user_repo(&self) -> MockUserRepo {
        MockUserRepo {
            store: self.clone(),
        }
    }

    pub fn token_repo(&self) -> MockTokenRepo {
        MockTokenRepo {
            store: self.clone(),
            fail_delete: false,
        }
    }

    /// Returns a shared handle to the user rows for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }

    /// Returns a shared handle to the token rows for post-execution inspection.
    pub fn tokens_handle(&self) -> Arc<Mutex<Vec<VerificationToken>>> {
        Arc::clone(&self.tokens)
    }

    pub fn user(&self, id: i64) -> User {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .expect("user exists")
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    store: MockStore,
}

impl MockUserRepo {
    fn find(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.store
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| pred(u))
            .cloned()
    }

    fn modify(&self, id: i64, f: impl FnOnce(&mut User)) -> Result<(), ApiServiceError> {
        let mut users = self.store.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| ApiServiceError::Internal(anyhow::anyhow!("no user {id}")))?;
        f(user);
        user.updated_at = Utc::now();
        Ok(())
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiServiceError> {
        Ok(self.find(|u| u.id == id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiServiceError> {
        Ok(self.find(|u| u.email == email))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiServiceError> {
        Ok(self.find(|u| u.username == username))
    }

    async fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, ApiServiceError> {
        Ok(self
            .find(|u| u.username == username || u.email == email)
            .is_some())
    }

    async fn create_with_token(
        &self,
        user: &NewUser,
        token: &NewToken,
    ) -> Result<(User, VerificationToken), ApiServiceError> {
        let now = Utc::now();
        let user = self.store.insert_user(User {
            id: 0,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            is_verified: false,
            created_at: now,
            updated_at: now,
        });
        let token = self.store.insert_token(user.id, token);
        Ok((user, token))
    }

    async fn mark_verified(&self, id: i64) -> Result<(), ApiServiceError> {
        self.modify(id, |u| u.is_verified = true)
    }

    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<(), ApiServiceError> {
        self.modify(id, |u| u.password_hash = password_hash.to_owned())
    }
}

// ── MockTokenRepo ────────────────────────────────────────────────────────────

pub struct MockTokenRepo {
    store: MockStore,
    /// Make `delete` fail, to exercise the non-fatal cleanup path.
    pub fail_delete: bool,
}

impl VerificationTokenRepository for MockTokenRepo {
    async fn find_live(&self, code: &str) -> Result<Option<VerificationToken>, ApiServiceError> {
        Ok(self
            .store
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token == code && t.is_live())
            .cloned())
    }

    async fn replace_for_user(
        &self,
        user_id: i64,
        token: &NewToken,
    ) -> Result<VerificationToken, ApiServiceError> {
        self.store
            .tokens
            .lock()
            .unwrap()
            .retain(|t| t.user_id != user_id);
        Ok(self.store.insert_token(user_id, token))
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiServiceError> {
        if self.fail_delete {
            return Err(ApiServiceError::Internal(anyhow::anyhow!("db unavailable")));
        }
        let mut tokens = self.store.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.id != id);
        Ok(tokens.len() < before)
    }

    async fn delete_expired(&self) -> Result<u64, ApiServiceError> {
        let now = Utc::now();
        let mut tokens = self.store.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.is_live_at(now));
        Ok((before - tokens.len()) as u64)
    }
}

// ── Notifiers ────────────────────────────────────────────────────────────────

/// Records every `(address, code)` it is asked to deliver.
#[derive(Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        Arc::clone(&self.sent)
    }
}

impl Notifier for MockNotifier {
    async fn send(&self, address: &str, code: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((address.to_owned(), code.to_owned()));
        Ok(())
    }
}

pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    async fn send(&self, _address: &str, _code: &str) -> anyhow::Result<()> {
        anyhow::bail!("smtp: connection refused")
    }
}

/// Never finishes within any timeout used by the tests.
pub struct SlowNotifier;

impl Notifier for SlowNotifier {
    async fn send(&self, _address: &str, _code: &str) -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}

// ── MockRepairRepo ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockRepairRepo {
    requests: Arc<Mutex<Vec<RepairRequest>>>,
}

impl MockRepairRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests_handle(&self) -> Arc<Mutex<Vec<RepairRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl RepairRequestRepository for MockRepairRepo {
    async fn create(&self, request: &NewRepairRequest) -> Result<RepairRequest, ApiServiceError> {
        let mut requests = self.requests.lock().unwrap();
        let now = Utc::now();
        let created = RepairRequest {
            id: requests.len() as i64 + 1,
            user_id: request.user_id,
            technician_id: None,
            description: request.description.clone(),
            location: request.location.clone(),
            image_url: request.image_url.clone(),
            status: RepairStatus::Pending,
            priority: request.priority,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        requests.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RepairRequest>, ApiServiceError> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn list(&self, filter: RepairFilter) -> Result<Vec<RepairRequest>, ApiServiceError> {
        let mut items: Vec<RepairRequest> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        match filter.sort_by {
            RepairSortBy::CreatedAt(Sort::Asc) => items.sort_by_key(|r| (r.created_at, r.id)),
            RepairSortBy::CreatedAt(Sort::Desc) => {
                items.sort_by_key(|r| std::cmp::Reverse((r.created_at, r.id)))
            }
            RepairSortBy::UpdatedAt(Sort::Asc) => items.sort_by_key(|r| (r.updated_at, r.id)),
            RepairSortBy::UpdatedAt(Sort::Desc) => {
                items.sort_by_key(|r| std::cmp::Reverse((r.updated_at, r.id)))
            }
        }
        Ok(items
            .into_iter()
            .skip(filter.page.offset() as usize)
            .take(filter.page.limit() as usize)
            .collect())
    }

    async fn update(&self, request: &RepairRequest) -> Result<(), ApiServiceError> {
        let mut requests = self.requests.lock().unwrap();
        if let Some(existing) = requests.iter_mut().find(|r| r.id == request.id) {
            *existing = request.clone();
        }
        Ok(())
    }
}

// ── MockFeedbackRepo ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockFeedbackRepo {
    items: Arc<Mutex<Vec<Feedback>>>,
}

impl MockFeedbackRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items_handle(&self) -> Arc<Mutex<Vec<Feedback>>> {
        Arc::clone(&self.items)
    }
}

impl FeedbackRepository for MockFeedbackRepo {
    async fn create(&self, feedback: &NewFeedback) -> Result<Feedback, ApiServiceError> {
        let mut items = self.items.lock().unwrap();
        let created = Feedback {
            id: items.len() as i64 + 1,
            user_id: feedback.user_id,
            repair_id: feedback.repair_id,
            rating: feedback.rating,
            comments: feedback.comments.clone(),
            created_at: Utc::now(),
        };
        items.push(created.clone());
        Ok(created)
    }

    async fn list_by_repair(&self, repair_id: i64) -> Result<Vec<Feedback>, ApiServiceError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.repair_id == repair_id)
            .cloned()
            .collect())
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

/// Minimum-cost argon2 so tests stay fast.
pub fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::new(Some(1024), Some(1), Some(1)).unwrap()
}

pub fn test_policy() -> VerificationPolicy {
    VerificationPolicy {
        notify_timeout: Duration::from_millis(50),
        ..VerificationPolicy::default()
    }
}

/// Insert a user with a real password digest into `store`.
pub async fn seed_user(
    store: &MockStore,
    username: &str,
    email: &str,
    password: &str,
    verified: bool,
) -> User {
    let now = Utc::now();
    store.insert_user(User {
        id: 0,
        username: username.to_owned(),
        email: email.to_owned(),
        password_hash: cheap_hasher().hash(password).await.unwrap(),
        role: UserRole::User,
        is_verified: verified,
        created_at: now,
        updated_at: now,
    })
}

/// Token for `user_id` whose expiry is `offset_secs` from now (negative = expired).
pub fn seed_token(
    store: &MockStore,
    user_id: i64,
    code: &str,
    offset_secs: i64,
) -> VerificationToken {
    let now = Utc::now();
    store.insert_token(
        user_id,
        &NewToken {
            token: code.to_owned(),
            created_at: now - chrono::Duration::minutes(15),
            expires_at: now + chrono::Duration::seconds(offset_secs),
        },
    )
}
