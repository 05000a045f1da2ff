use chrono::{DateTime, Duration, Utc};

use repair_domain::pagination::PageRequest;
use repair_domain::repair::{Priority, RepairSortBy, RepairStatus};
use repair_domain::user::UserRole;

/// Stored account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account to be inserted at registration; always starts unverified.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Single-use code proving control of an email address (verification and
/// password reset share this record).
#[derive(Debug, Clone)]
pub struct VerificationToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VerificationToken {
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    pub fn is_live(&self) -> bool {
        self.is_live_at(Utc::now())
    }
}

/// Token to be inserted; the owning user is supplied by the repository call.
#[derive(Debug, Clone)]
pub struct NewToken {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewToken {
    pub fn issued_now(token: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token,
            created_at: now,
            expires_at: now + ttl,
        }
    }
}

/// Timing knobs for code issuance, fixed at startup.
#[derive(Debug, Clone)]
pub struct VerificationPolicy {
    pub token_ttl: Duration,
    pub notify_timeout: std::time::Duration,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            token_ttl: Duration::seconds(DEFAULT_VERIFICATION_TTL_SECS),
            notify_timeout: std::time::Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepairRequest {
    pub id: i64,
    pub user_id: i64,
    pub technician_id: Option<i64>,
    pub description: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub status: RepairStatus,
    pub priority: Priority,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RepairRequest {
    /// Move to `status`, stamping `completed_at` on entering `Completed` and
    /// clearing it on leaving.
    pub fn set_status(&mut self, status: RepairStatus, now: DateTime<Utc>) {
        if status == RepairStatus::Completed {
            if self.status != RepairStatus::Completed {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }
        self.status = status;
    }
}

#[derive(Debug, Clone)]
pub struct NewRepairRequest {
    pub user_id: i64,
    pub description: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub priority: Priority,
}

/// Admin listing filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepairFilter {
    pub status: Option<RepairStatus>,
    pub sort_by: RepairSortBy,
    pub page: PageRequest,
}

#[derive(Debug, Clone)]
pub struct Feedback {
    pub id: i64,
    pub user_id: i64,
    pub repair_id: i64,
    pub rating: i16,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub user_id: i64,
    pub repair_id: i64,
    pub rating: i16,
    pub comments: Option<String>,
}

/// Random bytes per verification code (hex-encoded to twice as many chars).
pub const VERIFICATION_CODE_BYTES: usize = 6;

/// Verification code lifetime in seconds (15 minutes).
pub const DEFAULT_VERIFICATION_TTL_SECS: i64 = 900;

/// Upper bound on a single notifier call, in seconds.
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_USERNAME_LEN: usize = 64;
pub const MAX_COMMENTS_LEN: usize = 255;

/// Non-empty, at most `MAX_USERNAME_LEN` chars, no `@` (which marks an email at login)
/// and no whitespace.
pub fn validate_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LEN
        && !username.contains('@')
        && !username.chars().any(char::is_whitespace)
}

/// Exactly one `@` with non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Canonical form of an address: trimmed and ASCII-lowercased. Stored emails
/// and every lookup go through this, so one mailbox maps to one account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Absolute `http`/`https` reference without whitespace.
pub fn validate_image_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    rest.is_some_and(|r| !r.is_empty()) && !url.chars().any(char::is_whitespace)
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}
