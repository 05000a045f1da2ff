use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// API service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing session tokens. Must be non-empty.
    pub jwt_secret: String,
    /// Outgoing mail relay.
    pub smtp: SmtpConfig,
    /// TCP port to listen on (default 8080). Env var: `API_PORT`.
    pub api_port: u16,
    /// Invite code that grants `admin` at registration. Empty disables it.
    pub admin_invite_code: String,
    /// Verification code lifetime in seconds (default 900).
    pub verification_token_ttl_secs: i64,
    /// Session lifetime in seconds (default 72 h).
    pub session_ttl_secs: u64,
    /// Argon2 memory cost in KiB. Unset keeps the library default.
    pub password_hash_memory_kib: Option<u32>,
    pub password_hash_iterations: Option<u32>,
    pub password_hash_parallelism: Option<u32>,
    /// Period of the expired-token sweep (default 600).
    pub token_sweep_interval_secs: u64,
    /// Upper bound on one notifier call (default 10).
    pub notify_timeout_secs: u64,
}

#[derive(Debug)]
pub struct SmtpConfig {
    pub host: String,
    /// Default 465 (implicit TLS).
    pub port: u16,
    pub username: String,
    pub password: String,
    /// `From` mailbox, e.g. `Repair Desk <noreply@example.com>`.
    pub from: String,
    /// Use STARTTLS instead of implicit TLS. Env var: `SMTP_STARTTLS`.
    pub starttls: bool,
}

const DEFAULT_API_PORT: u16 = 8080;
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_ADMIN_INVITE_CODE: &str = "JNUTechnicians";
const DEFAULT_TOKEN_SWEEP_INTERVAL_SECS: u64 = 600;

const VERIFICATION_TTL_RANGE: RangeInclusive<i64> = 1..=7 * 24 * 60 * 60;
const SESSION_TTL_RANGE: RangeInclusive<u64> = 1..=365 * 24 * 60 * 60;

/// Unset or empty falls back to the caller's default; a value that does not
/// parse aborts startup.
fn optional<T>(name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    parse_optional(name, std::env::var(name).ok())
}

fn parse_optional<T>(name: &str, raw: Option<String>) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.filter(|v| !v.trim().is_empty()).map(|v| {
        v.trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name}: invalid value {v:?}: {e}"))
    })
}

fn bounded<T: PartialOrd + Display>(name: &str, value: T, range: RangeInclusive<T>) -> T {
    assert!(
        range.contains(&value),
        "{name} must be within {}..={}, got {value}",
        range.start(),
        range.end()
    );
    value
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET");
        assert!(!jwt_secret.is_empty(), "JWT_SECRET must not be empty");

        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret,
            smtp: SmtpConfig {
                host: std::env::var("SMTP_HOST").expect("SMTP_HOST"),
                port: optional("SMTP_PORT").unwrap_or(DEFAULT_SMTP_PORT),
                username: std::env::var("SMTP_USERNAME").expect("SMTP_USERNAME"),
                password: std::env::var("SMTP_PASSWORD").expect("SMTP_PASSWORD"),
                from: std::env::var("MAIL_FROM").expect("MAIL_FROM"),
                starttls: optional("SMTP_STARTTLS").unwrap_or(false),
            },
            api_port: optional("API_PORT").unwrap_or(DEFAULT_API_PORT),
            admin_invite_code: std::env::var("ADMIN_INVITE_CODE")
                .unwrap_or_else(|_| DEFAULT_ADMIN_INVITE_CODE.to_owned()),
            verification_token_ttl_secs: bounded(
                "VERIFICATION_TOKEN_TTL_SECS",
                optional("VERIFICATION_TOKEN_TTL_SECS")
                    .unwrap_or(crate::domain::types::DEFAULT_VERIFICATION_TTL_SECS),
                VERIFICATION_TTL_RANGE,
            ),
            session_ttl_secs: bounded(
                "SESSION_TTL_SECS",
                optional("SESSION_TTL_SECS")
                    .unwrap_or(repair_auth_types::token::DEFAULT_SESSION_TTL_SECS),
                SESSION_TTL_RANGE,
            ),
            password_hash_memory_kib: optional("PASSWORD_HASH_MEMORY_KIB"),
            password_hash_iterations: optional("PASSWORD_HASH_ITERATIONS"),
            password_hash_parallelism: optional("PASSWORD_HASH_PARALLELISM"),
            token_sweep_interval_secs: optional("TOKEN_SWEEP_INTERVAL_SECS")
                .unwrap_or(DEFAULT_TOKEN_SWEEP_INTERVAL_SECS),
            notify_timeout_secs: optional("NOTIFY_TIMEOUT_SECS")
                .unwrap_or(crate::domain::types::DEFAULT_NOTIFY_TIMEOUT_SECS),
        }
    }
}
