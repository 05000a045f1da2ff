use std::time::Duration;

use sea_orm::Database;
use tracing::{error, info};

use repair_api::config::ApiConfig;
use repair_api::domain::types::VerificationPolicy;
use repair_api::infra::db::DbVerificationTokenRepository;
use repair_api::infra::mailer::SmtpNotifier;
use repair_api::router::build_router;
use repair_api::state::AppState;
use repair_api::usecase::password::PasswordHasher;
use repair_api::usecase::sweep::DeleteExpiredTokensUseCase;
use repair_auth_types::token::SessionIssuer;

/// Periodically delete expired verification tokens until the process exits.
fn spawn_token_sweeper(tokens: DbVerificationTokenRepository, period: Duration) {
    tokio::spawn(async move {
        let usecase = DeleteExpiredTokensUseCase { tokens };
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = usecase.execute().await {
                error!(error = %e, "expired token sweep failed");
            }
        }
    });
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    repair_core::tracing::init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let notifier = SmtpNotifier::new(&config.smtp).expect("invalid SMTP configuration");

    let hasher = PasswordHasher::new(
        config.password_hash_memory_kib,
        config.password_hash_iterations,
        config.password_hash_parallelism,
    )
    .expect("invalid password hash parameters");

    let state = AppState {
        db: db.clone(),
        sessions: SessionIssuer::new(&config.jwt_secret, config.session_ttl_secs),
        hasher,
        notifier,
        policy: VerificationPolicy {
            token_ttl: chrono::Duration::seconds(config.verification_token_ttl_secs),
            notify_timeout: Duration::from_secs(config.notify_timeout_secs),
        },
        admin_invite_code: config.admin_invite_code,
    };

    spawn_token_sweeper(
        DbVerificationTokenRepository { db },
        Duration::from_secs(config.token_sweep_interval_secs.max(1)),
    );

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
