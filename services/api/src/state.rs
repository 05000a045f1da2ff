use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use repair_auth_types::token::SessionIssuer;

use crate::domain::types::VerificationPolicy;
use crate::infra::db::{
    DbFeedbackRepository, DbRepairRequestRepository, DbUserRepository,
    DbVerificationTokenRepository,
};
use crate::infra::mailer::SmtpNotifier;
use crate::usecase::password::PasswordHasher;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub sessions: SessionIssuer,
    pub hasher: PasswordHasher,
    pub notifier: SmtpNotifier,
    pub policy: VerificationPolicy,
    pub admin_invite_code: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_repo(&self) -> DbVerificationTokenRepository {
        DbVerificationTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn repair_repo(&self) -> DbRepairRequestRepository {
        DbRepairRequestRepository {
            db: self.db.clone(),
        }
    }

    pub fn feedback_repo(&self) -> DbFeedbackRepository {
        DbFeedbackRepository {
            db: self.db.clone(),
        }
    }
}

impl FromRef<AppState> for SessionIssuer {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
