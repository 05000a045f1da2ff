use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use repair_domain::user::UserRole;

use crate::error::ApiServiceError;
use crate::handlers::AppJson;
use crate::state::AppState;
use crate::usecase::login::{LoginInput, LoginUseCase};
use crate::usecase::register::{RegisterInput, RegisterUseCase};
use crate::usecase::reset::{ResetPasswordInput, ResetPasswordUseCase};
use crate::usecase::verification::{
    RedeemCodeInput, RedeemCodeUseCase, RequestCodeInput, RequestCodeUseCase,
};

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ── POST /register ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub invite_code: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user_id: i64,
    pub role: UserRole,
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        notifier: state.notifier.clone(),
        hasher: state.hasher.clone(),
        policy: state.policy.clone(),
        admin_invite_code: state.admin_invite_code.clone(),
    };

    let out = usecase
        .execute(RegisterInput {
            username: body.username,
            email: body.email,
            password: body.password,
            invite_code: body.invite_code,
        })
        .await?;

    Ok(Json(RegisterResponse {
        message: "registered, verification code sent",
        user_id: out.user_id,
        role: out.role,
    }))
}

// ── POST /verify_email ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

pub async fn verify_email(
    State(state): State<AppState>,
    AppJson(body): AppJson<VerifyEmailRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let usecase = RedeemCodeUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
    };

    usecase
        .execute(RedeemCodeInput {
            email: body.email,
            code: body.code,
        })
        .await?;

    Ok(Json(MessageResponse {
        message: "email verified",
    }))
}

// ── POST /login ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    pub identifier: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: u64,
    pub user_id: i64,
    pub role: UserRole,
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        hasher: state.hasher.clone(),
        sessions: state.sessions.clone(),
    };

    let out = usecase
        .execute(LoginInput {
            identifier: body.identifier,
            password: body.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        token: out.token,
        expires_at: out.expires_at,
        user_id: out.user_id,
        role: out.role,
    }))
}

// ── POST /send_verification_code ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendCodeRequest {
    pub email: String,
}

pub async fn send_verification_code(
    State(state): State<AppState>,
    AppJson(body): AppJson<SendCodeRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let usecase = RequestCodeUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
        notifier: state.notifier.clone(),
        policy: state.policy.clone(),
    };

    usecase
        .execute(RequestCodeInput { email: body.email })
        .await?;

    Ok(Json(MessageResponse {
        message: "verification code sent",
    }))
}

// ── POST /reset_password ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(body): AppJson<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let usecase = ResetPasswordUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
        hasher: state.hasher.clone(),
    };

    usecase
        .execute(ResetPasswordInput {
            email: body.email,
            token: body.token,
            new_password: body.new_password,
        })
        .await?;

    Ok(Json(MessageResponse {
        message: "password updated",
    }))
}
