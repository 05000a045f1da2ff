use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use repair_core::serde::to_rfc3339_ms;

use crate::domain::types::Feedback;
use crate::error::ApiServiceError;
use crate::handlers::{AppJson, Caller};
use crate::state::AppState;
use crate::usecase::feedback::{ListFeedbackUseCase, SubmitFeedbackInput, SubmitFeedbackUseCase};

#[derive(Serialize)]
pub struct FeedbackResponse {
    pub id: i64,
    pub user_id: i64,
    pub repair_id: i64,
    pub rating: i16,
    pub comments: Option<String>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<Feedback> for FeedbackResponse {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            user_id: f.user_id,
            repair_id: f.repair_id,
            rating: f.rating,
            comments: f.comments,
            created_at: f.created_at,
        }
    }
}

// ── POST /feedback ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitFeedbackBody {
    pub repair_id: i64,
    pub rating: i32,
    #[serde(default)]
    pub comments: Option<String>,
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Caller(identity): Caller,
    AppJson(body): AppJson<SubmitFeedbackBody>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let usecase = SubmitFeedbackUseCase {
        feedback: state.feedback_repo(),
        repairs: state.repair_repo(),
    };

    let feedback = usecase
        .execute(
            identity.user_id,
            SubmitFeedbackInput {
                repair_id: body.repair_id,
                rating: body.rating,
                comments: body.comments,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(FeedbackResponse::from(feedback))))
}

// ── GET /feedback/{repair_id} ─────────────────────────────────────────────────

pub async fn list_feedback(
    State(state): State<AppState>,
    Caller(_identity): Caller,
    Path(repair_id): Path<i64>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let usecase = ListFeedbackUseCase {
        feedback: state.feedback_repo(),
    };

    let feedback = usecase.execute(repair_id).await?;
    let body: Vec<FeedbackResponse> = feedback.into_iter().map(Into::into).collect();
    Ok(Json(body))
}
