use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use repair_auth_types::token::SessionIdentity;
use repair_core::serde::{to_rfc3339_ms, to_rfc3339_ms_opt};
use repair_domain::pagination::{DEFAULT_PER_PAGE, PageRequest};
use repair_domain::repair::{Priority, RepairSortBy, RepairStatus};

use crate::domain::types::{RepairFilter, RepairRequest};
use crate::error::ApiServiceError;
use crate::handlers::{AppJson, AppQuery, Caller};
use crate::state::AppState;
use crate::usecase::repair::{
    ListRepairRequestsUseCase, SubmitRepairRequestInput, SubmitRepairRequestUseCase,
    UpdateRepairRequestInput, UpdateRepairRequestUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RepairRequestResponse {
    pub id: i64,
    pub user_id: i64,
    pub technician_id: Option<i64>,
    pub description: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub status: RepairStatus,
    pub priority: Priority,
    #[serde(serialize_with = "to_rfc3339_ms_opt")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<RepairRequest> for RepairRequestResponse {
    fn from(r: RepairRequest) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            technician_id: r.technician_id,
            description: r.description,
            location: r.location,
            image_url: r.image_url,
            status: r.status,
            priority: r.priority,
            completed_at: r.completed_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

fn require_admin(identity: &SessionIdentity) -> Result<(), ApiServiceError> {
    if identity.role.is_admin() {
        Ok(())
    } else {
        Err(ApiServiceError::Forbidden)
    }
}

// ── POST /repair_requests ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitRepairRequestBody {
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

pub async fn submit_repair_request(
    State(state): State<AppState>,
    Caller(identity): Caller,
    AppJson(body): AppJson<SubmitRepairRequestBody>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let usecase = SubmitRepairRequestUseCase {
        repairs: state.repair_repo(),
    };

    let request = usecase
        .execute(
            identity.user_id,
            SubmitRepairRequestInput {
                description: body.description,
                location: body.location,
                image_url: body.image_url,
                priority: body.priority,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RepairRequestResponse::from(request))))
}

// ── GET /admin/repair_requests ────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ListRepairRequestsQuery {
    pub status: Option<RepairStatus>,
    #[serde(default)]
    pub sort_by: RepairSortBy,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_repair_requests(
    State(state): State<AppState>,
    Caller(identity): Caller,
    AppQuery(query): AppQuery<ListRepairRequestsQuery>,
) -> Result<impl IntoResponse, ApiServiceError> {
    require_admin(&identity)?;

    let usecase = ListRepairRequestsUseCase {
        repairs: state.repair_repo(),
    };

    let requests = usecase
        .execute(RepairFilter {
            status: query.status,
            sort_by: query.sort_by,
            page: PageRequest {
                per_page: query.per_page.unwrap_or(DEFAULT_PER_PAGE),
                page: query.page.unwrap_or(1),
            },
        })
        .await?;

    let body: Vec<RepairRequestResponse> = requests.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

// ── PUT /admin/repair_requests/{id} ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateRepairRequestBody {
    #[serde(default)]
    pub status: Option<RepairStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub technician_id: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn update_repair_request(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(id): Path<i64>,
    AppJson(body): AppJson<UpdateRepairRequestBody>,
) -> Result<impl IntoResponse, ApiServiceError> {
    require_admin(&identity)?;

    let usecase = UpdateRepairRequestUseCase {
        repairs: state.repair_repo(),
        users: state.user_repo(),
    };

    let request = usecase
        .execute(
            id,
            UpdateRepairRequestInput {
                status: body.status,
                priority: body.priority,
                technician_id: body.technician_id,
                location: body.location,
                image_url: body.image_url,
                description: body.description,
            },
        )
        .await?;

    Ok(Json(RepairRequestResponse::from(request)))
}
