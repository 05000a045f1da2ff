use chrono::Utc;
use tracing::info;

use repair_domain::repair::{Priority, RepairStatus};

use crate::domain::repository::{RepairRequestRepository, UserRepository};
use crate::domain::types::{NewRepairRequest, RepairFilter, RepairRequest, validate_image_url};
use crate::error::ApiServiceError;

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn checked_image_url(value: Option<String>) -> Result<Option<String>, ApiServiceError> {
    match normalize_optional(value) {
        Some(url) if !validate_image_url(&url) => {
            Err(ApiServiceError::invalid_input("image_url must be an http(s) URL"))
        }
        url => Ok(url),
    }
}

// ── SubmitRepairRequest ──────────────────────────────────────────────────────

pub struct SubmitRepairRequestInput {
    pub description: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub priority: Option<Priority>,
}

pub struct SubmitRepairRequestUseCase<R: RepairRequestRepository> {
    pub repairs: R,
}

impl<R: RepairRequestRepository> SubmitRepairRequestUseCase<R> {
    pub async fn execute(
        &self,
        user_id: i64,
        input: SubmitRepairRequestInput,
    ) -> Result<RepairRequest, ApiServiceError> {
        let description = input.description.trim();
        if description.is_empty() {
            return Err(ApiServiceError::invalid_input("description is required"));
        }
        let image_url = checked_image_url(input.image_url)?;
        let request = self
            .repairs
            .create(&NewRepairRequest {
                user_id,
                description: description.to_owned(),
                location: normalize_optional(input.location),
                image_url,
                priority: input.priority.unwrap_or_default(),
            })
            .await?;
        info!(repair_id = request.id, user_id, "repair request submitted");
        Ok(request)
    }
}

// ── ListRepairRequests (admin) ───────────────────────────────────────────────

pub struct ListRepairRequestsUseCase<R: RepairRequestRepository> {
    pub repairs: R,
}

impl<R: RepairRequestRepository> ListRepairRequestsUseCase<R> {
    pub async fn execute(&self, filter: RepairFilter) -> Result<Vec<RepairRequest>, ApiServiceError> {
        self.repairs
            .list(RepairFilter {
                page: filter.page.clamped(),
                ..filter
            })
            .await
    }
}

// ── UpdateRepairRequest (admin) ──────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateRepairRequestInput {
    pub status: Option<RepairStatus>,
    pub priority: Option<Priority>,
    pub technician_id: Option<i64>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

impl UpdateRepairRequestInput {
    fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.technician_id.is_none()
            && self.location.is_none()
            && self.image_url.is_none()
            && self.description.is_none()
    }
}

pub struct UpdateRepairRequestUseCase<R: RepairRequestRepository, U: UserRepository> {
    pub repairs: R,
    pub users: U,
}

impl<R: RepairRequestRepository, U: UserRepository> UpdateRepairRequestUseCase<R, U> {
    pub async fn execute(
        &self,
        id: i64,
        input: UpdateRepairRequestInput,
    ) -> Result<RepairRequest, ApiServiceError> {
        if input.is_empty() {
            return Err(ApiServiceError::invalid_input("no fields to update"));
        }

        let mut request = self
            .repairs
            .find_by_id(id)
            .await?
            .ok_or(ApiServiceError::RepairRequestNotFound)?;

        if let Some(technician_id) = input.technician_id {
            if self.users.find_by_id(technician_id).await?.is_none() {
                return Err(ApiServiceError::invalid_input("unknown technician"));
            }
            request.technician_id = Some(technician_id);
        }
        if let Some(description) = input.description {
            let description = description.trim();
            if description.is_empty() {
                return Err(ApiServiceError::invalid_input("description must not be empty"));
            }
            request.description = description.to_owned();
        }
        if input.location.is_some() {
            request.location = normalize_optional(input.location);
        }
        if input.image_url.is_some() {
            request.image_url = checked_image_url(input.image_url)?;
        }
        if let Some(priority) = input.priority {
            request.priority = priority;
        }

        let now = Utc::now();
        if let Some(status) = input.status {
            request.set_status(status, now);
        }
        request.updated_at = now;

        self.repairs.update(&request).await?;
        info!(repair_id = request.id, status = %request.status, "repair request updated");
        Ok(request)
    }
}
