use repair_domain::repair::clamp_rating;

use crate::domain::repository::{FeedbackRepository, RepairRequestRepository};
use crate::domain::types::{Feedback, MAX_COMMENTS_LEN, NewFeedback};
use crate::error::ApiServiceError;

// ── SubmitFeedback ───────────────────────────────────────────────────────────

pub struct SubmitFeedbackInput {
    pub repair_id: i64,
    pub rating: i32,
    pub comments: Option<String>,
}

pub struct SubmitFeedbackUseCase<F: FeedbackRepository, R: RepairRequestRepository> {
    pub feedback: F,
    pub repairs: R,
}

impl<F: FeedbackRepository, R: RepairRequestRepository> SubmitFeedbackUseCase<F, R> {
    pub async fn execute(
        &self,
        user_id: i64,
        input: SubmitFeedbackInput,
    ) -> Result<Feedback, ApiServiceError> {
        let comments = input
            .comments
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());
        if comments
            .as_deref()
            .is_some_and(|c| c.chars().count() > MAX_COMMENTS_LEN)
        {
            return Err(ApiServiceError::invalid_input(format!(
                "comments must be at most {MAX_COMMENTS_LEN} characters"
            )));
        }

        if self.repairs.find_by_id(input.repair_id).await?.is_none() {
            return Err(ApiServiceError::RepairRequestNotFound);
        }

        self.feedback
            .create(&NewFeedback {
                user_id,
                repair_id: input.repair_id,
                rating: clamp_rating(input.rating),
                comments,
            })
            .await
    }
}

// ── ListFeedback ─────────────────────────────────────────────────────────────

pub struct ListFeedbackUseCase<F: FeedbackRepository> {
    pub feedback: F,
}

impl<F: FeedbackRepository> ListFeedbackUseCase<F> {
    /// Feedback for one repair request, oldest first. Empty is `FeedbackNotFound`.
    pub async fn execute(&self, repair_id: i64) -> Result<Vec<Feedback>, ApiServiceError> {
        let items = self.feedback.list_by_repair(repair_id).await?;
        if items.is_empty() {
            return Err(ApiServiceError::FeedbackNotFound);
        }
        Ok(items)
    }
}
