use repair_api::error::ApiServiceError;
use repair_api::usecase::feedback::{
    ListFeedbackUseCase, SubmitFeedbackInput, SubmitFeedbackUseCase,
};
use repair_api::usecase::repair::{SubmitRepairRequestInput, SubmitRepairRequestUseCase};
use repair_domain::repair::{MAX_RATING, MIN_RATING};

use crate::helpers::{MockFeedbackRepo, MockRepairRepo};

async fn repair_with_id(repairs: &MockRepairRepo) -> i64 {
    SubmitRepairRequestUseCase {
        repairs: repairs.clone(),
    }
    .execute(
        1,
        SubmitRepairRequestInput {
            description: "flickering light".to_owned(),
            location: Some("Room 101".to_owned()),
            image_url: None,
            priority: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn feedback(repair_id: i64, rating: i32, comments: Option<&str>) -> SubmitFeedbackInput {
    SubmitFeedbackInput {
        repair_id,
        rating,
        comments: comments.map(str::to_owned),
    }
}

#[tokio::test]
async fn should_clamp_rating_into_range() {
    let repairs = MockRepairRepo::new();
    let repair_id = repair_with_id(&repairs).await;
    let usecase = SubmitFeedbackUseCase {
        feedback: MockFeedbackRepo::new(),
        repairs,
    };

    let high = usecase.execute(2, feedback(repair_id, 9, None)).await.unwrap();
    let low = usecase.execute(2, feedback(repair_id, -3, None)).await.unwrap();
    let mid = usecase
        .execute(2, feedback(repair_id, 4, Some("quick fix")))
        .await
        .unwrap();

    assert_eq!(high.rating, MAX_RATING);
    assert_eq!(low.rating, MIN_RATING);
    assert_eq!(mid.rating, 4);
    assert_eq!(mid.comments.as_deref(), Some("quick fix"));
}

#[tokio::test]
async fn should_return_not_found_for_missing_repair_request() {
    let feedback_repo = MockFeedbackRepo::new();
    let usecase = SubmitFeedbackUseCase {
        feedback: feedback_repo.clone(),
        repairs: MockRepairRepo::new(),
    };

    let result = usecase.execute(2, feedback(404, 5, None)).await;

    assert!(
        matches!(result, Err(ApiServiceError::RepairRequestNotFound)),
        "expected RepairRequestNotFound, got {result:?}"
    );
    assert!(feedback_repo.items_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_overlong_comments() {
    let repairs = MockRepairRepo::new();
    let repair_id = repair_with_id(&repairs).await;
    let usecase = SubmitFeedbackUseCase {
        feedback: MockFeedbackRepo::new(),
        repairs,
    };

    let long = "x".repeat(256);
    let result = usecase
        .execute(2, feedback(repair_id, 5, Some(&long)))
        .await;

    assert!(
        matches!(result, Err(ApiServiceError::InvalidInput(_))),
        "expected InvalidInput, got {result:?}"
    );
}

#[tokio::test]
async fn should_list_feedback_for_repair_request() {
    let repairs = MockRepairRepo::new();
    let repair_id = repair_with_id(&repairs).await;
    let feedback_repo = MockFeedbackRepo::new();
    let submit = SubmitFeedbackUseCase {
        feedback: feedback_repo.clone(),
        repairs,
    };
    submit.execute(2, feedback(repair_id, 5, None)).await.unwrap();
    submit.execute(3, feedback(repair_id, 3, None)).await.unwrap();

    let items = ListFeedbackUseCase {
        feedback: feedback_repo,
    }
    .execute(repair_id)
    .await
    .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].user_id, 2);
    assert_eq!(items[1].user_id, 3);
}

#[tokio::test]
async fn should_return_feedback_not_found_when_none_recorded() {
    let result = ListFeedbackUseCase {
        feedback: MockFeedbackRepo::new(),
    }
    .execute(1)
    .await;

    assert!(
        matches!(result, Err(ApiServiceError::FeedbackNotFound)),
        "expected FeedbackNotFound, got {result:?}"
    );
}
