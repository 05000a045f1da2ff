use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, Condition,
    DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, SqlErr, TransactionError, TransactionTrait,
};

use repair_api_schema::{feedback, password_reset_tokens, repair_requests, users};
use repair_domain::pagination::Sort;
use repair_domain::repair::{Priority, RepairSortBy, RepairStatus};
use repair_domain::user::UserRole;

use crate::domain::repository::{
    FeedbackRepository, RepairRequestRepository, UserRepository, VerificationTokenRepository,
};
use crate::domain::types::{
    Feedback, NewFeedback, NewRepairRequest, NewToken, NewUser, RepairFilter, RepairRequest, User,
    VerificationToken,
};
use crate::error::ApiServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

/// Users that have not been soft-deleted.
fn live_users() -> Select<users::Entity> {
    users::Entity::find().filter(users::Column::DeletedAt.is_null())
}

/// Unique violation on one of the partial indexes over `users` (username / email).
fn is_user_uniqueness_violation(err: &DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("uq_users_")
    )
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiServiceError> {
        let model = live_users()
            .filter(users::Column::Id.eq(id))
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiServiceError> {
        let model = live_users()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiServiceError> {
        let model = live_users()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        model.map(user_from_model).transpose()
    }

    async fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, ApiServiceError> {
        let count = live_users()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(username))
                    .add(users::Column::Email.eq(email)),
            )
            .count(&self.db)
            .await
            .context("check user uniqueness")?;
        Ok(count > 0)
    }

    async fn create_with_token(
        &self,
        user: &NewUser,
        token: &NewToken,
    ) -> Result<(User, VerificationToken), ApiServiceError> {
        let result = self
            .db
            .transaction::<_, (users::Model, password_reset_tokens::Model), DbErr>(|txn| {
                let user = user.clone();
                let token = token.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let user_model = users::ActiveModel {
                        id: NotSet,
                        username: Set(user.username),
                        email: Set(user.email),
                        password_hash: Set(user.password_hash),
                        role: Set(user.role.as_str().to_owned()),
                        is_verified: Set(false),
                        created_at: Set(now),
                        updated_at: Set(now),
                        deleted_at: Set(None),
                    }
                    .insert(txn)
                    .await?;
                    let token_model = insert_token(txn, user_model.id, &token).await?;
                    Ok((user_model, token_model))
                })
            })
            .await;

        match result {
            Ok((user_model, token_model)) => {
                Ok((user_from_model(user_model)?, token_from_model(token_model)))
            }
            Err(TransactionError::Transaction(ref e)) if is_user_uniqueness_violation(e) => {
                Err(ApiServiceError::UserAlreadyExists)
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context("create user with token")
                .into()),
        }
    }

    async fn mark_verified(&self, id: i64) -> Result<(), ApiServiceError> {
        users::ActiveModel {
            id: Set(id),
            is_verified: Set(true),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark user verified")?;
        Ok(())
    }

    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<(), ApiServiceError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update password hash")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> Result<User, ApiServiceError> {
    let role = model
        .role
        .parse::<UserRole>()
        .with_context(|| format!("user {} has invalid stored role", model.id))?;
    Ok(User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        role,
        is_verified: model.is_verified,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Verification token repository ────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationTokenRepository {
    pub db: DatabaseConnection,
}

impl VerificationTokenRepository for DbVerificationTokenRepository {
    async fn find_live(&self, code: &str) -> Result<Option<VerificationToken>, ApiServiceError> {
        let model = password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::Token.eq(code))
            .filter(password_reset_tokens::Column::ExpiresAt.gt(Utc::now()))
            .one(&self.db)
            .await
            .context("find live verification token")?;
        Ok(model.map(token_from_model))
    }

    async fn replace_for_user(
        &self,
        user_id: i64,
        token: &NewToken,
    ) -> Result<VerificationToken, ApiServiceError> {
        let model = self
            .db
            .transaction::<_, password_reset_tokens::Model, DbErr>(|txn| {
                let token = token.clone();
                Box::pin(async move {
                    // Owner row lock: concurrent replaces for one user run one at a time.
                    users::Entity::find_by_id(user_id)
                        .lock_exclusive()
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            DbErr::RecordNotFound(format!("user {user_id} for token replace"))
                        })?;
                    password_reset_tokens::Entity::delete_many()
                        .filter(password_reset_tokens::Column::UserId.eq(user_id))
                        .exec(txn)
                        .await?;
                    insert_token(txn, user_id, &token).await
                })
            })
            .await
            .context("replace verification tokens")?;
        Ok(token_from_model(model))
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiServiceError> {
        let result = password_reset_tokens::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete verification token")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_expired(&self) -> Result<u64, ApiServiceError> {
        let result = password_reset_tokens::Entity::delete_many()
            .filter(password_reset_tokens::Column::ExpiresAt.lte(Utc::now()))
            .exec(&self.db)
            .await
            .context("delete expired verification tokens")?;
        Ok(result.rows_affected)
    }
}

async fn insert_token(
    txn: &DatabaseTransaction,
    user_id: i64,
    token: &NewToken,
) -> Result<password_reset_tokens::Model, DbErr> {
    password_reset_tokens::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        token: Set(token.token.clone()),
        created_at: Set(token.created_at),
        expires_at: Set(token.expires_at),
    }
    .insert(txn)
    .await
}

fn token_from_model(model: password_reset_tokens::Model) -> VerificationToken {
    VerificationToken {
        id: model.id,
        user_id: model.user_id,
        token: model.token,
        created_at: model.created_at,
        expires_at: model.expires_at,
    }
}

// ── Repair request repository ────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRepairRequestRepository {
    pub db: DatabaseConnection,
}

impl RepairRequestRepository for DbRepairRequestRepository {
    async fn create(&self, request: &NewRepairRequest) -> Result<RepairRequest, ApiServiceError> {
        let now = Utc::now();
        let model = repair_requests::ActiveModel {
            id: NotSet,
            user_id: Set(request.user_id),
            technician_id: Set(None),
            description: Set(request.description.clone()),
            location: Set(request.location.clone()),
            image_url: Set(request.image_url.clone()),
            status: Set(RepairStatus::Pending.as_str().to_owned()),
            priority: Set(request.priority.as_str().to_owned()),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .context("create repair request")?;
        repair_from_model(model)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RepairRequest>, ApiServiceError> {
        let model = repair_requests::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find repair request by id")?;
        model.map(repair_from_model).transpose()
    }

    async fn list(&self, filter: RepairFilter) -> Result<Vec<RepairRequest>, ApiServiceError> {
        let mut query = repair_requests::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(repair_requests::Column::Status.eq(status.as_str()));
        }
        query = match filter.sort_by {
            RepairSortBy::CreatedAt(Sort::Desc) => {
                query.order_by_desc(repair_requests::Column::CreatedAt)
            }
            RepairSortBy::CreatedAt(Sort::Asc) => {
                query.order_by_asc(repair_requests::Column::CreatedAt)
            }
            RepairSortBy::UpdatedAt(Sort::Desc) => {
                query.order_by_desc(repair_requests::Column::UpdatedAt)
            }
            RepairSortBy::UpdatedAt(Sort::Asc) => {
                query.order_by_asc(repair_requests::Column::UpdatedAt)
            }
        };
        let models = query
            .order_by_asc(repair_requests::Column::Id)
            .offset(filter.page.offset())
            .limit(filter.page.limit())
            .all(&self.db)
            .await
            .context("list repair requests")?;
        models.into_iter().map(repair_from_model).collect()
    }

    async fn update(&self, request: &RepairRequest) -> Result<(), ApiServiceError> {
        repair_requests::ActiveModel {
            id: Set(request.id),
            user_id: NotSet,
            technician_id: Set(request.technician_id),
            description: Set(request.description.clone()),
            location: Set(request.location.clone()),
            image_url: Set(request.image_url.clone()),
            status: Set(request.status.as_str().to_owned()),
            priority: Set(request.priority.as_str().to_owned()),
            completed_at: Set(request.completed_at),
            created_at: NotSet,
            updated_at: Set(request.updated_at),
        }
        .update(&self.db)
        .await
        .context("update repair request")?;
        Ok(())
    }
}

fn repair_from_model(model: repair_requests::Model) -> Result<RepairRequest, ApiServiceError> {
    let status = model
        .status
        .parse::<RepairStatus>()
        .with_context(|| format!("repair request {} has invalid status", model.id))?;
    let priority = model
        .priority
        .parse::<Priority>()
        .with_context(|| format!("repair request {} has invalid priority", model.id))?;
    Ok(RepairRequest {
        id: model.id,
        user_id: model.user_id,
        technician_id: model.technician_id,
        description: model.description,
        location: model.location,
        image_url: model.image_url,
        status,
        priority,
        completed_at: model.completed_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Feedback repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFeedbackRepository {
    pub db: DatabaseConnection,
}

impl FeedbackRepository for DbFeedbackRepository {
    async fn create(&self, feedback: &NewFeedback) -> Result<Feedback, ApiServiceError> {
        let model = feedback::ActiveModel {
            id: NotSet,
            user_id: Set(feedback.user_id),
            repair_id: Set(feedback.repair_id),
            rating: Set(feedback.rating),
            comments: Set(feedback.comments.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("create feedback")?;
        Ok(feedback_from_model(model))
    }

    async fn list_by_repair(&self, repair_id: i64) -> Result<Vec<Feedback>, ApiServiceError> {
        let models = feedback::Entity::find()
            .filter(feedback::Column::RepairId.eq(repair_id))
            .order_by_asc(feedback::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list feedback by repair")?;
        Ok(models.into_iter().map(feedback_from_model).collect())
    }
}

fn feedback_from_model(model: feedback::Model) -> Feedback {
    Feedback {
        id: model.id,
        user_id: model.user_id,
        repair_id: model.repair_id,
        rating: model.rating,
        comments: model.comments,
        created_at: model.created_at,
    }
}
