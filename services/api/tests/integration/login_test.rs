use repair_api::error::ApiServiceError;
use repair_api::usecase::login::{LoginInput, LoginUseCase};
use repair_api::usecase::register::{RegisterInput, RegisterUseCase};
use repair_api::usecase::verification::{RedeemCodeInput, RedeemCodeUseCase};
use repair_domain::user::UserRole;
use repair_testing::auth::MockSession;

use crate::helpers::{
    ADMIN_INVITE_CODE, MockNotifier, MockStore, MockUserRepo, cheap_hasher, seed_user,
    test_policy,
};

fn login_usecase(store: &MockStore) -> LoginUseCase<MockUserRepo> {
    LoginUseCase {
        users: store.user_repo(),
        hasher: cheap_hasher(),
        sessions: MockSession::issuer(),
    }
}

fn login(identifier: &str, password: &str) -> LoginInput {
    LoginInput {
        identifier: identifier.to_owned(),
        password: password.to_owned(),
    }
}

#[tokio::test]
async fn should_register_verify_and_log_in() {
    let store = MockStore::new();
    let notifier = MockNotifier::new();
    let sent = notifier.sent_handle();

    let registered = RegisterUseCase {
        users: store.user_repo(),
        notifier,
        hasher: cheap_hasher(),
        policy: test_policy(),
        admin_invite_code: ADMIN_INVITE_CODE.to_owned(),
    }
    .execute(RegisterInput {
        username: "alice".to_owned(),
        email: "a@x.com".to_owned(),
        password: "secret1".to_owned(),
        invite_code: None,
    })
    .await
    .unwrap();

    let before = login_usecase(&store)
        .execute(login("alice", "secret1"))
        .await;
    assert!(
        matches!(before, Err(ApiServiceError::EmailNotVerified)),
        "expected EmailNotVerified, got {before:?}"
    );

    let code = sent.lock().unwrap()[0].1.clone();
    RedeemCodeUseCase {
        users: store.user_repo(),
        tokens: store.token_repo(),
    }
    .execute(RedeemCodeInput {
        email: "a@x.com".to_owned(),
        code,
    })
    .await
    .unwrap();

    let output = login_usecase(&store)
        .execute(login("alice", "secret1"))
        .await
        .unwrap();
    assert_eq!(output.user_id, registered.user_id);
    assert_eq!(output.role, UserRole::User);

    let identity = MockSession::issuer().validate(&output.token).unwrap();
    assert_eq!(identity.user_id, registered.user_id);
    assert_eq!(identity.username, "alice");
    assert_eq!(identity.expires_at, output.expires_at);

    let wrong = login_usecase(&store)
        .execute(login("alice", "wrong-password"))
        .await;
    assert!(
        matches!(wrong, Err(ApiServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {wrong:?}"
    );
}

#[tokio::test]
async fn should_log_in_by_email() {
    let store = MockStore::new();
    let user = seed_user(&store, "alice", "a@x.com", "secret1", true).await;

    let output = login_usecase(&store)
        .execute(login("a@x.com", "secret1"))
        .await
        .unwrap();

    assert_eq!(output.user_id, user.id);
}

#[tokio::test]
async fn should_log_in_by_email_in_any_case() {
    let store = MockStore::new();
    let user = seed_user(&store, "alice", "a@x.com", "secret1", true).await;

    let output = login_usecase(&store)
        .execute(login(" A@X.COM", "secret1"))
        .await
        .unwrap();

    assert_eq!(output.user_id, user.id);
}

#[tokio::test]
async fn should_reject_unverified_user_regardless_of_password() {
    let store = MockStore::new();
    seed_user(&store, "alice", "a@x.com", "secret1", false).await;

    for password in ["secret1", "wrong-password"] {
        let result = login_usecase(&store).execute(login("alice", password)).await;
        assert!(
            matches!(result, Err(ApiServiceError::EmailNotVerified)),
            "expected EmailNotVerified, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_reject_unknown_user_as_invalid_credentials() {
    let store = MockStore::new();

    let result = login_usecase(&store)
        .execute(login("ghost", "secret1"))
        .await;

    assert!(
        matches!(result, Err(ApiServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_require_identifier_and_password() {
    let store = MockStore::new();

    let result = login_usecase(&store).execute(login("alice", "")).await;

    assert!(
        matches!(result, Err(ApiServiceError::InvalidInput(_))),
        "expected InvalidInput, got {result:?}"
    );
}
