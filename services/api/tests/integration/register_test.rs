use repair_api::domain::repository::Notifier;
use repair_api::error::ApiServiceError;
use repair_api::usecase::register::{RegisterInput, RegisterUseCase};
use repair_domain::user::UserRole;

use crate::helpers::{
    ADMIN_INVITE_CODE, FailingNotifier, MockNotifier, MockStore, MockUserRepo, cheap_hasher,
    seed_user, test_policy,
};

fn register_usecase<N: Notifier>(store: &MockStore, notifier: N) -> RegisterUseCase<MockUserRepo, N> {
    RegisterUseCase {
        users: store.user_repo(),
        notifier,
        hasher: cheap_hasher(),
        policy: test_policy(),
        admin_invite_code: ADMIN_INVITE_CODE.to_owned(),
    }
}

fn alice(invite_code: Option<&str>) -> RegisterInput {
    RegisterInput {
        username: "alice".to_owned(),
        email: "a@x.com".to_owned(),
        password: "secret1".to_owned(),
        invite_code: invite_code.map(str::to_owned),
    }
}

#[tokio::test]
async fn should_create_one_unverified_user_and_one_live_token() {
    let store = MockStore::new();
    let notifier = MockNotifier::new();
    let sent = notifier.sent_handle();

    let output = register_usecase(&store, notifier)
        .execute(alice(None))
        .await
        .unwrap();

    assert_eq!(output.role, UserRole::User);

    let users = store.users_handle();
    let users = users.lock().unwrap();
    assert_eq!(users.len(), 1);
    assert!(!users[0].is_verified);
    assert_ne!(users[0].password_hash, "secret1");

    let tokens = store.tokens_handle();
    let tokens = tokens.lock().unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].user_id, output.user_id);
    assert!(tokens[0].is_live());
    assert_eq!(tokens[0].token.len(), 12);

    let sent = sent.lock().unwrap();
    assert_eq!(sent.as_slice(), &[("a@x.com".to_owned(), tokens[0].token.clone())]);
}

#[tokio::test]
async fn should_grant_admin_with_invite_code() {
    let store = MockStore::new();
    let output = register_usecase(&store, MockNotifier::new())
        .execute(alice(Some(ADMIN_INVITE_CODE)))
        .await
        .unwrap();

    assert_eq!(output.role, UserRole::Admin);
    assert_eq!(store.user(output.user_id).role, UserRole::Admin);
}

#[tokio::test]
async fn should_ignore_wrong_invite_code() {
    let store = MockStore::new();
    let output = register_usecase(&store, MockNotifier::new())
        .execute(alice(Some("jnutechnicians")))
        .await
        .unwrap();

    assert_eq!(output.role, UserRole::User);
}

#[tokio::test]
async fn should_never_grant_admin_when_invite_code_disabled() {
    let store = MockStore::new();
    let mut usecase = register_usecase(&store, MockNotifier::new());
    usecase.admin_invite_code = String::new();

    let output = usecase.execute(alice(Some(""))).await.unwrap();
    assert_eq!(output.role, UserRole::User);
}

#[tokio::test]
async fn should_reject_duplicate_without_creating_anything() {
    let store = MockStore::new();
    seed_user(&store, "alice", "someone@x.com", "secret1", true).await;
    let notifier = MockNotifier::new();
    let sent = notifier.sent_handle();

    let result = register_usecase(&store, notifier).execute(alice(None)).await;

    assert!(
        matches!(result, Err(ApiServiceError::UserAlreadyExists)),
        "expected UserAlreadyExists, got {result:?}"
    );
    assert_eq!(store.users_handle().lock().unwrap().len(), 1);
    assert!(store.tokens_handle().lock().unwrap().is_empty());
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_duplicate_email() {
    let store = MockStore::new();
    seed_user(&store, "bob", "a@x.com", "secret1", false).await;

    let result = register_usecase(&store, MockNotifier::new())
        .execute(alice(None))
        .await;

    assert!(
        matches!(result, Err(ApiServiceError::UserAlreadyExists)),
        "expected UserAlreadyExists, got {result:?}"
    );
}

#[tokio::test]
async fn should_treat_email_case_variants_as_one_account() {
    let store = MockStore::new();
    let first = register_usecase(&store, MockNotifier::new())
        .execute(RegisterInput {
            email: " Alice@X.com ".to_owned(),
            ..alice(None)
        })
        .await
        .unwrap();
    assert_eq!(store.user(first.user_id).email, "alice@x.com");

    let result = register_usecase(&store, MockNotifier::new())
        .execute(RegisterInput {
            username: "alice2".to_owned(),
            email: "alice@x.com".to_owned(),
            ..alice(None)
        })
        .await;

    assert!(
        matches!(result, Err(ApiServiceError::UserAlreadyExists)),
        "expected UserAlreadyExists, got {result:?}"
    );
    assert_eq!(store.users_handle().lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_keep_user_when_notification_fails() {
    let store = MockStore::new();

    let result = register_usecase(&store, FailingNotifier)
        .execute(alice(None))
        .await;

    assert!(
        matches!(result, Err(ApiServiceError::Notification(_))),
        "expected Notification, got {result:?}"
    );
    assert_eq!(store.users_handle().lock().unwrap().len(), 1);
    assert_eq!(store.tokens_handle().lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_invalid_fields() {
    let cases = [
        ("", "a@x.com", "secret1"),
        ("al ice", "a@x.com", "secret1"),
        ("a@lice", "a@x.com", "secret1"),
        ("alice", "not-an-email", "secret1"),
        ("alice", "a@x.com", "short"),
    ];

    for (username, email, password) in cases {
        let store = MockStore::new();
        let result = register_usecase(&store, MockNotifier::new())
            .execute(RegisterInput {
                username: username.to_owned(),
                email: email.to_owned(),
                password: password.to_owned(),
                invite_code: None,
            })
            .await;

        assert!(
            matches!(result, Err(ApiServiceError::InvalidInput(_))),
            "expected InvalidInput for {username:?}/{email:?}, got {result:?}"
        );
        assert!(store.users_handle().lock().unwrap().is_empty());
    }
}
