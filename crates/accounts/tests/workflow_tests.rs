//! Workflow tests for the account models against in-memory clients.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::Barrier;
use tokio::time::timeout;

use portal_accounts::services::mock_clients::{DirectoryCall, MailerCall, MockDirectory, MockMailer};
use portal_accounts::{
    AccountError, AccountModel, AccountServices, ConfirmUserModel, ForgotPasswordModel,
    FormRecord, RegisterModel, ResetUserPasswordModel,
};
use portal_directory::{DeliveryStatus, DirectoryClient, EmailStatus, JsonObject, RemoteCallError};

const SITE: &str = "portal";

fn setup() -> (AccountServices, Arc<MockDirectory>, Arc<MockMailer>) {
    let directory = Arc::new(MockDirectory::new());
    let mailer = Arc::new(MockMailer::new());
    let services = AccountServices::new(directory.clone(), mailer.clone(), SITE);
    (services, directory, mailer)
}

fn form(value: Value) -> FormRecord {
    serde_json::from_value(value).expect("form literal")
}

fn registration(country: &str) -> FormRecord {
    form(json!({
        "firstName": "Jane",
        "lastName": "Doe",
        "email": "jane@example.com",
        "password": "s3cret",
        "passwordConfirmation": "s3cret",
        "country": country,
        "businessType": "retail",
        "origin": "https://portal.example.com",
    }))
}

async fn seed_jane(directory: &MockDirectory) {
    directory
        .insert_user(json!({
            "id": "u-1",
            "firstName": "Jane",
            "lastName": "Doe",
            "email": "jane@example.com",
            "gsa": false,
            "confirmedAt": "2024-01-01T00:00:00Z",
        }))
        .await;
}

#[tokio::test]
async fn account_read_merges_preferences_and_agreements() {
    let (services, directory, _mailer) = setup();
    seed_jane(&directory).await;
    directory
        .insert_preferences(
            "u-1",
            SITE,
            json!({"private": {"preferences": {"businessType": "retail"}}}),
        )
        .await;
    directory
        .insert_agreements(
            "u-1",
            json!({"tos": {"id": "test_tos", "version": "version_0"}, "privacyPolicy": "v2"}),
        )
        .await;

    let mut model = AccountModel::new(FormRecord::new());
    let view = model.read(&services, "u-1").await.expect("account should load");
    let account = view.account.as_object();

    assert_eq!(account.get("businessType"), Some(&json!("retail")));
    assert_eq!(account.get("privacyPolicy"), Some(&json!("v2")));
    assert_eq!(account.get("email"), Some(&json!("jane@example.com")));
    assert_eq!(account.get("city"), Some(&json!("")));
    for internal in ["gsa", "tos", "confirmedAt"] {
        assert!(!account.contains_key(internal), "{internal} should be stripped");
    }

    let serialized = serde_json::to_value(&view).unwrap();
    assert_eq!(serialized["account"]["firstName"], json!("Jane"));

    let calls = directory.calls().await;
    assert_eq!(calls[0], DirectoryCall::GetUser { id: "u-1".to_string() });
    assert!(calls.contains(&DirectoryCall::GetUserPreferences {
        user_id: "u-1".to_string(),
        site_id: SITE.to_string(),
    }));
    assert!(calls.contains(&DirectoryCall::AgreementsHistory { id: "u-1".to_string() }));
}

#[tokio::test]
async fn account_read_starts_both_lookups_together() {
    let (services, directory, _mailer) = setup();
    seed_jane(&directory).await;
    let barrier = Arc::new(Barrier::new(2));
    directory.gate("get_user_preferences", barrier.clone()).await;
    directory.gate("agreements_history", barrier).await;

    let mut model = AccountModel::new(FormRecord::new());
    timeout(Duration::from_secs(5), model.read(&services, "u-1"))
        .await
        .expect("lookups should not wait on each other")
        .expect("account should load");
}

#[tokio::test]
async fn account_read_ignores_preferences_without_private_section() {
    let (services, directory, _mailer) = setup();
    seed_jane(&directory).await;
    directory
        .insert_preferences("u-1", SITE, json!({"public": {"theme": "dark"}}))
        .await;

    let mut model = AccountModel::new(FormRecord::new());
    let view = model.read(&services, "u-1").await.expect("account should load");

    assert!(!view.account.as_object().contains_key("public"));
    assert!(!view.account.as_object().contains_key("theme"));
}

#[tokio::test]
async fn account_read_fails_when_a_concurrent_lookup_fails() {
    let (services, directory, _mailer) = setup();
    seed_jane(&directory).await;
    directory.fail_on("agreements_history").await;

    let mut model = AccountModel::new(FormRecord::new());
    let error = model
        .read(&services, "u-1")
        .await
        .expect_err("read should fail");

    assert!(matches!(error, AccountError::Remote(RemoteCallError::Unavailable(_))));
    assert!(!model.record().as_object().contains_key("email"));
}

#[tokio::test]
async fn account_read_of_unknown_user_stops_after_lookup() {
    let (services, directory, _mailer) = setup();

    let mut model = AccountModel::new(FormRecord::new());
    let error = model.read(&services, "nobody").await.expect_err("unknown user");

    assert!(matches!(
        error,
        AccountError::Remote(RemoteCallError::Rejected { status: 404, .. })
    ));
    assert_eq!(directory.operations().await, ["get_user"]);
}

#[tokio::test]
async fn account_update_without_password_is_a_single_call() {
    let (services, directory, _mailer) = setup();
    seed_jane(&directory).await;

    let model = AccountModel::new(form(json!({
        "firstName": "Janet",
        "lastName": "Doe",
        "email": "jane@example.com",
        "passwordConfirmation": "",
    })));
    assert!(model.validate().is_valid());

    let updated = model.update(&services, "u-1").await.expect("update should succeed");

    assert_eq!(updated.get("firstName"), Some(&json!("Janet")));
    assert_eq!(directory.operations().await, ["update_user"]);

    match &directory.calls().await[0] {
        DirectoryCall::UpdateUser { id, body } => {
            assert_eq!(id, "u-1");
            assert!(!body.contains_key("passwordConfirmation"));
            assert_eq!(body.get("country"), Some(&Value::Null));
        }
        other => panic!("unexpected call: {other:?}"),
    }
}

#[tokio::test]
async fn account_update_with_password_resets_credentials_in_order() {
    let (services, directory, _mailer) = setup();
    seed_jane(&directory).await;

    let model = AccountModel::new(form(json!({
        "firstName": "Jane",
        "lastName": "Doe",
        "email": "jane@example.com",
        "password": "n3w-pass",
        "passwordConfirmation": "n3w-pass",
    })));
    assert!(model.validate().is_valid());

    model.update(&services, "u-1").await.expect("update should succeed");

    assert_eq!(
        directory.operations().await,
        ["update_user", "forgot_password", "reset_password"]
    );

    let calls = directory.calls().await;
    let mut expected_request = JsonObject::new();
    expected_request.insert("email".to_string(), json!("jane@example.com"));
    assert_eq!(calls[1], DirectoryCall::ForgotPassword { body: expected_request });
    assert_eq!(
        calls[2],
        DirectoryCall::ResetPassword {
            token: "reset-u-1".to_string(),
            password: "n3w-pass".to_string(),
        }
    );

    let stored = directory.user("u-1").await.expect("user exists");
    assert_eq!(stored.get("password"), Some(&json!("n3w-pass")));
}

#[tokio::test]
async fn account_update_failure_skips_password_steps() {
    let (services, directory, _mailer) = setup();
    seed_jane(&directory).await;
    directory.fail_on("update_user").await;

    let model = AccountModel::new(form(json!({
        "email": "jane@example.com",
        "password": "n3w-pass",
        "passwordConfirmation": "n3w-pass",
    })));

    let error = model.update(&services, "u-1").await.expect_err("update fails");
    assert!(matches!(error, AccountError::Remote(_)));
    assert_eq!(directory.operations().await, ["update_user"]);
}

#[tokio::test]
async fn confirm_user_passes_id_and_token_through() {
    let (services, directory, _mailer) = setup();
    seed_jane(&directory).await;

    let model = ConfirmUserModel::new(form(json!({"id": "u-1", "token": "confirm-abc"})));
    assert!(model.validate().is_valid());

    let reply = model.save(&services).await.expect("confirmation succeeds");

    assert_eq!(reply, json!({"id": "u-1", "confirmed": true}));
    assert_eq!(
        directory.calls().await,
        [DirectoryCall::ConfirmUser {
            id: "u-1".to_string(),
            token: "confirm-abc".to_string(),
        }]
    );
}

#[tokio::test]
async fn confirm_user_failure_is_passed_through() {
    let (services, _directory, _mailer) = setup();

    let model = ConfirmUserModel::new(form(json!({"id": "ghost", "token": "t"})));
    let error = model.save(&services).await.expect_err("unknown user");

    assert!(matches!(
        error,
        AccountError::Remote(RemoteCallError::Rejected { status: 404, .. })
    ));
}

#[tokio::test]
async fn forgot_password_without_token_fails() {
    let (services, directory, mailer) = setup();

    let model = ForgotPasswordModel::new(form(json!({
        "email": "stranger@example.com",
        "origin": "https://portal.example.com",
    })));
    assert!(model.validate().is_valid());

    let error = model.save(&services).await.expect_err("no token issued");

    assert!(matches!(error, AccountError::ResetTokenUnavailable));
    assert_eq!(directory.operations().await, ["forgot_password"]);
    assert!(mailer.calls().await.is_empty());
}

#[tokio::test]
async fn forgot_password_sends_token_to_origin() {
    let (services, directory, mailer) = setup();
    seed_jane(&directory).await;

    let model = ForgotPasswordModel::new(form(json!({
        "email": "jane@example.com",
        "origin": "https://portal.example.com",
    })));

    model.save(&services).await.expect("email delivered");

    match &directory.calls().await[0] {
        DirectoryCall::ForgotPassword { body } => {
            assert_eq!(body.get("email"), Some(&json!("jane@example.com")));
            assert!(!body.contains_key("origin"));
        }
        other => panic!("unexpected call: {other:?}"),
    }

    let calls = mailer.calls().await;
    assert_eq!(
        calls[0],
        MailerCall::ResetPasswordEmail {
            to_email: "jane@example.com".to_string(),
            token: "reset-u-1".to_string(),
            base_url: "https://portal.example.com".to_string(),
        }
    );
    assert_eq!(calls[1].operation(), "email_status");
}

#[tokio::test]
async fn forgot_password_accepts_in_progress_delivery() {
    let (services, directory, mailer) = setup();
    seed_jane(&directory).await;
    mailer
        .set_status(EmailStatus::new(DeliveryStatus::InProgress))
        .await;

    let model = ForgotPasswordModel::new(form(json!({"email": "jane@example.com"})));
    assert!(model.save(&services).await.is_ok());
}

#[tokio::test]
async fn forgot_password_fails_when_email_not_delivered() {
    let (services, directory, mailer) = setup();
    seed_jane(&directory).await;
    mailer.set_status(EmailStatus::new(DeliveryStatus::Failed)).await;

    let model = ForgotPasswordModel::new(form(json!({"email": "jane@example.com"})));
    let error = model.save(&services).await.expect_err("delivery failed");

    assert!(matches!(error, AccountError::ResetEmailNotSent));
}

#[tokio::test]
async fn forgot_password_fails_on_delivery_error_message() {
    let (services, directory, mailer) = setup();
    seed_jane(&directory).await;
    mailer
        .set_status(EmailStatus::new(DeliveryStatus::InProgress).with_error("mailbox full"))
        .await;

    let model = ForgotPasswordModel::new(form(json!({"email": "jane@example.com"})));
    let error = model.save(&services).await.expect_err("delivery reported an error");

    assert!(matches!(error, AccountError::ResetEmailNotSent));
}

#[tokio::test]
async fn register_omits_empty_country_and_runs_follow_ups_once() {
    let (services, directory, mailer) = setup();

    let mut model = RegisterModel::new(registration(""));
    assert!(model.validate().is_valid());

    let account = model.save(&services).await.expect("registration succeeds");

    let calls = directory.calls().await;
    match &calls[0] {
        DirectoryCall::CreateUser { body } => {
            assert!(!body.contains_key("country"));
            assert!(!body.contains_key("passwordConfirmation"));
            assert!(!body.contains_key("businessType"));
            assert!(!body.contains_key("origin"));
        }
        other => panic!("unexpected call: {other:?}"),
    }

    let approvals: Vec<_> = calls
        .iter()
        .filter(|call| call.operation() == "approve_agreements")
        .collect();
    assert_eq!(
        approvals,
        [&DirectoryCall::ApproveAgreements {
            id: "user_1".to_string(),
            tos_id: "test_tos".to_string(),
            tos_version: "version_0".to_string(),
        }]
    );

    let preference_saves: Vec<_> = calls
        .iter()
        .filter(|call| call.operation() == "save_user_preferences")
        .collect();
    assert_eq!(
        preference_saves,
        [&DirectoryCall::SaveUserPreferences {
            user_id: "user_1".to_string(),
            site_id: SITE.to_string(),
            body: json!({"private": {"preferences": {"businessType": "retail"}}}),
        }]
    );

    let mail = mailer.calls().await;
    let confirmations: Vec<_> = mail
        .iter()
        .filter_map(|call| match call {
            MailerCall::ConfirmRegistrationEmail { user, origin } => Some((user, origin)),
            _ => None,
        })
        .collect();
    assert_eq!(confirmations.len(), 1);
    assert_eq!(confirmations[0].0.get("id"), Some(&json!("user_1")));
    assert_eq!(confirmations[0].1, "https://portal.example.com");

    assert_eq!(account.get("id"), Some(&json!("user_1")));
    assert_eq!(account.get("businessType"), Some(&json!("retail")));
    assert!(!account.contains_key("password"));
    assert!(!account.contains_key("passwordConfirmation"));
}

#[tokio::test]
async fn register_starts_follow_ups_together() {
    let (services, directory, mailer) = setup();
    let barrier = Arc::new(Barrier::new(3));
    directory.gate("approve_agreements", barrier.clone()).await;
    directory.gate("save_user_preferences", barrier.clone()).await;
    mailer.gate("confirm_registration_email", barrier).await;

    let mut model = RegisterModel::new(registration("US"));
    timeout(Duration::from_secs(5), model.save(&services))
        .await
        .expect("follow-ups should not wait on each other")
        .expect("registration succeeds");
}

#[tokio::test]
async fn register_keeps_country_when_present() {
    let (services, directory, _mailer) = setup();

    let mut model = RegisterModel::new(registration("US"));
    model.save(&services).await.expect("registration succeeds");

    match &directory.calls().await[0] {
        DirectoryCall::CreateUser { body } => {
            assert_eq!(body.get("country"), Some(&json!("US")));
        }
        other => panic!("unexpected call: {other:?}"),
    }
}

#[tokio::test]
async fn register_surfaces_agreement_failure() {
    let (services, directory, mailer) = setup();
    directory.fail_on("approve_agreements").await;

    let mut model = RegisterModel::new(registration("US"));
    let error = model.save(&services).await.expect_err("agreement failed");

    assert!(matches!(error, AccountError::Remote(_)));
    // The sibling operations still ran to completion.
    assert!(directory
        .operations()
        .await
        .contains(&"save_user_preferences"));
    assert_eq!(
        mailer.operations().await,
        ["confirm_registration_email", "email_status"]
    );
}

#[tokio::test]
async fn register_surfaces_preference_failure() {
    let (services, directory, _mailer) = setup();
    directory.fail_on("save_user_preferences").await;

    let mut model = RegisterModel::new(registration("US"));
    let error = model.save(&services).await.expect_err("preferences failed");

    assert!(matches!(error, AccountError::Remote(_)));
}

#[tokio::test]
async fn register_fails_when_confirmation_not_sent() {
    let (services, _directory, mailer) = setup();
    mailer.set_status(EmailStatus::new(DeliveryStatus::Failed)).await;

    let mut model = RegisterModel::new(registration("US"));
    let error = model.save(&services).await.expect_err("confirmation failed");

    assert!(matches!(error, AccountError::ConfirmationEmailNotSent));
}

#[tokio::test]
async fn register_create_failure_skips_follow_ups() {
    let (services, directory, mailer) = setup();
    directory.fail_on("create_user").await;

    let mut model = RegisterModel::new(registration("US"));
    model.save(&services).await.expect_err("create failed");

    assert_eq!(directory.operations().await, ["create_user"]);
    assert!(mailer.calls().await.is_empty());
    assert!(model.record().get("id").is_none());
}

#[tokio::test]
async fn reset_user_password_notifies_account_email() {
    let (services, directory, mailer) = setup();
    seed_jane(&directory).await;

    let mut request = JsonObject::new();
    request.insert("email".to_string(), json!("jane@example.com"));
    let grant = directory
        .forgot_password(&request)
        .await
        .expect("token issued");
    let token = grant.token().expect("token present").to_string();

    let model = ResetUserPasswordModel::new(form(json!({
        "password": "n3w-pass",
        "token": token,
    })));
    assert!(model.validate().is_valid());

    let receipt = model.save(&services).await.expect("reset succeeds");

    assert_eq!(receipt.id, "msg-1");
    assert_eq!(
        mailer.calls().await,
        [MailerCall::ResetPasswordNotification {
            to_email: "jane@example.com".to_string(),
        }]
    );
}

#[tokio::test]
async fn reset_user_password_with_bad_token_sends_nothing() {
    let (services, _directory, mailer) = setup();

    let model = ResetUserPasswordModel::new(form(json!({
        "password": "n3w-pass",
        "token": "forged",
    })));
    let error = model.save(&services).await.expect_err("token rejected");

    assert!(matches!(
        error,
        AccountError::Remote(RemoteCallError::Rejected { status: 400, .. })
    ));
    assert!(mailer.calls().await.is_empty());
}
