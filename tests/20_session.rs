mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Result;

use salbum_client::config::ClientConfig;
use salbum_client::session::{AuthState, FileStorage, LoginOutcome, PendingChallenge};
use salbum_client::types::{MfaContext, UpdateProfileRequest};
use salbum_client::{AppContext, ClientError};

#[tokio::test]
async fn login_with_code_challenge_authenticates_after_validation() -> Result<()> {
    let server = common::spawn_mock().await?;
    server.state.login_requires_code.store(true, Ordering::SeqCst);
    let app = common::app_for(&server)?;

    let outcome = app.auth.login("ada@example.com", "secret").await?;
    assert_eq!(
        outcome,
        LoginOutcome::MfaRequired {
            email: "ada@example.com".into()
        }
    );
    assert_eq!(
        app.auth.state(),
        AuthState::MfaPending {
            email: "ada@example.com".into(),
            context: MfaContext::Login
        }
    );
    assert!(!app.session().is_authenticated());

    let user = app.auth.validate_code("123456").await?;

    assert_eq!(user.username, "ada");
    assert_eq!(app.auth.state(), AuthState::Authenticated);
    assert_eq!(app.auth.pending_challenge(), None);
    assert_eq!(server.state.validate_login_calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.state.validate_email_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn registration_code_goes_to_email_validation() -> Result<()> {
    let server = common::spawn_mock().await?;
    let app = common::app_for(&server)?;

    let outcome = app.auth.register("Ada", "ada", "ada@example.com", "secret").await?;
    assert!(matches!(outcome, LoginOutcome::MfaRequired { .. }));

    app.auth.resend_code().await?;
    app.auth.validate_code("123456").await?;

    assert_eq!(server.state.validate_email_calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.state.validate_login_calls.load(Ordering::SeqCst), 0);
    assert_eq!(server.state.resend_calls.load(Ordering::SeqCst), 1);
    assert!(app.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn wrong_code_keeps_the_challenge_open() -> Result<()> {
    let server = common::spawn_mock().await?;
    server.state.login_requires_code.store(true, Ordering::SeqCst);
    let app = common::app_for(&server)?;
    app.auth.login("ada@example.com", "secret").await?;

    let err = app.auth.validate_code("000000").await.unwrap_err();

    assert!(matches!(err, ClientError::AuthRejected(ref m) if m == "Invalid code"));
    assert!(matches!(app.auth.state(), AuthState::MfaPending { .. }));
    Ok(())
}

#[tokio::test]
async fn local_validation_failures_make_no_request() -> Result<()> {
    let server = common::spawn_mock().await?;
    let app = common::app_for(&server)?;

    assert!(matches!(app.auth.validate_code("123456").await, Err(ClientError::Validation(_))));
    assert!(matches!(app.auth.resend_code().await, Err(ClientError::Validation(_))));
    assert!(matches!(
        app.auth.update_profile(&UpdateProfileRequest::default()).await,
        Err(ClientError::Validation(_))
    ));

    assert!(server.state.seen_paths().is_empty());
    Ok(())
}

#[tokio::test]
async fn rejected_login_leaves_no_partial_session() -> Result<()> {
    let server = common::spawn_mock().await?;
    let app = common::app_for(&server)?;

    let err = app.auth.login("ada@example.com", "locked").await.unwrap_err();

    assert!(matches!(err, ClientError::AuthRejected(ref m) if m == "Account locked"));
    assert_eq!(app.session().current(), None);
    assert_eq!(app.auth.state(), AuthState::Unauthenticated);
    Ok(())
}

#[tokio::test]
async fn logout_clears_token_and_user_together() -> Result<()> {
    let server = common::spawn_mock().await?;
    let app = common::app_for(&server)?;
    app.auth.login("ada@example.com", "secret").await?;
    assert!(app.session().is_authenticated());

    app.logout();

    assert_eq!(app.session().access_token(), None);
    assert_eq!(app.session().user(), None);
    assert_eq!(app.auth.state(), AuthState::Unauthenticated);
    Ok(())
}

#[tokio::test]
async fn google_sign_in_authenticates() -> Result<()> {
    let server = common::spawn_mock().await?;
    let app = common::app_for(&server)?;

    let user = app.auth.login_with_google(common::GOOGLE_ID_TOKEN).await?;

    assert_eq!(user.username, "ada");
    assert_eq!(app.auth.state(), AuthState::Authenticated);
    assert_eq!(app.session().access_token(), Some(server.state.current_token()));
    let seen = server.state.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].authorization, None);
    Ok(())
}

#[tokio::test]
async fn rejected_google_token_uses_fallback_message() -> Result<()> {
    let server = common::spawn_mock().await?;
    let app = common::app_for(&server)?;

    let err = app.auth.login_with_google("forged").await.unwrap_err();

    assert!(matches!(err, ClientError::AuthRejected(ref m) if m == "Google sign-in failed."));
    assert_eq!(app.session().current(), None);
    assert_eq!(app.auth.state(), AuthState::Unauthenticated);
    Ok(())
}

#[tokio::test]
async fn spotify_sign_in_sends_code_and_verifier() -> Result<()> {
    let server = common::spawn_mock().await?;
    let app = common::app_for(&server)?;

    let user = app
        .auth
        .login_with_spotify(common::SPOTIFY_CODE, "http://localhost:5173/callback", "verifier-abc")
        .await?;

    assert_eq!(user.id, "u1");
    assert_eq!(app.auth.state(), AuthState::Authenticated);
    let body = server.state.last_auth_body.lock().unwrap().clone();
    assert_eq!(body["code"], common::SPOTIFY_CODE);
    assert_eq!(body["redirect_uri"], "http://localhost:5173/callback");
    assert_eq!(body["code_verifier"], "verifier-abc");

    let err = app.auth.login_with_spotify("stale", "http://localhost:5173/callback", "v").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 400, ref message } if message == "invalid_grant"));
    Ok(())
}

#[tokio::test]
async fn proactive_refresh_rotates_the_token() -> Result<()> {
    let server = common::spawn_mock().await?;
    let app = common::app_signed_in(&server)?;
    let before = app.session().access_token();

    app.auth.refresh().await?;

    let after = app.session().access_token();
    assert_ne!(after, before);
    assert_eq!(after, Some(server.state.current_token()));
    assert_eq!(app.session().user().map(|u| u.id), Some("u1".to_string()));
    Ok(())
}

#[tokio::test]
async fn failed_proactive_refresh_clears_token_and_user() -> Result<()> {
    let server = common::spawn_mock().await?;
    server.state.refresh_fails.store(true, Ordering::SeqCst);
    let app = common::app_signed_in(&server)?;

    let err = app.auth.refresh().await.unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired));
    assert_eq!(app.session().access_token(), None);
    assert_eq!(app.session().user(), None);
    assert_eq!(app.session().current(), None);
    assert_eq!(app.auth.state(), AuthState::Unauthenticated);
    Ok(())
}

#[tokio::test]
async fn password_reset_and_change() -> Result<()> {
    let server = common::spawn_mock().await?;
    let app = common::app_for(&server)?;

    let message = app.auth.reset_password("ada@example.com").await?;
    assert_eq!(message.as_deref(), Some("Reset link sent"));
    assert_eq!(server.state.last_auth_body.lock().unwrap()["email"], "ada@example.com");

    app.auth.change_password("n3w-secret", common::RESET_TOKEN).await?;
    let body = server.state.last_auth_body.lock().unwrap().clone();
    assert_eq!(body["newPassword"], "n3w-secret");
    assert_eq!(body["token"], common::RESET_TOKEN);

    let err = app.auth.change_password("n3w-secret", "used-token").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 400, ref message } if message == "Reset token expired"));
    assert_eq!(server.state.count("POST", "/auth/changePassword"), 2);
    Ok(())
}

#[tokio::test]
async fn empty_profile_update_is_sent_as_is() -> Result<()> {
    let server = common::spawn_mock().await?;
    let app = common::app_signed_in(&server)?;

    let user = app.auth.update_profile(&UpdateProfileRequest::default()).await?;

    assert_eq!(user.username, "ada");
    assert_eq!(server.state.count("PUT", "/users/me"), 1);
    Ok(())
}

#[tokio::test]
async fn profile_update_keeps_the_server_copy() -> Result<()> {
    let server = common::spawn_mock().await?;
    let app = common::app_signed_in(&server)?;

    let fields = UpdateProfileRequest {
        username: Some("AdaL".into()),
        bio: Some("Listening to everything".into()),
        ..Default::default()
    };
    let user = app.auth.update_profile(&fields).await?;

    assert_eq!(user.username, "adal");
    assert_eq!(app.session().user().map(|u| u.username), Some("adal".to_string()));
    assert_eq!(app.session().user().and_then(|u| u.bio), Some("Listening to everything".to_string()));
    Ok(())
}

#[tokio::test]
async fn session_and_challenge_survive_a_restart() -> Result<()> {
    let server = common::spawn_mock().await?;
    server.state.login_requires_code.store(true, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!("salbum-session-{}.json", uuid::Uuid::new_v4()));
    let open = || AppContext::new(ClientConfig::for_base_url(&server.base_url), Arc::new(FileStorage::new(&path)));

    let first = open()?;
    first.auth.login("ada@example.com", "secret").await?;
    let challenge = first.auth.pending_challenge().expect("challenge pending");
    drop(first);

    let second = open()?;
    assert_eq!(second.auth.state(), AuthState::Unauthenticated);
    second.auth.resume_challenge(PendingChallenge {
        email: challenge.email,
        context: challenge.context,
    });
    second.auth.validate_code("123456").await?;
    drop(second);

    let third = open()?;
    assert_eq!(third.auth.state(), AuthState::Authenticated);
    assert_eq!(third.session().access_token(), Some(server.state.current_token()));

    std::fs::remove_file(&path).ok();
    Ok(())
}
