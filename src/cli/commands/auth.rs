use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{
    clear_spotify_authorization, load_spotify_authorization, save_spotify_authorization, CliSession,
};
use crate::cli::utils::{output_success, output_user, value_or_prompt};
use crate::cli::OutputFormat;
use crate::oauth::{check_google_audience, parse_callback, SpotifyAuthorization};
use crate::session::{AuthState, LoginOutcome};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with email and password")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (prompts if omitted; the prompt echoes input)")]
        password: Option<String>,
    },

    #[command(about = "Create an account")]
    Register {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (prompts if omitted; the prompt echoes input)")]
        password: Option<String>,
    },

    #[command(about = "Submit the emailed verification code")]
    Verify {
        #[arg(help = "Verification code")]
        code: String,
    },

    #[command(about = "Send the verification code again")]
    Resend,

    #[command(about = "Sign in with a Google ID token")]
    Google {
        #[arg(help = "Google ID token; its audience must match SALBUM_GOOGLE_CLIENT_ID when that is set")]
        id_token: String,
    },

    #[command(name = "spotify-url", about = "Start Spotify sign-in and print the authorization URL")]
    SpotifyUrl,

    #[command(about = "Finish Spotify sign-in with the redirect URL you were sent to")]
    Spotify {
        #[arg(help = "Full redirect URL including code and state")]
        redirect_url: String,
    },

    #[command(about = "Refresh the access token")]
    Refresh,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Sign out on this machine")]
    Logout,

    #[command(name = "reset-password", about = "Email a password reset link")]
    ResetPassword {
        #[arg(help = "Email")]
        email: String,
    },

    #[command(name = "change-password", about = "Set a new password using a reset token")]
    ChangePassword {
        #[arg(help = "Reset token from the email")]
        token: String,
        #[arg(long, help = "New password (prompts if omitted; the prompt echoes input)")]
        password: Option<String>,
    },
}

fn output_outcome(output_format: &OutputFormat, outcome: LoginOutcome) -> anyhow::Result<()> {
    match outcome {
        LoginOutcome::Authenticated(user) => output_success(
            output_format,
            &format!("Signed in as {}", user.username),
            Some(json!({ "status": "authenticated", "user": user })),
        ),
        LoginOutcome::MfaRequired { email } => output_success(
            output_format,
            &format!("Verification code sent to {}. Run `salbum auth verify <code>`.", email),
            Some(json!({ "status": "mfa_required", "email": email })),
        ),
    }
}

pub async fn handle(cmd: AuthCommands, session: &CliSession, output_format: OutputFormat) -> anyhow::Result<()> {
    let app = &session.app;
    let auth = &app.auth;

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = value_or_prompt(password, "Password")?;
            let outcome = auth.login(&email, &password).await?;
            output_outcome(&output_format, outcome)
        }
        AuthCommands::Register {
            name,
            username,
            email,
            password,
        } => {
            let password = value_or_prompt(password, "Password")?;
            let outcome = auth.register(&name, &username, &email, &password).await?;
            output_outcome(&output_format, outcome)
        }
        AuthCommands::Verify { code } => {
            let user = auth.validate_code(&code).await?;
            output_outcome(&output_format, LoginOutcome::Authenticated(user))
        }
        AuthCommands::Resend => {
            auth.resend_code().await?;
            output_success(&output_format, "Verification code sent again", None)
        }
        AuthCommands::Google { id_token } => {
            check_google_audience(&app.config.oauth, &id_token)?;
            let user = auth.login_with_google(&id_token).await?;
            output_outcome(&output_format, LoginOutcome::Authenticated(user))
        }
        AuthCommands::SpotifyUrl => {
            let authorization = SpotifyAuthorization::start(&app.config.oauth)?;
            save_spotify_authorization(&authorization)?;
            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Open the URL to authorize",
                    Some(json!({ "url": authorization.url })),
                ),
                OutputFormat::Text => {
                    println!("Open this URL, then run `salbum auth spotify <redirect-url>`:");
                    println!("{}", authorization.url);
                    Ok(())
                }
            }
        }
        AuthCommands::Spotify { redirect_url } => {
            let authorization = load_spotify_authorization()?
                .ok_or_else(|| anyhow::anyhow!("No Spotify sign-in in progress. Run `salbum auth spotify-url` first."))?;
            let (code, state) = parse_callback(&redirect_url)?;
            authorization.verify_state(&state)?;

            let user = auth
                .login_with_spotify(&code, &authorization.redirect_uri, &authorization.code_verifier)
                .await?;
            clear_spotify_authorization()?;
            output_outcome(&output_format, LoginOutcome::Authenticated(user))
        }
        AuthCommands::Refresh => {
            auth.refresh().await?;
            let expires = app.session().current().and_then(|s| s.access_token.expire_at);
            output_success(
                &output_format,
                "Access token refreshed",
                Some(json!({ "expire_at": expires })),
            )
        }
        AuthCommands::Status => {
            let state = auth.state();
            let (status, detail) = match &state {
                AuthState::Authenticated => {
                    let current = app.session().current();
                    let username = current.as_ref().map(|s| s.user.username.clone()).unwrap_or_default();
                    let expired = current.as_ref().map(|s| s.access_token.is_expired()).unwrap_or(false);
                    (
                        "authenticated",
                        json!({ "username": username, "token_expired": expired }),
                    )
                }
                AuthState::MfaPending { email, context } => {
                    ("mfa_pending", json!({ "email": email, "context": context }))
                }
                AuthState::Unauthenticated => ("unauthenticated", json!({})),
            };

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({ "status": status, "detail": detail }))?
                    );
                }
                OutputFormat::Text => match state {
                    AuthState::Authenticated => println!("Signed in as {}", detail["username"].as_str().unwrap_or("")),
                    AuthState::MfaPending { email, .. } => println!("Waiting for the verification code sent to {}", email),
                    AuthState::Unauthenticated => println!("Not signed in"),
                },
            }
            Ok(())
        }
        AuthCommands::Whoami => {
            let user = auth.reload_profile().await?;
            output_user(&output_format, &user)
        }
        AuthCommands::Logout => {
            app.logout();
            session.forget_cookies();
            output_success(&output_format, "Signed out", None)
        }
        AuthCommands::ResetPassword { email } => {
            let message = auth.reset_password(&email).await?;
            output_success(
                &output_format,
                message.as_deref().unwrap_or("Password reset email sent"),
                None,
            )
        }
        AuthCommands::ChangePassword { token, password } => {
            let password = value_or_prompt(password, "New password")?;
            auth.change_password(&password, &token).await?;
            output_success(&output_format, "Password changed", None)
        }
    }
}
