use clap::Subcommand;
use serde_json::json;

use crate::auth::{decode_claims, Authorization};
use crate::cli::config::CliContext;
use crate::cli::utils::{output_success, prompt_line};
use crate::cli::OutputFormat;
use crate::shell::Navigation;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and store the issued tokens")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Register a new user")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Clear the stored tokens")]
    Logout,

    #[command(about = "Check the stored session, refreshing it if expired")]
    Status,
}

fn resolve_password(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(p) => Ok(p),
        None => prompt_line("Password: "),
    }
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut ctx = CliContext::load()?;

    match cmd {
        AuthCommands::Login { username, password } => {
            let password = resolve_password(password)?;
            let credential = ctx
                .client()
                .login(&username, &password)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message("Login failed. Please check your credentials.")))?;
            ctx.client().session().establish(credential)?;

            output_success(
                &output_format,
                &format!("Logged in as {}", username),
                Some(json!({ "username": username })),
            )
        }
        AuthCommands::Register { username, password } => {
            let password = resolve_password(password)?;
            ctx.client()
                .register(&username, &password)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message("Registration failed. Please try again.")))?;

            output_success(
                &output_format,
                &format!("Registered {}; run `stockroom auth login {}` to sign in", username, username),
                Some(json!({ "username": username })),
            )
        }
        AuthCommands::Logout => {
            let Navigation::Redirect(to) = ctx.shell.logout()? else {
                anyhow::bail!("logout did not leave the protected area");
            };
            output_success(&output_format, "Logged out", Some(json!({ "redirect": to.path() })))
        }
        AuthCommands::Status => match ctx.shell.guard().authorize().await {
            Authorization::Authorized => {
                let expires_at = ctx
                    .client()
                    .session()
                    .access_token()
                    .and_then(|t| decode_claims(&t).ok())
                    .and_then(|c| c.expires_at());
                let message = match expires_at {
                    Some(at) => format!("Authenticated; access token valid until {}", at.to_rfc3339()),
                    None => "Authenticated".to_string(),
                };
                output_success(
                    &output_format,
                    &message,
                    Some(json!({ "authenticated": true, "expires_at": expires_at })),
                )
            }
            Authorization::Unauthorized => {
                anyhow::bail!("Not logged in; run `stockroom auth login <username>`")
            }
        },
    }
}
