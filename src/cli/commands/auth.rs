use std::io::{self, BufRead, Write};
use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::auth::{self, AuthError};
use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::http::parse_base_url;
use crate::config::config;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the portfolio API")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, help = "API base URL to remember for later commands")]
        server: Option<String>,
    },

    #[command(about = "Forget the stored credentials")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, password, server } => {
            let mut state = load_console_state()?;
            if let Some(server) = server {
                state.server_url = Some(parse_base_url(&server)?.to_string());
            }

            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };

            let base_url = parse_base_url(&state.api_url())?;
            let http = reqwest::Client::builder()
                .timeout(Duration::from_secs(config().api.timeout_secs))
                .build()?;

            let session = state.session();
            match auth::login(&http, &base_url, &username, &password).await {
                Ok(credentials) => {
                    session.sign_in(credentials).await;
                    state.absorb(&session).await;
                    save_console_state(&state)?;
                    output_success(
                        &output_format,
                        &format!("Logged in as {}", username),
                        Some(json!({ "username": username, "server": base_url.as_str() })),
                    )
                }
                Err(e) => {
                    if let OutputFormat::Json = output_format {
                        let code = match &e {
                            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
                            AuthError::MissingToken => "MISSING_TOKEN",
                            AuthError::Client(c) => c.error_code(),
                        };
                        output_error(&output_format, &e.to_string(), Some(code))?;
                    }
                    Err(e.into())
                }
            }
        }
        AuthCommands::Logout => {
            let mut state = load_console_state()?;
            let session = state.session();
            session.logout().await;
            state.absorb(&session).await;
            save_console_state(&state)?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let state = load_console_state()?;
            let session = state.session();
            let authenticated = session.is_authenticated().await;
            let claims = session.claims().await;
            let expires_at = claims.as_ref().and_then(|c| c.expires_at());
            let expired = claims.as_ref().map(|c| c.is_expired_at(Utc::now())).unwrap_or(false);

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "authenticated": authenticated,
                            "server": state.api_url(),
                            "username": state.username,
                            "user_id": claims.as_ref().and_then(|c| c.user_id.clone()),
                            "expires_at": expires_at,
                            "expired": expired,
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("Server: {}", state.api_url());
                    if !authenticated {
                        println!("Not logged in");
                        return Ok(());
                    }
                    println!("Logged in as: {}", state.username.as_deref().unwrap_or("(unknown)"));
                    if let Some(exp) = expires_at {
                        let note = if expired { " (expired)" } else { "" };
                        println!("Token expires: {}{}", exp.format("%Y-%m-%d %H:%M UTC"), note);
                    }
                }
            }
            Ok(())
        }
    }
}

fn prompt_password() -> anyhow::Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
