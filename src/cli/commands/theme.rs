use clap::Subcommand;
use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ThemeCommands {
    #[command(about = "Show the current theme")]
    Show,

    #[command(about = "Switch between dark and light")]
    Toggle,
}

pub async fn handle(cmd: ThemeCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut state = load_console_state()?;
    let session = state.session();

    let theme = match cmd {
        ThemeCommands::Show => session.theme().await,
        ThemeCommands::Toggle => {
            let theme = session.toggle_theme().await;
            state.absorb(&session).await;
            save_console_state(&state)?;
            theme
        }
    };

    let name = serde_json::to_value(theme)?;
    output_success(
        &output_format,
        &format!("Theme: {}", name.as_str().unwrap_or_default()),
        Some(json!({ "theme": name })),
    )
}
