use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::display_value;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::dashboard::DashboardSummary;
use crate::record::Record;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let state = load_console_state()?;
    let client = state.client(state.session())?;
    let summary = DashboardSummary::fetch(&client, config().dashboard.recent_messages).await;

    match output_format {
        OutputFormat::Json => {
            let recent: Vec<_> = summary.recent_messages.iter().map(Record::to_value).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "counts": summary.counts,
                    "recent_messages": recent,
                }))?
            );
        }
        OutputFormat::Text => {
            let c = &summary.counts;
            println!("{:<12} {}", "Projects", c.projects);
            println!("{:<12} {}", "Skills", c.skills);
            println!("{:<12} {}", "Messages", c.messages);
            println!("{:<12} {}", "Experience", c.experience);
            println!();
            if summary.recent_messages.is_empty() {
                println!("No messages yet");
            } else {
                println!("Recent messages:");
                for msg in &summary.recent_messages {
                    println!(
                        "  {} <{}>: {}",
                        msg.get_str("name").unwrap_or("(anonymous)"),
                        msg.get_str("email").unwrap_or("-"),
                        msg.get("message").map(display_value).unwrap_or_default()
                    );
                }
            }
        }
    }
    Ok(())
}
