use std::sync::Arc;

use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::{Attachment, ResourceClient};
use crate::editor::{CrudEditorController, DraftMode, LoadOutcome, SubmitOutcome};
use crate::order::parse_order;
use crate::record::RecordId;
use crate::types::ResourceType;

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "List records of a resource")]
    List {
        #[arg(help = "Resource (profile, skill, project, experience, education, certification, contact-info, message)")]
        resource: ResourceType,
        #[arg(long, help = "Sort order, e.g. \"start_date desc, id\"")]
        order: Option<String>,
    },

    #[command(about = "Create a record")]
    Create {
        #[arg(help = "Resource")]
        resource: ResourceType,
        #[arg(long = "field", value_name = "NAME=VALUE", help = "Field value (repeatable)")]
        fields: Vec<String>,
        #[arg(long = "file", value_name = "NAME=PATH", help = "Attach a file (repeatable)")]
        files: Vec<String>,
    },

    #[command(about = "Update a record; omit the id for profile and contact-info")]
    Update {
        #[arg(help = "Resource")]
        resource: ResourceType,
        #[arg(help = "Record ID")]
        id: Option<RecordId>,
        #[arg(long = "field", value_name = "NAME=VALUE", help = "Field value (repeatable)")]
        fields: Vec<String>,
        #[arg(long = "file", value_name = "NAME=PATH", help = "Replace a file (repeatable)")]
        files: Vec<String>,
        #[arg(long = "clear-file", value_name = "NAME", help = "Remove a stored file (repeatable)")]
        clear_files: Vec<String>,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Resource")]
        resource: ResourceType,
        #[arg(help = "Record ID")]
        id: RecordId,
        #[arg(long, help = "Confirm the deletion")]
        yes: bool,
    },
}

pub async fn handle(cmd: DataCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = load_console_state()?;
    let client: Arc<dyn ResourceClient> = Arc::new(state.client(state.session())?);

    match cmd {
        DataCommands::List { resource, order } => {
            let mut editor = CrudEditorController::new(resource, client);
            if let Some(order) = order {
                editor.set_order(parse_order(&order)?);
            }
            if let LoadOutcome::Failed { message } = editor.load().await {
                return Err(anyhow::anyhow!("Failed to load {}: {}", resource, message));
            }
            output_records(&output_format, editor.descriptor(), editor.records().as_slice())
        }
        DataCommands::Create { resource, fields, files } => {
            let mut editor = CrudEditorController::new(resource, client);
            editor.begin_create()?;
            fill_draft(&mut editor, &fields, &files, &[]).await?;
            submit(&mut editor, &output_format).await
        }
        DataCommands::Update { resource, id, fields, files, clear_files } => {
            let mut editor = CrudEditorController::new(resource, client);
            if let LoadOutcome::Failed { message } = editor.load().await {
                return Err(anyhow::anyhow!("Failed to load {}: {}", resource, message));
            }
            match id {
                Some(id) => editor.begin_edit(&id)?,
                None if editor.descriptor().singleton => editor.begin_singleton()?,
                None => return Err(anyhow::anyhow!("A record ID is required to update {}", resource)),
            }
            fill_draft(&mut editor, &fields, &files, &clear_files).await?;
            submit(&mut editor, &output_format).await
        }
        DataCommands::Delete { resource, id, yes } => {
            if !yes {
                return Err(anyhow::anyhow!("Refusing to delete {} {} without --yes", resource, id));
            }
            let mut editor = CrudEditorController::new(resource, client);
            if let LoadOutcome::Failed { message } = editor.load().await {
                return Err(anyhow::anyhow!("Failed to load {}: {}", resource, message));
            }
            editor.delete(&id).await?;
            editor.reconcile().await;
            output_success(
                &output_format,
                &format!("Deleted {} {} ({} remaining)", resource, id, editor.records().len()),
                Some(json!({ "resource": resource, "id": id.to_value(), "remaining": editor.records().len() })),
            )
        }
    }
}

async fn fill_draft(
    editor: &mut CrudEditorController,
    fields: &[String],
    files: &[String],
    clear_files: &[String],
) -> anyhow::Result<()> {
    for raw in fields {
        let (name, text) = parse_assignment(raw)?;
        let value = match editor.descriptor().field(&name) {
            Some(spec) => spec.coerce(&text),
            None => Value::String(text),
        };
        editor.update_draft_field(&name, value)?;
    }

    for raw in files {
        let (name, path) = parse_assignment(raw)?;
        let attachment = Attachment::from_path(&path)
            .await
            .map_err(|e| anyhow::anyhow!("Cannot read '{}': {}", path, e))?;
        editor.attach_file(&name, attachment)?;
    }

    for name in clear_files {
        editor.clear_file(name)?;
    }

    Ok(())
}

async fn submit(editor: &mut CrudEditorController, output_format: &OutputFormat) -> anyhow::Result<()> {
    let action = match editor.state().mode() {
        Some(DraftMode::Edit(_)) => "Updated",
        _ => "Created",
    };

    match editor.submit().await {
        Ok(SubmitOutcome::Saved { id }) => {
            let id_text = id.as_ref().map(|i| i.to_string()).unwrap_or_default();
            output_success(
                output_format,
                &format!("{} {} {}", action, editor.resource(), id_text).trim_end().to_string(),
                Some(json!({ "resource": editor.resource(), "id": id.map(|i| i.to_value()) })),
            )
        }
        Ok(outcome) => Err(anyhow::anyhow!("Submit did not complete: {:?}", outcome)),
        Err(e) => {
            output_error(output_format, &e.to_string(), Some("SUBMIT_FAILED"))?;
            Err(anyhow::anyhow!("Save failed; nothing was written"))
        }
    }
}
