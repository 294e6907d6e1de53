use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::config::CliContext;
use crate::cli::utils::{confirm, output_error, output_form_errors, output_notification, output_success, output_table};
use crate::cli::OutputFormat;
use crate::form::FormError;
use crate::resource::{Provisioning, Resource, ResourceTable, SubmitError};
use crate::shell::{Navigation, Page};
use crate::types::RecordId;

#[derive(Subcommand, Debug, Clone)]
pub enum ResourceCommands {
    #[command(about = "List records")]
    List {
        #[arg(long, help = "Column to sort by, e.g. name or category.name")]
        sort: Option<String>,
        #[arg(long, help = "Sort descending")]
        desc: bool,
        #[arg(long, default_value_t = 1, help = "Page number, starting at 1")]
        page: usize,
    },

    #[command(about = "Create a record from field assignments")]
    Create {
        #[arg(long = "set", value_name = "FIELD=VALUE", help = "Field value (repeatable)")]
        set: Vec<String>,
        #[arg(long, help = "Image file to upload with a new product")]
        image: Option<PathBuf>,
    },

    #[command(about = "Edit a record; unspecified fields keep their current value")]
    Edit {
        #[arg(help = "Record ID")]
        id: RecordId,
        #[arg(long = "set", value_name = "FIELD=VALUE", help = "Field value (repeatable)")]
        set: Vec<String>,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Record ID")]
        id: RecordId,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "List the fields accepted by create and edit")]
    Fields,
}

/// Plain resource page without provisioning
pub async fn handle<R: Resource>(page: Page, cmd: ResourceCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    reject_image::<R>(&cmd)?;
    let ctx = CliContext::load()?;
    run::<R>(ctx, page, cmd, None, output_format).await
}

/// `--image` only applies to product creation
pub fn reject_image<R: Resource>(cmd: &ResourceCommands) -> anyhow::Result<()> {
    if let ResourceCommands::Create { image: Some(path), .. } = cmd {
        anyhow::bail!("--image is only accepted by `products create`; {} has no image ({})", R::LABEL, path.display());
    }
    Ok(())
}

/// Navigate to `page`, mount the table for `R` and act on it
pub async fn run<R: Resource>(
    mut ctx: CliContext,
    page: Page,
    cmd: ResourceCommands,
    provisioning: Option<Arc<dyn Provisioning<R>>>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    if let ResourceCommands::Fields = cmd {
        return output_fields::<R>(&output_format);
    }

    if let Navigation::Redirect(to) = ctx.shell.navigate(page).await {
        anyhow::bail!("Not logged in ({}); run `stockroom auth login <username>`", to.path());
    }

    let mut table: ResourceTable<R> = ctx
        .shell
        .table()
        .ok_or_else(|| anyhow::anyhow!("{} is not available", page))?
        .with_page_size(ctx.config.ui.page_size);
    if let Some(hook) = provisioning {
        table = table.with_provisioning(hook);
    }

    if table.load().await.is_err() {
        return fail(&output_format, &table);
    }

    match cmd {
        ResourceCommands::List { sort, desc, page } => {
            if let Some(column) = sort {
                table.view_mut().sort_by(column, desc);
            }
            table.view_mut().page = page.saturating_sub(1);
            output_table(&output_format, R::PATH, R::COLUMNS, &table.visible())
        }
        ResourceCommands::Create { set, .. } => {
            table
                .open_create()
                .apply_assignments(set.iter().map(String::as_str))?;
            let result = table.submit_create().await;
            report(&output_format, &table, result)
        }
        ResourceCommands::Edit { id, set } => {
            table
                .open_edit(id)?
                .apply_assignments(set.iter().map(String::as_str))?;
            let result = table.submit_edit().await;
            report(&output_format, &table, result)
        }
        ResourceCommands::Delete { id, yes } => {
            table.stage_delete(id);
            if !yes && !confirm(&format!("Delete {} {}?", R::LABEL, id))? {
                table.cancel();
                return output_success(&output_format, "Delete cancelled", None);
            }
            let result = table.confirm_delete().await.map(|_| json!({ "id": id }));
            report(&output_format, &table, result)
        }
        ResourceCommands::Fields => output_fields::<R>(&output_format),
    }
}

/// Print the notification raised by the action; failures exit non-zero
fn report<R: Resource, T: serde::Serialize>(
    output_format: &OutputFormat,
    table: &ResourceTable<R>,
    result: Result<T, SubmitError>,
) -> anyhow::Result<()> {
    match result {
        Ok(record) => match table.notifier().current() {
            Some(notification) => output_notification(output_format, &notification, Some(json!({ "record": record }))),
            None => output_success(output_format, "Done", Some(json!({ "record": record }))),
        },
        Err(SubmitError::Form(e)) => {
            if let FormError::Invalid(issues) = &e {
                output_form_errors(output_format, issues)?;
            }
            Err(anyhow::anyhow!("{} form not submitted: {}", R::LABEL, e))
        }
        Err(_) => fail(output_format, table),
    }
}

fn fail<R: Resource>(output_format: &OutputFormat, table: &ResourceTable<R>) -> anyhow::Result<()> {
    let message = table
        .notifier()
        .current()
        .map(|n| n.message)
        .unwrap_or_else(|| format!("{} request failed", R::LABEL));
    if let OutputFormat::Json = output_format {
        output_error(output_format, &message, None)?;
    }
    Err(anyhow::anyhow!(message))
}

fn output_fields<R: Resource>(output_format: &OutputFormat) -> anyhow::Result<()> {
    let fields = R::fields();
    match output_format {
        OutputFormat::Json => {
            let described: Vec<_> = fields
                .iter()
                .map(|f| json!({ "name": f.name, "label": f.label, "required": f.required, "kind": format!("{:?}", f.kind) }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&json!({ "fields": described }))?);
        }
        OutputFormat::Text => {
            for f in &fields {
                let required = if f.required { " (required)" } else { "" };
                println!("{:<24} {}{} - {:?}", f.name, f.label, required, f.kind);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Supplier};

    #[test]
    fn image_is_refused_outside_products() {
        let with_image = ResourceCommands::Create {
            set: vec!["name=Acme".to_string()],
            image: Some(PathBuf::from("logo.png")),
        };
        let err = reject_image::<Supplier>(&with_image).unwrap_err();
        assert!(err.to_string().contains("products create"));
        assert!(reject_image::<Category>(&with_image).is_err());

        let plain = ResourceCommands::Create { set: vec!["name=Acme".to_string()], image: None };
        assert!(reject_image::<Supplier>(&plain).is_ok());
        assert!(reject_image::<Supplier>(&ResourceCommands::Fields).is_ok());
    }
}
