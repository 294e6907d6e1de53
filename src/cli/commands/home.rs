use crate::cli::config::CliContext;
use crate::cli::utils::render_text_table;
use crate::cli::OutputFormat;
use crate::shell::{Navigation, Page};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let mut ctx = CliContext::load()?;

    if let Navigation::Redirect(to) = ctx.shell.navigate(Page::Home).await {
        anyhow::bail!("Not logged in ({}); run `stockroom auth login <username>`", to.path());
    }

    let stats = ctx.shell.dashboard().await;

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Text => {
            let rows = vec![
                vec!["Total Products".to_string(), stats.total_products.to_string()],
                vec!["Total Categories".to_string(), stats.total_categories.to_string()],
                vec![
                    format!("Low Stock (<= {})", ctx.config.ui.low_stock_threshold),
                    stats.low_stock.to_string(),
                ],
                vec![
                    "Inventory Value".to_string(),
                    format!("${:.2}", stats.total_inventory_value),
                ],
                vec!["Pending Shipments".to_string(), stats.pending_shipments.to_string()],
                vec!["Open Notifications".to_string(), stats.active_notifications.to_string()],
            ];
            print!("{}", render_text_table(&["Metric".to_string(), "Value".to_string()], &rows));
        }
    }
    Ok(())
}
