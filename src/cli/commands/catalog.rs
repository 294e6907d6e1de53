//! Categories and products: the two tables backed by external storage.

use std::sync::Arc;

use super::resource::{self, ResourceCommands};
use crate::cli::config::CliContext;
use crate::cli::OutputFormat;
use crate::models::{Category, Product};
use crate::resource::{BucketProvisioning, ProductImageUpload, Provisioning};
use crate::shell::Page;

pub async fn handle_categories(cmd: ResourceCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    resource::reject_image::<Category>(&cmd)?;
    let ctx = CliContext::load()?;

    let hook = match ctx.provisioner()? {
        Some(provisioner) => Some(Arc::new(BucketProvisioning::new(provisioner)) as Arc<dyn Provisioning<Category>>),
        None => {
            tracing::debug!("No provisioning endpoint configured; category buckets are not managed");
            None
        }
    };

    resource::run::<Category>(ctx, Page::Products, cmd, hook, output_format).await
}

pub async fn handle_products(cmd: ResourceCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load()?;
    let image = match &cmd {
        ResourceCommands::Create { image, .. } => image.clone(),
        _ => None,
    };

    let hook = match ctx.provisioner()? {
        Some(provisioner) => {
            let upload = ProductImageUpload::new(provisioner, ctx.client().clone());
            if let Some(path) = &image {
                upload
                    .stage_file(path)
                    .map_err(|e| anyhow::anyhow!("Cannot read image {}: {}", path.display(), e))?;
            }
            Some(Arc::new(upload) as Arc<dyn Provisioning<Product>>)
        }
        None if image.is_some() => {
            anyhow::bail!("--image requires a provisioning endpoint (STOCKROOM_PROVISION_URL)");
        }
        None => None,
    };

    resource::run::<Product>(ctx, Page::Products, cmd, hook, output_format).await
}
