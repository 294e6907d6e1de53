//! Hooks that keep the external image/bucket storage in step with a table.
//!
//! `before_create` runs ahead of the primary POST and aborts it on failure.
//! `after_remove` runs once the primary DELETE succeeded; its failure is only
//! reported. Neither side is rolled back when the other fails.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use std::sync::Mutex;

use super::Resource;
use crate::api::{endpoints, ApiClient, ProvisionError, ProvisioningClient};
use crate::models::{Category, CategoryDraft, Product, ProductDraft};
use crate::types::{lock, RecordId};

#[async_trait]
pub trait Provisioning<R: Resource>: Send + Sync {
    async fn before_create(&self, _draft: &R::Draft) -> Result<(), ProvisionError> {
        Ok(())
    }

    async fn after_remove(&self, _record: &R) -> Result<(), ProvisionError> {
        Ok(())
    }

    /// Shown when `before_create` fails for a reason other than a precondition
    fn abort_message(&self) -> String {
        format!("{} storage could not be prepared, form not submitted", R::LABEL)
    }

    /// Shown when `after_remove` fails
    fn cleanup_message(&self) -> String {
        format!("{} deleted, but its stored files could not be removed", R::LABEL)
    }
}

/// One storage bucket per category
pub struct BucketProvisioning {
    provisioner: ProvisioningClient,
}

impl BucketProvisioning {
    pub fn new(provisioner: ProvisioningClient) -> Self {
        Self { provisioner }
    }
}

#[async_trait]
impl Provisioning<Category> for BucketProvisioning {
    async fn before_create(&self, draft: &CategoryDraft) -> Result<(), ProvisionError> {
        self.provisioner.create_bucket(&draft.name).await.map(|_| ())
    }

    async fn after_remove(&self, record: &Category) -> Result<(), ProvisionError> {
        self.provisioner.delete_bucket(&record.name).await.map(|_| ())
    }
}

/// Uploads the staged product image into its category's bucket
pub struct ProductImageUpload {
    provisioner: ProvisioningClient,
    client: ApiClient,
    image: Mutex<Option<String>>,
}

impl ProductImageUpload {
    pub const MISSING_IMAGE: &'static str = "Please upload a Product image first";
    pub const MISSING_CATEGORY: &'static str = "Please select a Product category first";

    pub fn new(provisioner: ProvisioningClient, client: ApiClient) -> Self {
        Self {
            provisioner,
            client,
            image: Mutex::new(None),
        }
    }

    /// Stage raw image bytes for the next create
    pub fn stage_bytes(&self, bytes: &[u8]) {
        *lock(&self.image) = Some(STANDARD.encode(bytes));
    }

    pub fn stage_file(&self, path: &Path) -> std::io::Result<()> {
        let bytes = std::fs::read(path)?;
        self.stage_bytes(&bytes);
        Ok(())
    }

    pub fn has_image(&self) -> bool {
        lock(&self.image).is_some()
    }

    async fn category_name(&self, id: RecordId) -> Result<String, ProvisionError> {
        let category: Category = self
            .client
            .get_json(&endpoints::member(endpoints::CATEGORIES, id))
            .await?;
        Ok(category.name)
    }
}

#[async_trait]
impl Provisioning<Product> for ProductImageUpload {
    async fn before_create(&self, draft: &ProductDraft) -> Result<(), ProvisionError> {
        let image = lock(&self.image)
            .clone()
            .ok_or_else(|| ProvisionError::Precondition(Self::MISSING_IMAGE.to_string()))?;
        let category_id = draft
            .category_id
            .ok_or_else(|| ProvisionError::Precondition(Self::MISSING_CATEGORY.to_string()))?;

        let category = self.category_name(category_id).await?;
        self.provisioner.upload_image(&category, &draft.name, &image).await?;

        // Consumed by this create
        *lock(&self.image) = None;
        Ok(())
    }

    async fn after_remove(&self, record: &Product) -> Result<(), ProvisionError> {
        let Some(category) = record.category_name() else {
            tracing::debug!("Product '{}' has no category; no image to remove", record.name);
            return Ok(());
        };
        self.provisioner.delete_image(category, &record.name).await.map(|_| ())
    }

    fn abort_message(&self) -> String {
        "Image upload failed, form not submitted".to_string()
    }
}
