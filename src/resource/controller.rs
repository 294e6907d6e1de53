use serde_json::Value;
use std::sync::Arc;

use super::provision::Provisioning;
use super::staging::{Action, Staging, Target};
use super::view::{PageSlice, TableView};
use super::Resource;
use crate::api::{endpoints, ApiClient, ProvisionError};
use crate::error::ApiError;
use crate::form::{Form, FormError};
use crate::notify::Notifier;
use crate::types::{Operation, RecordId};

/// Why a dialog submission did not complete. Mutation failures have already
/// been reported through the notifier when this is returned; form errors have
/// not, they belong next to the fields.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("no {0} dialog is open")]
    NoDialog(&'static str),

    #[error("record {0} is not loaded")]
    MissingRecord(RecordId),
}

/// Fetch -> display -> mutate -> refetch cycle for one resource.
///
/// Rows are only replaced by a successful load, so a failed request leaves
/// the previous display intact. Dropping the table abandons any load still in
/// flight; its result is never applied.
pub struct ResourceTable<R: Resource> {
    client: ApiClient,
    notifier: Notifier,
    rows: Vec<R>,
    loading: bool,
    create_form: Option<Form>,
    edit_form: Option<Form>,
    staging: Staging,
    provisioning: Option<Arc<dyn Provisioning<R>>>,
    view: TableView,
}

impl<R: Resource> ResourceTable<R> {
    pub fn new(client: ApiClient, notifier: Notifier) -> Self {
        Self {
            client,
            notifier,
            rows: Vec::new(),
            loading: true,
            create_form: None,
            edit_form: None,
            staging: Staging::Idle,
            provisioning: None,
            view: TableView::new(crate::config::config().ui.page_size),
        }
    }

    /// Construct and run the first load
    pub async fn mount(client: ApiClient, notifier: Notifier) -> Self {
        let mut table = Self::new(client, notifier);
        let _ = table.load().await;
        table
    }

    pub fn with_provisioning(mut self, hook: Arc<dyn Provisioning<R>>) -> Self {
        self.provisioning = Some(hook);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.view = TableView::new(page_size);
        self
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn row(&self, id: RecordId) -> Option<&R> {
        self.rows.iter().find(|r| r.id() == id)
    }

    /// True until the first load settles
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn staging(&self) -> Staging {
        self.staging
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TableView {
        &mut self.view
    }

    /// Current page after sorting
    pub fn visible(&self) -> PageSlice<'_, R> {
        self.view.apply(&self.rows)
    }

    // -----------------------------------------------------------------------
    // Collection operations
    // -----------------------------------------------------------------------

    async fn fetch(&self) -> Result<Vec<R>, ApiError> {
        self.client.get_json(&endpoints::collection(R::PATH)).await
    }

    /// Replace the rows with the server's collection. A failure is reported
    /// and the previous rows stay.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        let result = self.fetch().await;
        self.loading = false;

        match result {
            Ok(rows) => {
                tracing::debug!("Loaded {} {} rows", rows.len(), R::LABEL);
                self.rows = rows;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", R::PATH, e);
                self.notifier.error(R::failure_message(Operation::Select));
                Err(e)
            }
        }
    }

    /// Refetch after a mutation; the mutation's own notification covers the
    /// outcome, so a failed refetch is only logged.
    async fn refetch(&mut self) {
        match self.fetch().await {
            Ok(rows) => self.rows = rows,
            Err(e) => tracing::warn!("Refetch of {} after mutation failed: {}", R::PATH, e),
        }
        self.loading = false;
    }

    /// POST the draft and refetch. The created record comes from the response
    /// body, else from the refetched rows; `None` only when neither identifies
    /// it. An unreadable body never turns an accepted create into a failure.
    pub async fn create(&mut self, draft: &R::Draft) -> Result<Option<R>, ApiError> {
        let before: Vec<RecordId> = self.rows.iter().map(|r| r.id()).collect();
        let value = self.client.post_json(&endpoints::collection(R::PATH), draft).await?;
        self.refetch().await;

        match serde_json::from_value::<R>(value.clone()) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!("{} created but the response could not be read: {}", R::LABEL, e);
                let created = match value.get("id").and_then(Value::as_i64) {
                    Some(id) => self.row(id),
                    None => {
                        let mut fresh = self.rows.iter().filter(|r| !before.contains(&r.id()));
                        match (fresh.next(), fresh.next()) {
                            (Some(record), None) => Some(record),
                            _ => None,
                        }
                    }
                };
                Ok(created.cloned())
            }
        }
    }

    pub async fn update(&mut self, id: RecordId, draft: &R::Draft) -> Result<R, ApiError> {
        let value = self.client.put_json(&endpoints::member(R::PATH, id), draft).await?;
        self.refetch().await;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn remove(&mut self, id: RecordId) -> Result<(), ApiError> {
        self.client.delete(&endpoints::member(R::PATH, id)).await?;
        self.refetch().await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Create dialog
    // -----------------------------------------------------------------------

    /// Open the create dialog with a fresh draft
    pub fn open_create(&mut self) -> &mut Form {
        self.create_form.insert(Form::new(R::fields()))
    }

    /// Cancel discards the draft
    pub fn close_create(&mut self) {
        self.create_form = None;
    }

    pub fn create_form(&self) -> Option<&Form> {
        self.create_form.as_ref()
    }

    pub fn create_form_mut(&mut self) -> Option<&mut Form> {
        self.create_form.as_mut()
    }

    /// Submit the create dialog. On success the dialog closes; on a failed
    /// request it stays open with the draft intact.
    pub async fn submit_create(&mut self) -> Result<Option<R>, SubmitError> {
        let form = self.create_form.as_ref().ok_or(SubmitError::NoDialog("create"))?;
        let draft: R::Draft = form.submit()?;
        R::check(&draft)?;

        if let Some(hook) = self.provisioning.clone() {
            if let Err(e) = hook.before_create(&draft).await {
                match &e {
                    ProvisionError::Precondition(message) => {
                        self.notifier.warning(message.clone());
                    }
                    _ => {
                        self.notifier.error(hook.abort_message());
                    }
                }
                return Err(e.into());
            }
        }

        match self.create(&draft).await {
            Ok(record) => {
                self.notifier.success(R::success_message(Operation::Create));
                self.create_form = None;
                Ok(record)
            }
            Err(e) => {
                self.notifier
                    .error(e.user_message(&R::failure_message(Operation::Create)));
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Edit dialog
    // -----------------------------------------------------------------------

    /// Stage `id` for editing with a form prefilled from the loaded row
    pub fn open_edit(&mut self, id: RecordId) -> Result<&mut Form, SubmitError> {
        let values = self.row(id).ok_or(SubmitError::MissingRecord(id))?.edit_values();
        let mut form = Form::new(R::fields());
        form.reset(values);

        self.staging = Staging::Staged(Target { id, action: Action::Edit });
        Ok(self.edit_form.insert(form))
    }

    pub fn edit_form(&self) -> Option<&Form> {
        self.edit_form.as_ref()
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut Form> {
        self.edit_form.as_mut()
    }

    /// Submit the edit dialog. Invalid fields keep it open; once the request
    /// is sent the dialog closes whatever the outcome.
    pub async fn submit_edit(&mut self) -> Result<R, SubmitError> {
        let target = self.staging.staged(Action::Edit).ok_or(SubmitError::NoDialog("edit"))?;
        let form = self.edit_form.as_ref().ok_or(SubmitError::NoDialog("edit"))?;
        let draft: R::Draft = form.submit()?;
        R::check(&draft)?;

        self.staging = Staging::Confirming(target);
        let result = self.update(target.id, &draft).await;

        match &result {
            Ok(_) => {
                self.notifier.success(R::success_message(Operation::Update));
            }
            Err(e) => {
                self.notifier
                    .error(e.user_message(&R::failure_message(Operation::Update)));
            }
        }

        self.staging = Staging::Idle;
        self.edit_form = None;
        result.map_err(SubmitError::from)
    }

    // -----------------------------------------------------------------------
    // Delete confirmation
    // -----------------------------------------------------------------------

    /// Open the delete confirmation for `id`; the row need not be loaded
    pub fn stage_delete(&mut self, id: RecordId) {
        self.edit_form = None;
        self.staging = Staging::Staged(Target { id, action: Action::Delete });
    }

    /// Close any edit or delete dialog without acting
    pub fn cancel(&mut self) {
        self.edit_form = None;
        self.staging = Staging::Idle;
    }

    /// Delete the staged record. Exactly one notification fires and the
    /// confirmation closes regardless of the outcome.
    pub async fn confirm_delete(&mut self) -> Result<(), SubmitError> {
        let target = self
            .staging
            .staged(Action::Delete)
            .ok_or(SubmitError::NoDialog("delete"))?;
        self.staging = Staging::Confirming(target);

        let record = self.row(target.id).cloned();
        let result = self.client.delete(&endpoints::member(R::PATH, target.id)).await;

        let outcome = match result {
            Ok(()) => {
                let cleanup = match (&self.provisioning, &record) {
                    (Some(hook), Some(record)) => hook.after_remove(record).await.err().map(|e| {
                        tracing::warn!("Cleanup after deleting {} {} failed: {}", R::LABEL, target.id, e);
                        hook.cleanup_message()
                    }),
                    _ => None,
                };
                self.refetch().await;
                match cleanup {
                    Some(message) => self.notifier.warning(message),
                    None => self.notifier.success(R::success_message(Operation::Delete)),
                };
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .error(e.user_message(&R::failure_message(Operation::Delete)));
                Err(e.into())
            }
        };

        self.staging = Staging::Idle;
        outcome
    }
}
