//! Generic fetch -> display -> mutate -> refetch engine shared by every page.
//!
//! A [`Resource`] describes one REST collection: where it lives, how its
//! records and drafts are shaped, which columns a table shows and which form
//! fields its dialogs bind. [`ResourceTable`] drives the cycle for any of them.

pub mod controller;
pub mod provision;
pub mod staging;
pub mod view;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use crate::form::{FieldSpec, FieldValues, FormError};
use crate::types::{Operation, RecordId};

pub use controller::{ResourceTable, SubmitError};
pub use provision::{BucketProvisioning, ProductImageUpload, Provisioning};
pub use staging::{Action, Staging, Target};
pub use view::{PageSlice, SortSpec, TableView};

/// One table column; `key` is a dotted path into the record's JSON form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub header: &'static str,
}

impl Column {
    pub const fn new(key: &'static str, header: &'static str) -> Self {
        Self { key, header }
    }
}

/// A server-managed collection. Implemented on the record type.
pub trait Resource: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Write shape sent on create and update. Foreign keys are plain ids and
    /// serialize as `null` when unset.
    type Draft: Serialize + DeserializeOwned + Debug + Send + Sync + 'static;

    /// Collection path under the API root, without slashes
    const PATH: &'static str;
    /// Human name used in notifications
    const LABEL: &'static str;
    const COLUMNS: &'static [Column];

    fn id(&self) -> RecordId;

    /// Fields bound by the create and edit dialogs
    fn fields() -> Vec<FieldSpec>;

    /// Entries that prefill the edit dialog. Every field is included so the
    /// update re-sends unchanged siblings.
    fn edit_values(&self) -> FieldValues;

    /// Cross-field constraints checked after coercion
    fn check(_draft: &Self::Draft) -> Result<(), FormError> {
        Ok(())
    }

    fn success_message(op: Operation) -> String {
        op.success_message(Self::LABEL)
    }

    fn failure_message(op: Operation) -> String {
        op.failure_message(Self::LABEL)
    }
}

/// Prefill helper: `None` becomes a blank entry
pub(crate) fn entry<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
