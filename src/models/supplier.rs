use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::endpoints;
use crate::form::{FieldKind, FieldSpec, FieldValues};
use crate::resource::{entry, Column, Resource};
use crate::types::RecordId;

/// Phone numbers are stored as bare digits, country code included
pub const PHONE_MAX_DIGITS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierDraft {
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
}

impl Resource for Supplier {
    type Draft = SupplierDraft;

    const PATH: &'static str = endpoints::SUPPLIERS;
    const LABEL: &'static str = "Supplier";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", "ID"),
        Column::new("name", "Supplier Name"),
        Column::new("contact_email", "Email"),
        Column::new("contact_phone", "Phone"),
        Column::new("address", "Address"),
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("name", "Supplier Name", FieldKind::Text).required(),
            FieldSpec::new("contact_email", "Email", FieldKind::Email),
            FieldSpec::new("contact_phone", "Phone", FieldKind::Phone { max_digits: PHONE_MAX_DIGITS }),
            FieldSpec::new("address", "Address", FieldKind::MultiLine),
        ]
    }

    fn edit_values(&self) -> FieldValues {
        FieldValues::from([
            ("name".to_string(), self.name.clone()),
            ("contact_email".to_string(), entry(self.contact_email.as_deref())),
            ("contact_phone".to_string(), entry(self.contact_phone.as_deref())),
            ("address".to_string(), entry(self.address.as_deref())),
        ])
    }
}
