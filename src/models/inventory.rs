use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{wire_name, Choices, Product};
use crate::api::endpoints;
use crate::form::{FieldKind, FieldSpec, FieldValues, FormError};
use crate::resource::{entry, Column, Resource};
use crate::types::RecordId;

/// Kind of stock movement a batch records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InventoryStatus {
    Add,
    Remove,
    Return,
    Adjust,
}

impl Choices for InventoryStatus {
    const CHOICES: &'static [&'static str] = &["ADD", "REMOVE", "RETURN", "ADJUST"];
}

impl InventoryStatus {
    /// Movements that bring stock in
    pub fn is_inbound(&self) -> bool {
        matches!(self, InventoryStatus::Add | InventoryStatus::Return)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryBatch {
    pub id: RecordId,
    #[serde(default)]
    pub product: Option<Product>,
    pub quantity: i64,
    pub status: InventoryStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryBatchDraft {
    pub product_id: RecordId,
    pub quantity: i64,
    pub status: InventoryStatus,
    pub notes: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl Resource for InventoryBatch {
    type Draft = InventoryBatchDraft;

    const PATH: &'static str = endpoints::INVENTORY;
    const LABEL: &'static str = "Inventory";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", "ID"),
        Column::new("batch_id", "Batch"),
        Column::new("product.name", "Product"),
        Column::new("created_at", "Created"),
        Column::new("status", "Status"),
        Column::new("quantity", "Quantity"),
        Column::new("expiry_date", "Expiry Date"),
        Column::new("notes", "Notes"),
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("product_id", "Product", FieldKind::ForeignKey).required(),
            FieldSpec::new("quantity", "Quantity", FieldKind::Integer { min: None }).required(),
            FieldSpec::new("status", "Status", FieldKind::Choice(InventoryStatus::CHOICES)).required(),
            FieldSpec::new("notes", "Notes", FieldKind::MultiLine),
            FieldSpec::new("expiry_date", "Expiry Date", FieldKind::Date),
        ]
    }

    fn edit_values(&self) -> FieldValues {
        FieldValues::from([
            ("product_id".to_string(), entry(self.product.as_ref().map(|p| p.id))),
            ("quantity".to_string(), self.quantity.to_string()),
            ("status".to_string(), wire_name(&self.status)),
            ("notes".to_string(), entry(self.notes.as_deref())),
            ("expiry_date".to_string(), entry(self.expiry_date)),
        ])
    }

    /// The backend applies removals by magnitude; additions must be positive
    fn check(draft: &InventoryBatchDraft) -> Result<(), FormError> {
        if draft.quantity == 0 {
            return Err(FormError::Constraint("Quantity must not be zero.".to_string()));
        }
        if draft.status.is_inbound() && draft.quantity < 0 {
            return Err(FormError::Constraint(
                "ADD and RETURN batches need a positive quantity.".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Form;

    #[test]
    fn inbound_batches_need_positive_quantity() {
        let mut form = Form::new(InventoryBatch::fields());
        form.apply_assignments(["product_id=3", "quantity=-4", "status=return"]).unwrap();
        let draft: InventoryBatchDraft = form.submit().unwrap();
        assert_eq!(draft.status, InventoryStatus::Return);
        assert!(matches!(InventoryBatch::check(&draft), Err(FormError::Constraint(_))));

        form.set("status", "REMOVE").unwrap();
        let draft: InventoryBatchDraft = form.submit().unwrap();
        assert!(InventoryBatch::check(&draft).is_ok());
    }

    #[test]
    fn edit_values_round_trip_through_form() {
        let batch: InventoryBatch = serde_json::from_value(serde_json::json!({
            "id": 9,
            "product": {"id": 3, "name": "Milk", "price": "1.20", "stock_quantity": 5},
            "quantity": 12,
            "status": "ADD",
            "batch_id": "PO-4-20250101",
            "expiry_date": "2026-01-01"
        }))
        .unwrap();

        let mut form = Form::new(InventoryBatch::fields());
        form.reset(batch.edit_values());
        let draft: InventoryBatchDraft = form.submit().unwrap();
        assert_eq!(draft.product_id, 3);
        assert_eq!(draft.expiry_date, NaiveDate::from_ymd_opt(2026, 1, 1));
    }
}
