use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{wire_name, Choices, Product, Supplier};
use crate::api::endpoints;
use crate::form::{FieldKind, FieldSpec, FieldValues};
use crate::resource::{entry, Column, Resource};
use crate::types::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PurchaseOrderStatus {
    Pending,
    Ordered,
    Received,
    Canceled,
}

impl Choices for PurchaseOrderStatus {
    const CHOICES: &'static [&'static str] = &["PENDING", "ORDERED", "RECEIVED", "CANCELED"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: RecordId,
    #[serde(default)]
    pub supplier: Option<Supplier>,
    #[serde(default)]
    pub product: Option<Product>,
    /// Some backends echo the write-only ids back; used when the nested
    /// record is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<RecordId>,
    pub quantity: i64,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expected_delivery_date: Option<NaiveDate>,
    pub status: PurchaseOrderStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub batch_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderDraft {
    pub supplier_id: RecordId,
    pub product_id: RecordId,
    pub quantity: i64,
    pub expected_delivery_date: Option<NaiveDate>,
    pub status: PurchaseOrderStatus,
    pub notes: Option<String>,
}

impl Resource for PurchaseOrder {
    type Draft = PurchaseOrderDraft;

    const PATH: &'static str = endpoints::PURCHASE_ORDERS;
    const LABEL: &'static str = "Purchase Order";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", "ID"),
        Column::new("supplier.name", "Supplier"),
        Column::new("product.name", "Product"),
        Column::new("quantity", "Quantity"),
        Column::new("order_date", "Order Date"),
        Column::new("expected_delivery_date", "Expected Delivery"),
        Column::new("status", "Status"),
        Column::new("batch_id", "Batch"),
        Column::new("notes", "Notes"),
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("supplier_id", "Supplier", FieldKind::ForeignKey).required(),
            FieldSpec::new("product_id", "Product", FieldKind::ForeignKey).required(),
            FieldSpec::new("quantity", "Quantity", FieldKind::Integer { min: Some(1) }).required(),
            FieldSpec::new("expected_delivery_date", "Expected Delivery", FieldKind::Date),
            FieldSpec::new("status", "Status", FieldKind::Choice(PurchaseOrderStatus::CHOICES)).required(),
            FieldSpec::new("notes", "Notes", FieldKind::MultiLine),
        ]
    }

    fn edit_values(&self) -> FieldValues {
        let supplier = self.supplier.as_ref().map(|s| s.id).or(self.supplier_id);
        let product = self.product.as_ref().map(|p| p.id).or(self.product_id);

        FieldValues::from([
            ("supplier_id".to_string(), entry(supplier)),
            ("product_id".to_string(), entry(product)),
            ("quantity".to_string(), self.quantity.to_string()),
            ("expected_delivery_date".to_string(), entry(self.expected_delivery_date)),
            ("status".to_string(), wire_name(&self.status)),
            ("notes".to_string(), entry(self.notes.as_deref())),
        ])
    }
}
