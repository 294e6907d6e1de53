//! Typed records and drafts for every collection the backend exposes.
//!
//! Records mirror the server's read shape (related records arrive nested);
//! drafts mirror the write shape (related records are plain ids).

pub mod category;
pub mod inventory;
pub mod product;
pub mod purchase_order;
pub mod shipment;
pub mod supplier;
pub mod ticket;

pub use category::{Category, CategoryDraft};
pub use inventory::{InventoryBatch, InventoryBatchDraft, InventoryStatus};
pub use product::{Product, ProductDraft};
pub use purchase_order::{PurchaseOrder, PurchaseOrderDraft, PurchaseOrderStatus};
pub use shipment::{ShipmentOrder, ShipmentOrderDraft, ShipmentPartner, ShipmentPartnerDraft, ShipmentStatus};
pub use supplier::{Supplier, SupplierDraft};
pub use ticket::{Ticket, TicketDraft, TicketStatus};

/// Upper-case wire names of a status enum, in declaration order
pub trait Choices {
    const CHOICES: &'static [&'static str];
}

/// Wire name of a unit enum variant, e.g. `"RECEIVED"`
pub(crate) fn wire_name<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
