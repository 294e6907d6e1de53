use serde::{Deserialize, Serialize};

use super::{wire_name, Choices};
use crate::api::endpoints;
use crate::form::{FieldKind, FieldSpec, FieldValues};
use crate::resource::{entry, Column, Resource};
use crate::types::RecordId;

/// Delivery zones are numbered 1 through 24
pub const DELIVERY_ZONES: (i64, i64) = (1, 24);

/// Logistics company delivering shipment orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentPartner {
    pub id: RecordId,
    pub logistics_company: String,
    pub contact_person: String,
    pub email: String,
    #[serde(default)]
    pub delivery_zone: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentPartnerDraft {
    pub logistics_company: String,
    pub contact_person: String,
    pub email: String,
    pub delivery_zone: Vec<i64>,
}

impl Resource for ShipmentPartner {
    type Draft = ShipmentPartnerDraft;

    const PATH: &'static str = endpoints::SHIPPING_PARTNERS;
    const LABEL: &'static str = "Delivery Partner";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", "ID"),
        Column::new("logistics_company", "Logistics Company"),
        Column::new("contact_person", "Contact Person"),
        Column::new("email", "Email"),
        Column::new("delivery_zone", "Delivery Zones"),
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn fields() -> Vec<FieldSpec> {
        let (min, max) = DELIVERY_ZONES;
        vec![
            FieldSpec::new("logistics_company", "Logistics Company", FieldKind::Text).required(),
            FieldSpec::new("contact_person", "Contact Person", FieldKind::Text).required(),
            FieldSpec::new("email", "Email", FieldKind::Email).required(),
            FieldSpec::new("delivery_zone", "Delivery Zones", FieldKind::IntegerSet { min, max }),
        ]
    }

    fn edit_values(&self) -> FieldValues {
        let zones = self
            .delivery_zone
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        FieldValues::from([
            ("logistics_company".to_string(), self.logistics_company.clone()),
            ("contact_person".to_string(), self.contact_person.clone()),
            ("email".to_string(), self.email.clone()),
            ("delivery_zone".to_string(), zones),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Delivered,
    Canceled,
}

impl Choices for ShipmentStatus {
    const CHOICES: &'static [&'static str] = &["PENDING", "IN_TRANSIT", "DELIVERED", "CANCELED"];
}

/// Outbound shipment of a purchase order through a partner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentOrder {
    pub id: RecordId,
    #[serde(default)]
    pub partner_id: Option<RecordId>,
    #[serde(default)]
    pub purchase_order_id: Option<RecordId>,
    pub status: ShipmentStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentOrderDraft {
    pub partner_id: Option<RecordId>,
    pub purchase_order_id: Option<RecordId>,
    pub status: ShipmentStatus,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}

impl Resource for ShipmentOrder {
    type Draft = ShipmentOrderDraft;

    const PATH: &'static str = endpoints::SHIPMENT_ORDERS;
    const LABEL: &'static str = "Shipment Order";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", "ID"),
        Column::new("partner_id", "Partner"),
        Column::new("purchase_order_id", "Purchase Order"),
        Column::new("status", "Status"),
        Column::new("tracking_number", "Tracking Number"),
        Column::new("notes", "Notes"),
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("partner_id", "Partner", FieldKind::ForeignKey),
            FieldSpec::new("purchase_order_id", "Purchase Order", FieldKind::ForeignKey),
            FieldSpec::new("status", "Status", FieldKind::Choice(ShipmentStatus::CHOICES)).required(),
            FieldSpec::new("tracking_number", "Tracking Number", FieldKind::Text),
            FieldSpec::new("notes", "Notes", FieldKind::MultiLine),
        ]
    }

    fn edit_values(&self) -> FieldValues {
        FieldValues::from([
            ("partner_id".to_string(), entry(self.partner_id)),
            ("purchase_order_id".to_string(), entry(self.purchase_order_id)),
            ("status".to_string(), wire_name(&self.status)),
            ("tracking_number".to_string(), entry(self.tracking_number.as_deref())),
            ("notes".to_string(), entry(self.notes.as_deref())),
        ])
    }
}
