use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{wire_name, Choices};
use crate::api::endpoints;
use crate::form::{FieldKind, FieldSpec, FieldValues};
use crate::resource::{entry, Column, Resource};
use crate::types::{Operation, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    InProgress,
    Closed,
}

impl Choices for TicketStatus {
    const CHOICES: &'static [&'static str] = &["OPEN", "IN_PROGRESS", "CLOSED"];
}

/// Operational ticket raised by the backend, e.g. for low stock or expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: RecordId,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: TicketStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketDraft {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: TicketStatus,
    pub batch_id: Option<String>,
    pub product_name: Option<String>,
    pub notes: Option<String>,
}

impl Resource for Ticket {
    type Draft = TicketDraft;

    const PATH: &'static str = endpoints::NOTIFICATIONS;
    const LABEL: &'static str = "Notification";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", "ID"),
        Column::new("batch_id", "Batch"),
        Column::new("created_at", "Created"),
        Column::new("updated_at", "Updated"),
        Column::new("status", "Status"),
        Column::new("product_name", "Product"),
        Column::new("type", "Type"),
        Column::new("notes", "Notes"),
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("type", "Type", FieldKind::Text).required(),
            FieldSpec::new("status", "Status", FieldKind::Choice(TicketStatus::CHOICES)).required(),
            FieldSpec::new("batch_id", "Batch", FieldKind::Text),
            FieldSpec::new("product_name", "Product", FieldKind::Text),
            FieldSpec::new("notes", "Notes", FieldKind::MultiLine),
        ]
    }

    fn edit_values(&self) -> FieldValues {
        FieldValues::from([
            ("type".to_string(), self.kind.clone()),
            ("status".to_string(), wire_name(&self.status)),
            ("batch_id".to_string(), entry(self.batch_id.as_deref())),
            ("product_name".to_string(), entry(self.product_name.as_deref())),
            ("notes".to_string(), entry(self.notes.as_deref())),
        ])
    }

    // Tickets are only ever edited to move their status along
    fn success_message(op: Operation) -> String {
        match op {
            Operation::Update => "Status updated successfully!".to_string(),
            other => other.success_message(Self::LABEL),
        }
    }

    fn failure_message(op: Operation) -> String {
        match op {
            Operation::Update => "Error updating status. Please try again.".to_string(),
            other => other.failure_message(Self::LABEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Form;
    use serde_json::json;

    #[test]
    fn status_edit_resends_type() {
        let ticket: Ticket = serde_json::from_value(json!({
            "id": 1, "type": "LOW_STOCK", "status": "OPEN", "product_name": "Milk"
        }))
        .unwrap();

        let mut form = Form::new(Ticket::fields());
        form.reset(ticket.edit_values());
        form.set("status", "in_progress").unwrap();

        let body = serde_json::to_value(form.submit::<TicketDraft>().unwrap()).unwrap();
        assert_eq!(body["type"], json!("LOW_STOCK"));
        assert_eq!(body["status"], json!("IN_PROGRESS"));
        assert_eq!(body["product_name"], json!("Milk"));
        assert_eq!(Ticket::success_message(Operation::Update), "Status updated successfully!");
    }
}
