use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::endpoints;
use crate::form::{FieldKind, FieldSpec, FieldValues};
use crate::resource::{entry, Column, Resource};
use crate::types::RecordId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

impl Resource for Category {
    type Draft = CategoryDraft;

    const PATH: &'static str = endpoints::CATEGORIES;
    const LABEL: &'static str = "Category";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", "ID"),
        Column::new("name", "Category Name"),
        Column::new("description", "Description"),
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("name", "Category Name", FieldKind::Text).required(),
            FieldSpec::new("description", "Description", FieldKind::MultiLine),
        ]
    }

    fn edit_values(&self) -> FieldValues {
        FieldValues::from([
            ("name".to_string(), self.name.clone()),
            ("description".to_string(), entry(self.description.as_deref())),
        ])
    }
}
