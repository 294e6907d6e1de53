use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Category;
use crate::api::endpoints;
use crate::form::{FieldKind, FieldSpec, FieldValues};
use crate::resource::{entry, Column, Resource};
use crate::types::RecordId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    pub price: Decimal,
    pub stock_quantity: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<RecordId>,
    pub price: Decimal,
    pub stock_quantity: i64,
}

impl Resource for Product {
    type Draft = ProductDraft;

    const PATH: &'static str = endpoints::PRODUCTS;
    const LABEL: &'static str = "Product";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", "ID"),
        Column::new("name", "Product Name"),
        Column::new("description", "Description"),
        Column::new("price", "Price"),
        Column::new("stock_quantity", "Stock Quantity"),
        Column::new("category.name", "Category"),
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("name", "Product Name", FieldKind::Text).required(),
            FieldSpec::new("description", "Description", FieldKind::MultiLine),
            FieldSpec::new("category_id", "Category", FieldKind::ForeignKey),
            FieldSpec::new("price", "Price", FieldKind::Decimal { min: Some(Decimal::ZERO) }).required(),
            FieldSpec::new("stock_quantity", "Stock Quantity", FieldKind::Integer { min: Some(0) }).required(),
        ]
    }

    fn edit_values(&self) -> FieldValues {
        FieldValues::from([
            ("name".to_string(), self.name.clone()),
            ("description".to_string(), entry(self.description.as_deref())),
            ("category_id".to_string(), entry(self.category.as_ref().map(|c| c.id))),
            ("price".to_string(), self.price.to_string()),
            ("stock_quantity".to_string(), self.stock_quantity.to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Form;
    use serde_json::json;

    #[test]
    fn reads_nested_category_and_decimal_price() {
        let product: Product = serde_json::from_value(json!({
            "id": 2,
            "name": "Milk",
            "description": null,
            "category": {"id": 4, "name": "Dairy"},
            "price": "1.20",
            "stock_quantity": 30,
            "created_at": "2024-11-02T10:15:00Z"
        }))
        .unwrap();

        assert_eq!(product.category_name(), Some("Dairy"));
        assert_eq!(product.price.to_string(), "1.20");
        assert_eq!(product.edit_values()["category_id"], "4");
    }

    #[test]
    fn blank_category_serializes_as_null() {
        let mut form = Form::new(Product::fields());
        form.apply_assignments(["name=Loose tea", "price=3.5", "stock_quantity=8"]).unwrap();

        let draft: ProductDraft = form.submit().unwrap();
        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["category_id"], json!(null));
        assert_eq!(body["price"], json!("3.5"));
    }
}
