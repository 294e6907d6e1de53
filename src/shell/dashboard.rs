use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::{endpoints, ApiClient};
use crate::error::ApiError;
use crate::models::{Category, InventoryBatch, Product, ShipmentOrder, ShipmentStatus, Ticket, TicketStatus};

/// Summary cards on the home page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_categories: usize,
    /// Inventory batches at or below the low-stock threshold
    pub low_stock: usize,
    pub total_inventory_value: Decimal,
    pub pending_shipments: usize,
    pub active_notifications: usize,
}

impl DashboardStats {
    pub fn compute(
        products: &[Product],
        categories: &[Category],
        inventory: &[InventoryBatch],
        shipments: &[ShipmentOrder],
        tickets: &[Ticket],
        low_stock_threshold: i64,
    ) -> Self {
        let total_inventory_value = inventory.iter().fold(Decimal::ZERO, |total, batch| {
            let Some(product) = &batch.product else {
                return total;
            };
            match Decimal::from(batch.quantity)
                .checked_mul(product.price)
                .and_then(|value| total.checked_add(value))
            {
                Some(sum) => sum,
                None => {
                    tracing::warn!("Inventory batch {} overflows the stock value; skipped", batch.id);
                    total
                }
            }
        });

        Self {
            total_products: products.len(),
            total_categories: categories.len(),
            low_stock: inventory.iter().filter(|b| b.quantity <= low_stock_threshold).count(),
            total_inventory_value,
            pending_shipments: shipments.iter().filter(|s| s.status == ShipmentStatus::Pending).count(),
            active_notifications: tickets.iter().filter(|t| t.status == TicketStatus::Open).count(),
        }
    }

    /// Collections are fetched one after another; any failure leaves every
    /// figure at zero.
    pub async fn load(client: &ApiClient, low_stock_threshold: i64) -> Self {
        match Self::try_load(client, low_stock_threshold).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!("Error fetching dashboard stats: {}", e);
                Self::default()
            }
        }
    }

    async fn try_load(client: &ApiClient, low_stock_threshold: i64) -> Result<Self, ApiError> {
        let products: Vec<Product> = client.get_json(&endpoints::collection(endpoints::PRODUCTS)).await?;
        let categories: Vec<Category> = client.get_json(&endpoints::collection(endpoints::CATEGORIES)).await?;
        let inventory: Vec<InventoryBatch> = client.get_json(&endpoints::collection(endpoints::INVENTORY)).await?;
        let shipments: Vec<ShipmentOrder> = client
            .get_json(&endpoints::collection(endpoints::SHIPMENT_ORDERS))
            .await?;
        let tickets: Vec<Ticket> = client.get_json(&endpoints::collection(endpoints::NOTIFICATIONS)).await?;

        Ok(Self::compute(
            &products,
            &categories,
            &inventory,
            &shipments,
            &tickets,
            low_stock_threshold,
        ))
    }
}
