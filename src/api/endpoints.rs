// Paths relative to the versioned API root. Every path ends in a slash;
// the backend redirects slash-less URLs, which would drop request bodies.

use crate::types::RecordId;

/// POST `{username, password}` -> `{access, refresh}`
pub const TOKEN: &str = "token/";
/// POST `{refresh}` -> `{access}`
pub const TOKEN_REFRESH: &str = "token/refresh/";
/// POST `{username, password}`
pub const REGISTER: &str = "user/register/";

pub const CATEGORIES: &str = "categories";
pub const PRODUCTS: &str = "products";
pub const INVENTORY: &str = "inventory";
pub const SUPPLIERS: &str = "suppliers";
pub const PURCHASE_ORDERS: &str = "purchase-orders";
pub const SHIPPING_PARTNERS: &str = "shipping";
pub const SHIPMENT_ORDERS: &str = "shipment-orders";
pub const NOTIFICATIONS: &str = "notifications";

pub fn collection(resource: &str) -> String {
    format!("{}/", resource)
}

pub fn member(resource: &str, id: RecordId) -> String {
    format!("{}/{}/", resource, id)
}
