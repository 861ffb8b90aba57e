use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::models::{Order, OrderItem, OrderStatusEntry, Shipment};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub shipping_address: serde_json::Value,
    pub billing_address: Option<serde_json::Value>,
    pub payment_method: Option<String>,
    pub customer_notes: Option<String>,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.shipping_address.is_object() {
            return Err(AppError::BadRequest("Shipping address is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub status_history: Vec<OrderStatusEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackingInfo {
    pub order_number: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment: Option<Shipment>,
}
