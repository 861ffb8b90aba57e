use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity;

pub const VALID_ROLES: [&str; 3] = ["customer", "admin", "vendor"];

/// Order lifecycle. Transitions are guarded: the sequence moves forward only,
/// cancellation is possible until shipping, and terminal states stay terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            "returned" => Some(Self::Returned),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Returned => "returned",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Returned)
    }

    pub fn can_transition(self, next: Self) -> bool {
        use OrderStatus::*;
        match self {
            Pending => matches!(next, Confirmed | Cancelled),
            Confirmed => matches!(next, Processing | Cancelled),
            Processing => matches!(next, Shipped | Cancelled),
            Shipped => matches!(next, Delivered),
            Delivered => matches!(next, Returned),
            Cancelled | Returned => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

/// User as served over the wire. The password hash never leaves the entity layer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: String,
    pub email_verified: bool,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserPublic {
    pub fn from_entity(m: entity::users::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            name: m.name,
            phone: m.phone,
            role: m.role,
            email_verified: m.email_verified,
            is_active: m.is_active,
            last_login: m.last_login.map(|dt| dt.with_timezone(&Utc)),
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub product_type: String,
    pub region_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub state_origin: Option<String>,
    pub saree_type: Option<String>,
    pub base_price: f64,
    pub discount_percentage: f64,
    pub final_price: f64,
    pub fabric: Option<String>,
    pub weave_type: Option<String>,
    pub occasion: Option<String>,
    pub stock_quantity: i32,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub images: Vec<ProductImage>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub reviews: Vec<Review>,
}

impl Product {
    pub fn from_entity(
        m: entity::products::Model,
        images: Vec<entity::product_images::Model>,
    ) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            description: m.description,
            product_type: m.product_type,
            region_id: m.region_id,
            vendor_id: m.vendor_id,
            state_origin: m.state_origin,
            saree_type: m.saree_type,
            base_price: m.base_price,
            discount_percentage: m.discount_percentage,
            final_price: m.final_price,
            fabric: m.fabric,
            weave_type: m.weave_type,
            occasion: m.occasion,
            stock_quantity: m.stock_quantity,
            is_active: m.is_active,
            metadata: m.metadata,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
            images: images.into_iter().map(ProductImage::from_entity).collect(),
            reviews: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl ProductImage {
    pub fn from_entity(m: entity::product_images::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            image_url: m.image_url,
            alt_text: m.alt_text,
            display_order: m.display_order,
            is_primary: m.is_primary,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn from_entity(m: entity::reviews::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            user_id: m.user_id,
            rating: m.rating,
            comment: m.comment,
            is_verified_purchase: m.is_verified_purchase,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub landmark: Option<String>,
    pub district_id: Uuid,
    pub state_id: Uuid,
    pub country_id: Uuid,
    pub pin_code: String,
    pub address_type: String,
    pub is_default: bool,
}

impl Address {
    pub fn from_entity(m: entity::addresses::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            full_name: m.full_name,
            phone: m.phone,
            address_line1: m.address_line1,
            address_line2: m.address_line2,
            landmark: m.landmark,
            district_id: m.district_id,
            state_id: m.state_id,
            country_id: m.country_id,
            pin_code: m.pin_code,
            address_type: m.address_type,
            is_default: m.is_default,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub subtotal_amount: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub shipping_amount: f64,
    pub total_amount: f64,
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<serde_json::Value>,
    pub customer_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn from_entity(m: entity::orders::Model) -> Self {
        Self {
            id: m.id,
            order_number: m.order_number,
            user_id: m.user_id,
            status: m.status,
            payment_status: m.payment_status,
            payment_method: m.payment_method,
            subtotal_amount: m.subtotal_amount,
            discount_amount: m.discount_amount,
            tax_amount: m.tax_amount,
            shipping_amount: m.shipping_amount,
            total_amount: m.total_amount,
            coupon_code: m.coupon_code,
            shipping_address: m.shipping_address,
            billing_address: m.billing_address,
            customer_notes: m.customer_notes,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn from_entity(m: entity::order_items::Model) -> Self {
        Self {
            id: m.id,
            order_id: m.order_id,
            product_id: m.product_id,
            product_name: m.product_name,
            quantity: m.quantity,
            unit_price: m.unit_price,
            total_price: m.total_price,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderStatusEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: String,
    pub comment: Option<String>,
    pub changed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl OrderStatusEntry {
    pub fn from_entity(m: entity::order_status_history::Model) -> Self {
        Self {
            id: m.id,
            order_id: m.order_id,
            status: m.status,
            comment: m.comment,
            changed_by: m.changed_by,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Shipment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub provider_id: Uuid,
    pub awb_number: Option<String>,
    pub status: String,
    pub shipping_cost: f64,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub tracking_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<TrackingEvent>,
}

impl Shipment {
    pub fn from_entity(
        m: entity::shipments::Model,
        events: Vec<entity::tracking_events::Model>,
    ) -> Self {
        Self {
            id: m.id,
            order_id: m.order_id,
            provider_id: m.provider_id,
            awb_number: m.awb_number,
            status: m.status,
            shipping_cost: m.shipping_cost,
            estimated_delivery: m.estimated_delivery.map(|dt| dt.with_timezone(&Utc)),
            actual_delivery: m.actual_delivery.map(|dt| dt.with_timezone(&Utc)),
            tracking_url: m.tracking_url,
            events: events.into_iter().map(TrackingEvent::from_entity).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrackingEvent {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub status: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub event_time: DateTime<Utc>,
}

impl TrackingEvent {
    pub fn from_entity(m: entity::tracking_events::Model) -> Self {
        Self {
            id: m.id,
            shipment_id: m.shipment_id,
            status: m.status,
            location: m.location,
            description: m.description,
            event_time: m.event_time.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;
    use super::*;

    #[test]
    fn status_roundtrips_through_parse() {
        for s in [
            Pending, Confirmed, Processing, Shipped, Delivered, Cancelled, Returned,
        ] {
            assert_eq!(OrderStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(OrderStatus::parse("paid"), None);
        assert_eq!(OrderStatus::parse("PENDING"), None);
    }

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(Pending.can_transition(Confirmed));
        assert!(Confirmed.can_transition(Processing));
        assert!(Processing.can_transition(Shipped));
        assert!(Shipped.can_transition(Delivered));
        assert!(Delivered.can_transition(Returned));
    }

    #[test]
    fn cancellation_is_allowed_until_shipped() {
        assert!(Pending.can_transition(Cancelled));
        assert!(Confirmed.can_transition(Cancelled));
        assert!(Processing.can_transition(Cancelled));
        assert!(!Shipped.can_transition(Cancelled));
        assert!(!Delivered.can_transition(Cancelled));
    }

    #[test]
    fn backward_and_terminal_transitions_are_rejected() {
        assert!(!Delivered.can_transition(Pending));
        assert!(!Shipped.can_transition(Pending));
        assert!(!Cancelled.can_transition(Pending));
        assert!(!Returned.can_transition(Delivered));
        assert!(Cancelled.is_terminal());
        assert!(Returned.is_terminal());
        assert!(!Delivered.is_terminal());
    }
}
