use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Address, UserPublic, VALID_ROLES};

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_orders: i64,
    pub total_products: i64,
    pub total_revenue: f64,
    pub pending_orders: i64,
    pub low_stock_products: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesPoint {
    pub date: String,
    pub orders: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesAnalytics {
    pub period: String,
    pub data: Vec<SalesPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueBucket {
    pub label: String,
    pub orders: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueAnalytics {
    pub by_product_type: Vec<RevenueBucket>,
    pub by_state: Vec<RevenueBucket>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetail {
    pub user: UserPublic,
    pub addresses: Vec<Address>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserStatusRequest {
    pub is_active: Option<bool>,
    pub email_verified: Option<bool>,
    pub role: Option<String>,
}

impl UpdateUserStatusRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.is_active.is_none() && self.email_verified.is_none() && self.role.is_none() {
            return Err(AppError::BadRequest("Nothing to update".into()));
        }
        if let Some(role) = &self.role {
            if !VALID_ROLES.contains(&role.as_str()) {
                return Err(AppError::BadRequest("Invalid role".into()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateInventoryRequest {
    pub stock_quantity: i32,
    pub is_active: Option<bool>,
}

impl UpdateInventoryRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.stock_quantity < 0 {
            return Err(AppError::BadRequest("Stock quantity cannot be negative".into()));
        }
        Ok(())
    }
}

/// Inventory listing row, the subset of product columns the original exposes.
#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub product_type: String,
    pub state_origin: Option<String>,
    pub stock_quantity: i32,
    pub base_price: f64,
    pub final_price: f64,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_status_update_requires_a_field_and_known_role() {
        let empty = UpdateUserStatusRequest {
            is_active: None,
            email_verified: None,
            role: None,
        };
        assert!(empty.validate().is_err());

        let bad_role = UpdateUserStatusRequest {
            is_active: None,
            email_verified: None,
            role: Some("superuser".into()),
        };
        assert!(bad_role.validate().is_err());

        let ok = UpdateUserStatusRequest {
            is_active: Some(false),
            email_verified: None,
            role: Some("vendor".into()),
        };
        assert!(ok.validate().is_ok());
    }
}
