use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductImageInput {
    pub image_url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub product_type: String,
    pub region_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub state_origin: Option<String>,
    pub saree_type: Option<String>,
    pub base_price: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    pub fabric: Option<String>,
    pub weave_type: Option<String>,
    pub occasion: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub images: Vec<ProductImageInput>,
    pub metadata: Option<serde_json::Value>,
}

impl CreateProductRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("Product name is required".into()));
        }
        if self.product_type.trim().is_empty() {
            return Err(AppError::BadRequest("Product type is required".into()));
        }
        if self.base_price <= 0.0 {
            return Err(AppError::BadRequest("Base price must be greater than 0".into()));
        }
        if !(0.0..=100.0).contains(&self.discount_percentage) {
            return Err(AppError::BadRequest(
                "Discount percentage must be between 0 and 100".into(),
            ));
        }
        if self.stock_quantity < 0 {
            return Err(AppError::BadRequest("Stock quantity cannot be negative".into()));
        }
        for image in &self.images {
            if image.image_url.trim().is_empty() {
                return Err(AppError::BadRequest("Image URL is required".into()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub product_type: Option<String>,
    pub region_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub state_origin: Option<String>,
    pub saree_type: Option<String>,
    pub base_price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub fabric: Option<String>,
    pub weave_type: Option<String>,
    pub occasion: Option<String>,
    pub stock_quantity: Option<i32>,
    pub metadata: Option<serde_json::Value>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::BadRequest("Product name cannot be empty".into()));
            }
        }
        if let Some(price) = self.base_price {
            if price <= 0.0 {
                return Err(AppError::BadRequest("Base price must be greater than 0".into()));
            }
        }
        if let Some(discount) = self.discount_percentage {
            if !(0.0..=100.0).contains(&discount) {
                return Err(AppError::BadRequest(
                    "Discount percentage must be between 0 and 100".into(),
                ));
            }
        }
        if let Some(stock) = self.stock_quantity {
            if stock < 0 {
                return Err(AppError::BadRequest("Stock quantity cannot be negative".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> CreateProductRequest {
        CreateProductRequest {
            name: "Kasavu Saree".into(),
            description: None,
            product_type: "SAREE".into(),
            region_id: None,
            vendor_id: None,
            state_origin: Some("KL".into()),
            saree_type: Some("Kasavu".into()),
            base_price: 4999.0,
            discount_percentage: 0.0,
            fabric: Some("Cotton".into()),
            weave_type: None,
            occasion: None,
            stock_quantity: 10,
            images: vec![],
            metadata: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(base_request().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_price() {
        let mut req = base_request();
        req.base_price = 0.0;
        assert!(req.validate().is_err());
        req.base_price = -10.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_discount_outside_range() {
        let mut req = base_request();
        req.discount_percentage = 100.5;
        assert!(req.validate().is_err());
        req.discount_percentage = -1.0;
        assert!(req.validate().is_err());
        req.discount_percentage = 100.0;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_blank_name_and_empty_image_url() {
        let mut req = base_request();
        req.name = " ".into();
        assert!(req.validate().is_err());

        let mut req = base_request();
        req.images.push(ProductImageInput {
            image_url: "".into(),
            alt_text: None,
            display_order: 0,
            is_primary: false,
        });
        assert!(req.validate().is_err());
    }
}
