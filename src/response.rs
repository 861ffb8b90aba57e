use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: (total + per_page - 1) / per_page,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, pagination: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling_of_total_over_per_page() {
        assert_eq!(Meta::new(1, 20, 0).total_pages, 0);
        assert_eq!(Meta::new(1, 20, 1).total_pages, 1);
        assert_eq!(Meta::new(1, 20, 20).total_pages, 1);
        assert_eq!(Meta::new(1, 20, 21).total_pages, 2);
        assert_eq!(Meta::new(1, 7, 100).total_pages, 15);
        assert_eq!(Meta::new(1, 1, 100).total_pages, 100);
    }
}
