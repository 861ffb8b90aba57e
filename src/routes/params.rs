use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Raw pagination query values. Kept as strings so malformed input falls back
/// to the defaults instead of failing extraction.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl Pagination {
    /// Returns (page, per_page, offset). `page < 1` coerces to 1; `per_page`
    /// outside [1, 100] coerces to 20.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.parse::<i64>().ok())
            .unwrap_or(1);
        let page = if page < 1 { 1 } else { page };

        let per_page = self
            .per_page
            .as_deref()
            .and_then(|p| p.parse::<i64>().ok())
            .unwrap_or(20);
        let per_page = if !(1..=100).contains(&per_page) {
            20
        } else {
            per_page
        };

        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Unknown or empty values silently fall back to descending.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
}

impl ProductSortBy {
    /// Unknown values silently fall back to created_at.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("price") => Self::Price,
            Some("name") => Self::Name,
            _ => Self::CreatedAt,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub state: Option<String>,
    pub region: Option<String>,
    pub saree_type: Option<String>,
    pub fabric: Option<String>,
    pub product_type: Option<String>,
    pub occasion: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub role: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct InventoryQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub low_stock: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SalesQuery {
    pub period: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pagination(page: Option<&str>, per_page: Option<&str>) -> Pagination {
        Pagination {
            page: page.map(String::from),
            per_page: per_page.map(String::from),
        }
    }

    #[test]
    fn defaults_apply_when_absent_or_malformed() {
        assert_eq!(pagination(None, None).normalize(), (1, 20, 0));
        assert_eq!(pagination(Some("abc"), Some("xyz")).normalize(), (1, 20, 0));
    }

    #[test]
    fn page_below_one_coerces_to_one() {
        assert_eq!(pagination(Some("0"), None).normalize(), (1, 20, 0));
        assert_eq!(pagination(Some("-3"), None).normalize(), (1, 20, 0));
    }

    #[test]
    fn per_page_outside_bounds_coerces_to_twenty() {
        assert_eq!(pagination(None, Some("0")).normalize(), (1, 20, 0));
        assert_eq!(pagination(None, Some("101")).normalize(), (1, 20, 0));
        assert_eq!(pagination(None, Some("100")).normalize(), (1, 100, 0));
        assert_eq!(pagination(None, Some("1")).normalize(), (1, 1, 0));
    }

    #[test]
    fn offset_is_page_minus_one_times_per_page() {
        assert_eq!(pagination(Some("3"), Some("25")).normalize(), (3, 25, 50));
    }

    #[test]
    fn sort_order_falls_back_to_descending() {
        assert_eq!(SortOrder::parse(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(None), SortOrder::Desc);
    }

    #[test]
    fn sort_field_falls_back_to_created_at() {
        assert_eq!(ProductSortBy::parse(Some("price")), ProductSortBy::Price);
        assert_eq!(ProductSortBy::parse(Some("name")), ProductSortBy::Name);
        assert_eq!(
            ProductSortBy::parse(Some("stock_quantity")),
            ProductSortBy::CreatedAt
        );
        assert_eq!(ProductSortBy::parse(None), ProductSortBy::CreatedAt);
    }
}
