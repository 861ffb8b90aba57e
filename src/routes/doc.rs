use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{
            DashboardStats, InventoryRow, RevenueAnalytics, RevenueBucket, SalesAnalytics,
            SalesPoint, UpdateInventoryRequest, UpdateOrderStatusRequest, UpdateUserStatusRequest,
            UserDetail,
        },
        auth::{AuthData, LoginRequest, RegisterRequest},
        cart::{AddToCartRequest, AddToWishlistRequest, CartItemDto, UpdateCartItemRequest},
        orders::{CreateOrderRequest, OrderDetail, OrderWithItems, TrackingInfo},
        products::{CreateProductRequest, ProductImageInput, UpdateProductRequest},
    },
    models::{
        Address, Order, OrderItem, OrderStatusEntry, Product, ProductImage, Review, Shipment,
        TrackingEvent, UserPublic,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, orders, products, wishlist},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::api_health,
        auth::register,
        auth::login,
        auth::me,
        auth::logout,
        products::list_products,
        products::get_product,
        products::list_products_by_state,
        products::create_product,
        products::update_product,
        products::delete_product,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        cart::clear_cart,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::cancel_order,
        orders::track_order,
        admin::dashboard,
        admin::sales_analytics,
        admin::revenue_analytics,
        admin::list_users,
        admin::get_user,
        admin::list_user_orders,
        admin::update_user_status,
        admin::list_all_orders,
        admin::update_order_status,
        admin::list_inventory,
        admin::update_inventory,
    ),
    components(
        schemas(
            UserPublic,
            Product,
            ProductImage,
            Review,
            Address,
            Order,
            OrderItem,
            OrderStatusEntry,
            Shipment,
            TrackingEvent,
            RegisterRequest,
            LoginRequest,
            AuthData,
            CreateProductRequest,
            UpdateProductRequest,
            ProductImageInput,
            AddToCartRequest,
            UpdateCartItemRequest,
            AddToWishlistRequest,
            CartItemDto,
            CreateOrderRequest,
            OrderWithItems,
            OrderDetail,
            TrackingInfo,
            DashboardStats,
            SalesAnalytics,
            SalesPoint,
            RevenueAnalytics,
            RevenueBucket,
            UserDetail,
            UpdateUserStatusRequest,
            UpdateOrderStatusRequest,
            UpdateInventoryRequest,
            InventoryRow,
            Meta,
            ApiResponse<Product>,
            ApiResponse<AuthData>,
            ApiResponse<OrderWithItems>,
            ApiResponse<DashboardStats>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration, login and profile"),
        (name = "Products", description = "Catalog browsing and admin CRUD"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Wishlist", description = "Wishlist"),
        (name = "Orders", description = "Customer orders"),
        (name = "Admin", description = "Dashboard, analytics and management"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
