pub mod activity_logs;
pub mod addresses;
pub mod cart_items;
pub mod categories;
pub mod countries;
pub mod coupon_usages;
pub mod coupons;
pub mod districts;
pub mod inventory;
pub mod logistics_providers;
pub mod notifications;
pub mod order_items;
pub mod order_status_history;
pub mod orders;
pub mod payments;
pub mod product_categories;
pub mod product_images;
pub mod products;
pub mod regions;
pub mod return_items;
pub mod returns;
pub mod reviews;
pub mod shipments;
pub mod states;
pub mod tracking_events;
pub mod users;
pub mod vendors;
pub mod warehouses;
pub mod wishlist_items;

pub use activity_logs::Entity as ActivityLogs;
pub use addresses::Entity as Addresses;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use countries::Entity as Countries;
pub use coupon_usages::Entity as CouponUsages;
pub use coupons::Entity as Coupons;
pub use districts::Entity as Districts;
pub use inventory::Entity as Inventory;
pub use logistics_providers::Entity as LogisticsProviders;
pub use notifications::Entity as Notifications;
pub use order_items::Entity as OrderItems;
pub use order_status_history::Entity as OrderStatusHistory;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use product_categories::Entity as ProductCategories;
pub use product_images::Entity as ProductImages;
pub use products::Entity as Products;
pub use regions::Entity as Regions;
pub use return_items::Entity as ReturnItems;
pub use returns::Entity as Returns;
pub use reviews::Entity as Reviews;
pub use shipments::Entity as Shipments;
pub use states::Entity as States;
pub use tracking_events::Entity as TrackingEvents;
pub use users::Entity as Users;
pub use vendors::Entity as Vendors;
pub use warehouses::Entity as Warehouses;
pub use wishlist_items::Entity as WishlistItems;
