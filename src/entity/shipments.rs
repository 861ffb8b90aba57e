use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub provider_id: Uuid,
    pub awb_number: Option<String>,
    pub status: String,
    pub weight: Option<f64>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub dimensions: Option<Json>,
    pub shipping_cost: f64,
    pub estimated_delivery: Option<DateTimeWithTimeZone>,
    pub actual_delivery: Option<DateTimeWithTimeZone>,
    pub pickup_date: Option<DateTimeWithTimeZone>,
    pub tracking_url: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metadata: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Orders,
    #[sea_orm(
        belongs_to = "super::logistics_providers::Entity",
        from = "Column::ProviderId",
        to = "super::logistics_providers::Column::Id"
    )]
    LogisticsProviders,
    #[sea_orm(has_many = "super::tracking_events::Entity")]
    TrackingEvents,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::logistics_providers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LogisticsProviders.def()
    }
}

impl Related<super::tracking_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackingEvents.def()
    }
}

impl Entity {
    pub fn find_alive() -> Select<Entity> {
        Self::find().filter(Column::DeletedAt.is_null())
    }
}

impl ActiveModelBehavior for ActiveModel {}
