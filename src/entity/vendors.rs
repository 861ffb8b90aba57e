use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vendors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub business_name: String,
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    pub gst_number: Option<String>,
    pub pan_number: Option<String>,
    pub business_type: Option<String>,
    pub address_line1: String,
    pub locality: Option<String>,
    pub district_id: Uuid,
    pub state_id: Uuid,
    pub country_id: Uuid,
    pub pincode: String,
    pub status: String,
    pub is_verified: bool,
    pub verified_at: Option<DateTimeWithTimeZone>,
    pub verified_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub commission: f64,
    pub rating: f64,
    pub total_reviews: i32,
    pub total_products: i32,
    pub total_orders: i32,
    pub total_revenue: i64,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::products::Entity")]
    Products,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Entity {
    pub fn find_alive() -> Select<Entity> {
        Self::find().filter(Column::DeletedAt.is_null())
    }
}

impl ActiveModelBehavior for ActiveModel {}
