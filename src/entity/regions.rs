use sea_orm::entity::prelude::*;

/// Marketing-level craft-origin grouping, distinct from the administrative
/// state/district hierarchy. Products link here for origin display.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "regions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub region_type: Option<String>,
    pub state_id: Option<Uuid>,
    pub description: Option<String>,
    pub famous_for: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::states::Entity",
        from = "Column::StateId",
        to = "super::states::Column::Id"
    )]
    States,
    #[sea_orm(has_many = "super::products::Entity")]
    Products,
}

impl Related<super::states::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::States.def()
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
