use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub name_local: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub description_local: String,
    pub price: f64,
    pub old_price: Option<f64>,
    #[sea_orm(indexed)]
    pub category: String,
    pub image_url: String,
    pub images: ImageList,
    #[sea_orm(default_value = 0.0)]
    pub rating: f32,
    #[sea_orm(default_value = 0)]
    pub reviews_count: i32,
    #[sea_orm(default_value = true)]
    pub in_stock: bool,
    #[sea_orm(default_value = 0)]
    pub stock_quantity: i32,
    #[sea_orm(default_value = false)]
    pub featured: bool,
    pub created_at: DateTimeUtc,
}

/// Gallery URLs, stored as a JSON array next to the main `image_url`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct ImageList(pub Vec<String>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::entities::product_spec::Entity")]
    Spec,
    #[sea_orm(has_many = "crate::entities::product_feature::Entity")]
    Feature,
    #[sea_orm(has_many = "crate::entities::product_color::Entity")]
    Color,
}

impl Related<crate::entities::product_spec::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Spec.def()
    }
}

impl Related<crate::entities::product_feature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feature.def()
    }
}

impl Related<crate::entities::product_color::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Color.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
