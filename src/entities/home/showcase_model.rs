use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Model card on the landing page, optionally linked to a catalog product.
#[derive(Clone, Debug, Default, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "home_models")]
#[serde(default)]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip)]
    pub id: i32,
    pub product_id: Option<i32>,
    pub name: String,
    pub name_local: String,
    pub tagline: String,
    pub tagline_local: String,
    pub image_url: String,
    pub price: Option<f64>,
    #[serde(skip)]
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
