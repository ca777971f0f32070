use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Selling point tile under the hero banner.
#[derive(Clone, Debug, Default, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "home_features")]
#[serde(default)]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip)]
    pub id: i32,
    pub icon: String,
    pub title: String,
    pub title_local: String,
    pub description: String,
    pub description_local: String,
    #[serde(skip)]
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
