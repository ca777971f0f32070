use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Top banner of the landing page.
#[derive(Clone, Debug, Default, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "home_hero")]
#[serde(default)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip)]
    pub id: i32,
    pub title: String,
    pub title_local: String,
    pub subtitle: String,
    pub subtitle_local: String,
    pub cta_label: String,
    pub cta_label_local: String,
    pub image_url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
