use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub bucket: Bucket,
    pub file_name: String,
    #[sea_orm(unique)]
    pub path_name: String,
    pub extension: FileExtension,
    pub size: i64,
    pub created_at: DateTimeUtc,
}

impl Model {
    /// File name on disk inside the upload directory.
    pub fn stored_name(&self) -> String {
        format!("{}.{}", self.path_name, self.extension)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    enum_name = "extension_enum",
    db_type = "String(StringLen::N(8))",
    rs_type = "String"
)]
#[serde(rename_all = "lowercase")]
pub enum FileExtension {
    #[sea_orm(string_value = "jpg")]
    Jpg,
    #[sea_orm(string_value = "png")]
    Png,
    #[sea_orm(string_value = "webp")]
    Webp,
}

impl FileExtension {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/jpeg" => Some(Self::Jpg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for FileExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    enum_name = "bucket_enum",
    db_type = "String(StringLen::N(16))",
    rs_type = "String"
)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    #[sea_orm(string_value = "products")]
    Products,
    #[sea_orm(string_value = "chat")]
    Chat,
    #[sea_orm(string_value = "home")]
    Home,
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(Self::Products),
            "chat" => Ok(Self::Chat),
            "home" => Ok(Self::Home),
            _ => Err(format!("Unknown bucket: {}", s)),
        }
    }
}
