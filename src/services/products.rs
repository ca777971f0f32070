use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::{
    product::{self, Entity as ProductEntity, ImageList},
    product_color, product_feature, product_spec,
};
use crate::error::ServiceError;
use crate::services::{search_term, sort_order, PageParams, Paginated};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub in_stock: Option<bool>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SpecInput {
    pub label: String,
    pub label_local: Option<String>,
    pub value: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FeatureInput {
    pub feature: String,
    pub feature_local: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Validate)]
pub struct ColorInput {
    pub name: String,
    #[validate(regex(path = *HEX_COLOR_REGEX))]
    pub hex: String,
}

static HEX_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub name_local: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_local: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub old_price: Option<f64>,
    #[validate(length(min = 1, max = 64))]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f32,
    #[serde(default)]
    pub reviews_count: i32,
    pub in_stock: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock_quantity: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub specs: Vec<SpecInput>,
    #[serde(default)]
    pub features: Vec<FeatureInput>,
    #[serde(default)]
    #[validate(nested)]
    pub colors: Vec<ColorInput>,
}

/// Partial product update. Child lists, when present, replace the stored
/// lists entirely.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct PatchProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub name_local: Option<String>,
    pub description: Option<String>,
    pub description_local: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[serde(default, with = "double_option")]
    pub old_price: Option<Option<f64>>,
    #[validate(length(min = 1, max = 64))]
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub images: Option<Vec<String>>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f32>,
    pub reviews_count: Option<i32>,
    pub in_stock: Option<bool>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    pub featured: Option<bool>,
    pub specs: Option<Vec<SpecInput>>,
    pub features: Option<Vec<FeatureInput>>,
    #[validate(nested)]
    pub colors: Option<Vec<ColorInput>>,
}

/// Lets `"old_price": null` clear the field while an absent key leaves it.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Product with its child rows, in display order.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: product::Model,
    pub specs: Vec<product_spec::Model>,
    pub features: Vec<product_feature::Model>,
    pub colors: Vec<product_color::Model>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

pub async fn get_products<C: ConnectionTrait>(
    db: &C,
    filter: &ProductFilter,
    page: &PageParams,
) -> Result<Paginated<product::Model>, ServiceError> {
    let mut condition = Condition::all();

    if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
        condition = condition.add(product::Column::Category.eq(category));
    }
    if let Some(query) = search_term(filter.search.as_deref()) {
        condition = condition.add(
            Condition::any()
                .add(product::Column::Name.contains(query.clone()))
                .add(product::Column::NameLocal.contains(query)),
        );
    }
    if let Some(featured) = filter.featured {
        condition = condition.add(product::Column::Featured.eq(featured));
    }
    if let Some(in_stock) = filter.in_stock {
        condition = condition.add(product::Column::InStock.eq(in_stock));
    }

    let sort_column = match filter.sort_by.as_deref() {
        Some("price") => product::Column::Price,
        Some("rating") => product::Column::Rating,
        Some("name") => product::Column::Name,
        _ => product::Column::CreatedAt,
    };
    let order = sort_order(filter.order.as_deref());

    let query = ProductEntity::find().filter(condition);
    let total = query.clone().count(db).await?;
    let rows = query
        .order_by(sort_column, order.clone())
        .order_by(product::Column::Id, order)
        .limit(page.limit())
        .offset(page.offset())
        .all(db)
        .await?;

    Ok(Paginated::new(rows, total, page))
}

pub async fn get_product<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<ProductDetail, ServiceError> {
    let product = ProductEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product", id))?;

    let specs = product_spec::Entity::find()
        .filter(product_spec::Column::ProductId.eq(id))
        .order_by_asc(product_spec::Column::Position)
        .all(db)
        .await?;
    let features = product_feature::Entity::find()
        .filter(product_feature::Column::ProductId.eq(id))
        .order_by_asc(product_feature::Column::Position)
        .all(db)
        .await?;
    let colors = product_color::Entity::find()
        .filter(product_color::Column::ProductId.eq(id))
        .order_by_asc(product_color::Column::Position)
        .all(db)
        .await?;

    Ok(ProductDetail {
        product,
        specs,
        features,
        colors,
    })
}

pub async fn get_categories<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<CategoryCount>, ServiceError> {
    let rows: Vec<(String, i64)> = ProductEntity::find()
        .select_only()
        .column(product::Column::Category)
        .column_as(Expr::col(product::Column::Id).count(), "count")
        .group_by(product::Column::Category)
        .order_by_asc(product::Column::Category)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect())
}

/// Inserts a product and its child rows. Run inside a transaction.
pub async fn create_product<C: ConnectionTrait>(
    db: &C,
    payload: CreateProduct,
) -> Result<ProductDetail, ServiceError> {
    payload
        .validate()
        .map_err(|err| ServiceError::Validation(err.to_string()))?;

    let new_product = product::ActiveModel {
        name: Set(payload.name),
        name_local: Set(payload.name_local),
        description: Set(payload.description),
        description_local: Set(payload.description_local),
        price: Set(payload.price),
        old_price: Set(payload.old_price),
        category: Set(payload.category),
        image_url: Set(payload.image_url),
        images: Set(ImageList(payload.images)),
        rating: Set(payload.rating),
        reviews_count: Set(payload.reviews_count),
        in_stock: Set(payload.in_stock.unwrap_or(payload.stock_quantity > 0)),
        stock_quantity: Set(payload.stock_quantity),
        featured: Set(payload.featured),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let product = new_product.insert(db).await?;

    replace_specs(db, product.id, payload.specs).await?;
    replace_features(db, product.id, payload.features).await?;
    replace_colors(db, product.id, payload.colors).await?;

    get_product(db, product.id).await
}

/// Applies a partial update; child lists present in the patch are replaced
/// with delete-then-insert. Run inside a transaction so a failure leaves the
/// previous rows untouched.
pub async fn update_product<C: ConnectionTrait>(
    db: &C,
    id: i32,
    patch: PatchProduct,
) -> Result<ProductDetail, ServiceError> {
    patch
        .validate()
        .map_err(|err| ServiceError::Validation(err.to_string()))?;

    let existing = ProductEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product", id))?;
    let mut product: product::ActiveModel = existing.into();

    if let Some(name) = patch.name {
        product.name = Set(name);
    }
    if let Some(name_local) = patch.name_local {
        product.name_local = Set(name_local);
    }
    if let Some(description) = patch.description {
        product.description = Set(description);
    }
    if let Some(description_local) = patch.description_local {
        product.description_local = Set(description_local);
    }
    if let Some(price) = patch.price {
        product.price = Set(price);
    }
    if let Some(old_price) = patch.old_price {
        product.old_price = Set(old_price);
    }
    if let Some(category) = patch.category {
        product.category = Set(category);
    }
    if let Some(image_url) = patch.image_url {
        product.image_url = Set(image_url);
    }
    if let Some(images) = patch.images {
        product.images = Set(ImageList(images));
    }
    if let Some(rating) = patch.rating {
        product.rating = Set(rating);
    }
    if let Some(reviews_count) = patch.reviews_count {
        product.reviews_count = Set(reviews_count);
    }
    if let Some(in_stock) = patch.in_stock {
        product.in_stock = Set(in_stock);
    }
    if let Some(stock_quantity) = patch.stock_quantity {
        product.stock_quantity = Set(stock_quantity);
    }
    if let Some(featured) = patch.featured {
        product.featured = Set(featured);
    }

    if product.is_changed() {
        product.update(db).await?;
    }

    if let Some(specs) = patch.specs {
        replace_specs(db, id, specs).await?;
    }
    if let Some(features) = patch.features {
        replace_features(db, id, features).await?;
    }
    if let Some(colors) = patch.colors {
        replace_colors(db, id, colors).await?;
    }

    get_product(db, id).await
}

/// Deletes the product together with its specs, features and colors. Orders
/// keep their product name snapshot. Run inside a transaction.
pub async fn delete_product<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), ServiceError> {
    if ProductEntity::find_by_id(id).one(db).await?.is_none() {
        return Err(ServiceError::not_found("Product", id));
    }

    product_spec::Entity::delete_many()
        .filter(product_spec::Column::ProductId.eq(id))
        .exec(db)
        .await?;
    product_feature::Entity::delete_many()
        .filter(product_feature::Column::ProductId.eq(id))
        .exec(db)
        .await?;
    product_color::Entity::delete_many()
        .filter(product_color::Column::ProductId.eq(id))
        .exec(db)
        .await?;
    ProductEntity::delete_by_id(id).exec(db).await?;

    Ok(())
}

async fn replace_specs<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    specs: Vec<SpecInput>,
) -> Result<(), ServiceError> {
    product_spec::Entity::delete_many()
        .filter(product_spec::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    if specs.is_empty() {
        return Ok(());
    }

    let rows = specs
        .into_iter()
        .enumerate()
        .map(|(position, spec)| product_spec::ActiveModel {
            product_id: Set(product_id),
            label: Set(spec.label),
            label_local: Set(spec.label_local),
            value: Set(spec.value),
            position: Set(position as i32),
            ..Default::default()
        });
    product_spec::Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

async fn replace_features<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    features: Vec<FeatureInput>,
) -> Result<(), ServiceError> {
    product_feature::Entity::delete_many()
        .filter(product_feature::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    if features.is_empty() {
        return Ok(());
    }

    let rows = features
        .into_iter()
        .enumerate()
        .map(|(position, feature)| product_feature::ActiveModel {
            product_id: Set(product_id),
            feature: Set(feature.feature),
            feature_local: Set(feature.feature_local),
            position: Set(position as i32),
            ..Default::default()
        });
    product_feature::Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

async fn replace_colors<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    colors: Vec<ColorInput>,
) -> Result<(), ServiceError> {
    product_color::Entity::delete_many()
        .filter(product_color::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    if colors.is_empty() {
        return Ok(());
    }

    let rows = colors
        .into_iter()
        .enumerate()
        .map(|(position, color)| product_color::ActiveModel {
            product_id: Set(product_id),
            name: Set(color.name),
            hex: Set(color.hex),
            position: Set(position as i32),
            ..Default::default()
        });
    product_color::Entity::insert_many(rows).exec(db).await?;
    Ok(())
}
