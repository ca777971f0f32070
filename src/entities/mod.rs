pub mod admin_user;
pub mod customer;
pub mod home;
pub mod image;
pub mod message;
pub mod order;
pub mod product;
pub mod product_color;
pub mod product_feature;
pub mod product_spec;

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use chrono::Utc;
use sea_orm::{
    sea_query::TableCreateStatement, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, Schema, Set,
};
use tracing::info;

use crate::config::AppConfig;

/// Creates every table that does not exist yet. Parents come before the
/// tables that reference them.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let statements: Vec<TableCreateStatement> = vec![
        schema.create_table_from_entity(admin_user::Entity),
        schema.create_table_from_entity(image::Entity),
        schema.create_table_from_entity(product::Entity),
        schema.create_table_from_entity(product_spec::Entity),
        schema.create_table_from_entity(product_feature::Entity),
        schema.create_table_from_entity(product_color::Entity),
        schema.create_table_from_entity(customer::Entity),
        schema.create_table_from_entity(order::Entity),
        schema.create_table_from_entity(message::Entity),
        schema.create_table_from_entity(home::hero::Entity),
        schema.create_table_from_entity(home::feature::Entity),
        schema.create_table_from_entity(home::showcase::Entity),
        schema.create_table_from_entity(home::showcase_model::Entity),
        schema.create_table_from_entity(home::contact::Entity),
        schema.create_table_from_entity(home::footer::Entity),
        schema.create_table_from_entity(home::footer_link::Entity),
        schema.create_table_from_entity(home::header::Entity),
        schema.create_table_from_entity(home::nav_link::Entity),
    ];

    for mut statement in statements {
        statement.if_not_exists();
        db.execute(backend.build(&statement)).await?;
    }

    Ok(())
}

/// Creates the first admin account from configuration when the admin table is
/// empty. Does nothing if no bootstrap password is configured.
pub async fn bootstrap_admin(db: &DatabaseConnection, config: &AppConfig) -> Result<(), DbErr> {
    let Some(password) = config.admin_password.as_deref() else {
        return Ok(());
    };

    if admin_user::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let password_hash = hash_password(password)
        .map_err(|err| DbErr::Custom(format!("Failed to hash bootstrap password: {err}")))?;

    let new_admin = admin_user::ActiveModel {
        username: Set(config.admin_username.clone()),
        password: Set(password_hash),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    admin_user::Entity::insert(new_admin).exec(db).await?;

    info!(username = %config.admin_username, "Created bootstrap admin account");
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}
