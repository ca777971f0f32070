use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use validator::Validate;

use crate::entities::{admin_user, hash_password};
use crate::error::ServiceError;
use crate::middleware::auth::generate_token;

#[derive(Clone, Debug, Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ChangePassword {
    pub current_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Checks the credentials and issues a bearer token. Unknown user and wrong
/// password produce the same error.
pub async fn login<C: ConnectionTrait>(
    db: &C,
    secret: &str,
    payload: Login,
) -> Result<String, ServiceError> {
    let invalid = || ServiceError::Unauthorized("Invalid username or password".to_string());

    let admin = admin_user::Entity::find()
        .filter(admin_user::Column::Username.eq(payload.username.trim()))
        .one(db)
        .await?
        .ok_or_else(invalid)?;

    admin.check_hash(&payload.password).map_err(|_| invalid())?;

    generate_token(secret, admin.id, admin.username)
        .map_err(|err| ServiceError::Internal(err.to_string()))
}

pub async fn change_password<C: ConnectionTrait>(
    db: &C,
    admin_id: i32,
    payload: ChangePassword,
) -> Result<(), ServiceError> {
    payload
        .validate()
        .map_err(|err| ServiceError::Validation(err.to_string()))?;

    let admin = admin_user::Entity::find_by_id(admin_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Admin", admin_id))?;

    admin
        .check_hash(&payload.current_password)
        .map_err(|_| ServiceError::Forbidden("Current password is incorrect".to_string()))?;

    let password = hash_password(&payload.new_password)
        .map_err(|err| ServiceError::Internal(format!("Failed to hash password: {err}")))?;

    let mut admin: admin_user::ActiveModel = admin.into();
    admin.password = Set(password);
    admin.update(db).await?;

    Ok(())
}
