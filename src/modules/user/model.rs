use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::DATE_FORMAT;
use crate::modules::user::schema::UserEntity;

#[derive(Deserialize, Validate)]
pub struct RegisterModel {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Second name cannot be empty"))]
    pub second_name: String,
    /// `YYYY-MM-DD`
    pub birthdate: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub city: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

pub struct NewUser {
    pub id: Uuid,
    pub first_name: String,
    pub second_name: String,
    pub birthdate: NaiveDate,
    pub biography: String,
    pub city: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct LoginModel {
    pub id: Uuid,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub first_name: String,
    pub second_name: String,
    pub birthdate: String,
    pub biography: String,
    pub city: String,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse {
            first_name: entity.first_name,
            second_name: entity.second_name,
            birthdate: entity.birthdate.format(DATE_FORMAT).to_string(),
            biography: entity.biography,
            city: entity.city,
        }
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub second_name: String,
}
