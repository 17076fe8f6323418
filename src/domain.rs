//! Request inputs shared by the HTTP layer, services and stores.
//!
//! Update inputs distinguish an absent field (`None`, left untouched) from a
//! present one, even when the present value is empty or zero.

use serde::Deserialize;
use validator::Validate;

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct SignUpInput {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub surname: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(length(min = 5))]
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct SignInInput {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub image: String,
    pub price: u32,
    #[serde(default)]
    pub sale: u32,
    #[serde(default)]
    pub sale_old_price: u32,
    #[serde(default)]
    pub category_id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub description: String,
}

/// Fields are listed in the order their columns appear in the SET clause.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateProductInput {
    pub title: Option<String>,
    pub image: Option<String>,
    pub price: Option<u32>,
    pub sale: Option<u32>,
    pub sale_old_price: Option<u32>,
    pub category_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub subtype: Option<String>,
    pub description: Option<String>,
}
