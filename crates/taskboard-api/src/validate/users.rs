use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use taskboard_types::api::{CreateUserRequest, UpdateUserRequest};

use super::{TextRule, Validator, object};
use crate::error::ApiError;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email pattern"));

const USERNAME: TextRule = TextRule {
    min: 3,
    max: 50,
    too_short: "Username must be at least 3 characters",
    too_long: "Username must be less than 50 characters",
};

const PASSWORD: TextRule = TextRule {
    min: 3,
    max: 100,
    too_short: "Password must be at least 3 characters",
    too_long: "Password must be less than 100 characters",
};

const FULL_NAME: TextRule = TextRule {
    min: 0,
    max: 100,
    too_short: "",
    too_long: "Full name must be less than 100 characters",
};

const INVALID_EMAIL: &str = "Invalid email format";

fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub fn create(body: &Value) -> Result<CreateUserRequest, ApiError> {
    let mut v = Validator::new(object(body)?);

    let username = v.required_text("username", &USERNAME);
    let password = v.required_text("password", &PASSWORD);
    let email = v.blank_as_null("email", is_email, INVALID_EMAIL);
    let full_name = v.nullable_text("fullName", &FULL_NAME);

    let (Some(username), Some(password)) = (username, password) else {
        return Err(v.into_error());
    };
    v.finish()?;

    Ok(CreateUserRequest {
        username,
        password,
        email: email.flatten(),
        full_name: full_name.flatten(),
    })
}

pub fn update(body: &Value) -> Result<UpdateUserRequest, ApiError> {
    let mut v = Validator::new(object(body)?);

    let patch = UpdateUserRequest {
        username: v.optional_text("username", &USERNAME),
        password: v.optional_text("password", &PASSWORD),
        email: v.blank_as_null("email", is_email, INVALID_EMAIL),
        full_name: v.nullable_text("fullName", &FULL_NAME),
    };
    v.finish()?;
    Ok(patch)
}
