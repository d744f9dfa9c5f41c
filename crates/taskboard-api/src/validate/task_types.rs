use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use taskboard_types::api::{CreateTaskTypeRequest, UpdateTaskTypeRequest};

use super::{TextRule, Validator, object};
use crate::error::ApiError;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid hex color pattern"));

const NAME: TextRule = TextRule {
    min: 1,
    max: 100,
    too_short: "Name is required",
    too_long: "Name must be less than 100 characters",
};

const DESCRIPTION: TextRule = TextRule {
    min: 0,
    max: 500,
    too_short: "",
    too_long: "Description must be less than 500 characters",
};

const COLOR: &str = "Color must be a valid hex color";

fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

pub fn create(body: &Value) -> Result<CreateTaskTypeRequest, ApiError> {
    let mut v = Validator::new(object(body)?);

    let name = v.required_text("name", &NAME);
    let description = v.nullable_text("description", &DESCRIPTION);
    let color = v.nullable_format("color", is_hex_color, COLOR);

    let Some(name) = name else {
        return Err(v.into_error());
    };
    v.finish()?;

    Ok(CreateTaskTypeRequest {
        name,
        description: description.flatten(),
        color: color.flatten(),
    })
}

pub fn update(body: &Value) -> Result<UpdateTaskTypeRequest, ApiError> {
    let mut v = Validator::new(object(body)?);

    let patch = UpdateTaskTypeRequest {
        name: v.optional_text("name", &NAME),
        description: v.nullable_text("description", &DESCRIPTION),
        color: v.nullable_format("color", is_hex_color, COLOR),
    };
    v.finish()?;
    Ok(patch)
}
