//! TOML conversions
//!
//! Material and scene files describe property values in TOML. Float arrays
//! map by length: 2/3/4 become vectors, 16 a column-major matrix, anything
//! else stays a flat float array.

use crate::Value;
use glam::{Mat4, Vec2, Vec3, Vec4};
use lantern_core::{LanternError, Result};

/// Convert a TOML value into an engine [`Value`]. `property` is only used
/// in error messages.
pub fn value_from_toml(property: &str, value: &toml::Value) -> Result<Value> {
    let err =
        |detail: &str| LanternError::ParseError(format!("property {property}: {detail}"));

    match value {
        toml::Value::Boolean(v) => Ok(Value::Bool(*v)),
        toml::Value::Integer(v) => Ok(Value::Int(
            i32::try_from(*v).map_err(|_| err("integer out of range"))?,
        )),
        toml::Value::Float(v) => Ok(Value::Float(*v as f32)),
        toml::Value::String(v) => Ok(Value::String(v.clone())),
        toml::Value::Array(items) => {
            let floats: Option<Vec<f32>> = items
                .iter()
                .map(|item| match item {
                    toml::Value::Float(v) => Some(*v as f32),
                    toml::Value::Integer(v) => Some(*v as f32),
                    _ => None,
                })
                .collect();
            let floats = floats.ok_or_else(|| err("arrays must hold numbers"))?;
            Ok(match floats.len() {
                2 => Value::Vec2(Vec2::from_slice(&floats)),
                3 => Value::Vec3(Vec3::from_slice(&floats)),
                4 => Value::Vec4(Vec4::from_slice(&floats)),
                16 => Value::Mat4(Mat4::from_cols_slice(&floats)),
                _ => Value::FloatArray(floats),
            })
        }
        _ => Err(err("unsupported value type")),
    }
}

/// Convert an engine [`Value`] back to TOML. Texture ids are runtime-only
/// and return `None`.
pub fn value_to_toml(value: &Value) -> Option<toml::Value> {
    let floats = |values: &[f32]| {
        toml::Value::Array(
            values
                .iter()
                .map(|v| toml::Value::Float(f64::from(*v)))
                .collect(),
        )
    };

    Some(match value {
        Value::Bool(v) => toml::Value::Boolean(*v),
        Value::Int(v) => toml::Value::Integer(i64::from(*v)),
        Value::UInt(v) => toml::Value::Integer(i64::from(*v)),
        Value::Float(v) => toml::Value::Float(f64::from(*v)),
        Value::Vec2(v) => floats(&v.to_array()),
        Value::Vec3(v) => floats(&v.to_array()),
        Value::Vec4(v) => floats(&v.to_array()),
        Value::Mat4(v) => floats(&v.to_cols_array()),
        Value::FloatArray(v) => floats(v),
        Value::String(v) => toml::Value::String(v.clone()),
        Value::Texture(_) => return None,
    })
}
