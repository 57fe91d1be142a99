//! Pluggable encoding and decoding collaborators.
//!
//! The template compiler hands bodies and form fields to an [`Encoder`], and turns
//! non-map query-map arguments into entries through a [`QueryMapEncoder`]. Handlers
//! turn responses into return values through a [`Decoder`]. The defaults here cover
//! text and raw bytes; structured formats live in `rustfeign-codec`.

use std::fmt;

use rustfeign_model::{
    EncodeError, FeignError, FeignResult, ParamType, RequestTemplate, Response, Value,
};

/// Writes an object into a request template, normally as its body.
pub trait Encoder: Send + Sync + fmt::Debug {
    /// Encode `object`, declared as `body_type`, into `template`.
    ///
    /// Form encoding passes the form variables as a [`Value::Map`] declared as a
    /// string-keyed map.
    ///
    /// # Errors
    /// Returns an [`EncodeError`] when `object` cannot be represented.
    fn encode(
        &self,
        object: &Value,
        body_type: &ParamType,
        template: &mut RequestTemplate,
    ) -> Result<(), EncodeError>;
}

/// Turns a response into the method's return value.
pub trait Decoder: Send + Sync + fmt::Debug {
    /// Decode `response` as `return_type`.
    ///
    /// # Errors
    /// Returns [`FeignError::Decode`] when the body cannot become `return_type`.
    fn decode(&self, response: Response, return_type: &ParamType) -> FeignResult<Value>;
}

/// Derives query parameters from an arbitrary object.
pub trait QueryMapEncoder: Send + Sync + fmt::Debug {
    /// Ordered `(name, value)` entries for `object`.
    ///
    /// # Errors
    /// Returns an [`EncodeError`] when `object` has no field structure.
    fn encode(&self, object: &Value) -> Result<Vec<(String, Value)>, EncodeError>;
}

/// Encodes strings and bytes as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEncoder;

impl Encoder for DefaultEncoder {
    fn encode(
        &self,
        object: &Value,
        body_type: &ParamType,
        template: &mut RequestTemplate,
    ) -> Result<(), EncodeError> {
        match object {
            Value::Str(s) => template.set_body_text(s.clone()),
            Value::Bytes(b) => template.set_body(b.clone(), None),
            Value::Object(serde_json::Value::String(s)) => template.set_body_text(s.clone()),
            _ => {
                return Err(EncodeError::new(format!(
                    "{body_type} is not a type supported by this encoder"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct DecodeFailure(String);

/// Decodes unit, text, and byte return types.
///
/// Non-2xx responses fail with the status and body text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDecoder;

impl Decoder for DefaultDecoder {
    fn decode(&self, response: Response, return_type: &ParamType) -> FeignResult<Value> {
        if !response.is_success() {
            return Err(status_error(&response));
        }
        match return_type {
            ParamType::Unit => Ok(Value::Null),
            ParamType::String => Ok(Value::Str(
                String::from_utf8_lossy(&response.body).into_owned(),
            )),
            ParamType::Bytes => Ok(Value::Bytes(response.body)),
            other => Err(FeignError::Decode(Box::new(DecodeFailure(format!(
                "{other} is not a type supported by this decoder"
            ))))),
        }
    }
}

/// The decode error reported for a non-2xx response.
#[must_use]
pub fn status_error(response: &Response) -> FeignError {
    let body = String::from_utf8_lossy(&response.body);
    FeignError::Decode(Box::new(DecodeFailure(format!(
        "status {} reading response: {}",
        response.status,
        body.trim()
    ))))
}

/// Reads the top-level fields of a JSON object, skipping nulls.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQueryMapEncoder;

impl QueryMapEncoder for DefaultQueryMapEncoder {
    fn encode(&self, object: &Value) -> Result<Vec<(String, Value)>, EncodeError> {
        match object {
            Value::Map(entries) => Ok(entries.clone()),
            Value::Object(serde_json::Value::Object(fields)) => Ok(fields
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), json_field(v)))
                .collect()),
            other => Err(EncodeError::new(format!(
                "cannot derive query parameters from {other}"
            ))),
        }
    }
}

fn json_field(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Array(items) => Value::List(items.iter().map(json_field).collect()),
        other => Value::Object(other.clone()),
    }
}
