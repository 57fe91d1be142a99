//! JSON bodies through `serde_json`.

use rustfeign_core::codec::{Decoder, Encoder, status_error};
use rustfeign_model::template::UTF_8;
use rustfeign_model::{EncodeError, FeignResult, ParamType, RequestTemplate, Response, Value};
use tracing::debug;

use crate::error::CodecError;

const CONTENT_TYPE: &str = "Content-Type";

/// Serialises the body argument as JSON.
///
/// Sets `Content-Type: application/json` unless the template already declares one.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn encode(
        &self,
        object: &Value,
        _body_type: &ParamType,
        template: &mut RequestTemplate,
    ) -> Result<(), EncodeError> {
        let body = serde_json::to_vec(&object.to_json()).map_err(CodecError::from)?;
        template.set_body(body, Some(UTF_8));
        if !template.headers().contains(CONTENT_TYPE) {
            template.header(CONTENT_TYPE, [mime::APPLICATION_JSON.as_ref()]);
        }
        Ok(())
    }
}

/// Parses response bodies as JSON and shapes them by the declared return type.
///
/// An empty body decodes to [`Value::Null`]. Non-2xx responses fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode(&self, response: Response, return_type: &ParamType) -> FeignResult<Value> {
        if !response.is_success() {
            return Err(status_error(&response));
        }
        match return_type {
            ParamType::Unit => return Ok(Value::Null),
            ParamType::Bytes => return Ok(Value::Bytes(response.body)),
            _ => {}
        }
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        debug!(
            status = response.status,
            bytes = response.body.len(),
            %return_type,
            "decoding json"
        );
        let document: serde_json::Value =
            serde_json::from_slice(&response.body).map_err(CodecError::from)?;
        Ok(shape(document, return_type)?)
    }
}

fn kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn mismatch(expected: &ParamType, json: &serde_json::Value) -> CodecError {
    CodecError::Mismatch {
        expected: expected.to_string(),
        found: kind(json).to_owned(),
    }
}

/// Convert `json` into a [`Value`] of the declared type.
fn shape(json: serde_json::Value, ty: &ParamType) -> Result<Value, CodecError> {
    use serde_json::Value as Json;

    match (ty, json) {
        (_, Json::Null) => Ok(Value::Null),
        (ParamType::String, Json::String(s)) => Ok(Value::Str(s)),
        (ParamType::String, other) => Ok(Value::Str(other.to_string())),
        (ParamType::Integer, json) => {
            json.as_i64().map(Value::Int).ok_or_else(|| mismatch(ty, &json))
        }
        (ParamType::Float, json) => {
            json.as_f64().map(Value::Float).ok_or_else(|| mismatch(ty, &json))
        }
        (ParamType::Boolean, Json::Bool(b)) => Ok(Value::Bool(b)),
        (ParamType::List(elem), Json::Array(items)) => items
            .into_iter()
            .map(|item| shape(item, elem))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        (ParamType::Map { value, .. }, Json::Object(fields)) => fields
            .into_iter()
            .map(|(k, v)| shape(v, value).map(|v| (k, v)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Map),
        (ParamType::Object(_), json) => Ok(Value::Object(json)),
        (_, json) => Err(mismatch(ty, &json)),
    }
}
