//! `application/x-www-form-urlencoded` bodies.

use std::sync::Arc;

use rustfeign_core::codec::Encoder;
use rustfeign_model::template::UTF_8;
use rustfeign_model::{EncodeError, ParamType, RequestTemplate, Value};

use crate::json::JsonEncoder;

const CONTENT_TYPE: &str = "Content-Type";

/// Encodes form variables as a url-encoded body and hands everything else on.
///
/// Form parameters reach the encoder as a string-keyed [`Value::Map`]; list
/// values become repeated fields and nulls are left out.
#[derive(Debug, Clone)]
pub struct FormEncoder {
    delegate: Arc<dyn Encoder>,
}

impl Default for FormEncoder {
    fn default() -> Self {
        Self::new(JsonEncoder)
    }
}

impl FormEncoder {
    /// A form encoder passing non-form bodies to `delegate`.
    pub fn new(delegate: impl Encoder + 'static) -> Self {
        Self {
            delegate: Arc::new(delegate),
        }
    }
}

impl Encoder for FormEncoder {
    fn encode(
        &self,
        object: &Value,
        body_type: &ParamType,
        template: &mut RequestTemplate,
    ) -> Result<(), EncodeError> {
        let (Value::Map(fields), true) = (object, body_type.is_string_keyed_map()) else {
            return self.delegate.encode(object, body_type, template);
        };

        let mut form = form_urlencoded::Serializer::new(String::new());
        for (name, value) in fields {
            match value {
                Value::Null => {}
                Value::List(items) => {
                    for item in items.iter().filter_map(Value::to_template_string) {
                        form.append_pair(name, &item);
                    }
                }
                other => {
                    if let Some(text) = other.to_template_string() {
                        form.append_pair(name, &text);
                    }
                }
            }
        }
        template.set_body(form.finish(), Some(UTF_8));
        template.set_header(
            CONTENT_TYPE,
            [format!("{}; charset={UTF_8}", mime::APPLICATION_WWW_FORM_URLENCODED)],
        );
        Ok(())
    }
}
