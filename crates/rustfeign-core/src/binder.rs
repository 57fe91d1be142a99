//! Template compiler: binds call arguments to a method's skeleton template.
//!
//! A [`TemplateCompiler`] is built once per method and is a pure function of the
//! call arguments afterwards. Each call clones the skeleton, so concurrent calls
//! never share a mutable template.
//!
//! The steps, in order:
//!
//! 1. clone the skeleton and attach the target;
//! 2. bind the URI argument as the request target;
//! 3. build the variables from the named parameters, applying expanders per element;
//! 4. resolve the template according to the [`BindingStrategy`];
//! 5. append query-map entries;
//! 6. append header-map entries.

use std::fmt;
use std::sync::Arc;

use rustfeign_model::template::encode_component;
use rustfeign_model::{
    Expander, FeignError, FeignResult, MethodMetadata, NullArgumentKind, ParamType,
    RequestTemplate, Target, Value, Variables,
};

use crate::codec::{Encoder, QueryMapEncoder};

/// How the resolve step treats the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStrategy {
    /// Substitute variables only.
    Resolve,
    /// Hand the form variables to the encoder, then substitute the rest.
    FormEncoded,
    /// Encode the body argument, then substitute the variables.
    BodyEncoded,
}

impl BindingStrategy {
    /// The strategy a method's metadata calls for.
    #[must_use]
    pub fn for_metadata(metadata: &MethodMetadata) -> Self {
        if !metadata.form_params.is_empty() && metadata.template.body_template().is_none() {
            Self::FormEncoded
        } else if metadata.body_index.is_some() {
            Self::BodyEncoded
        } else {
            Self::Resolve
        }
    }
}

/// Builds a fresh [`RequestTemplate`] per call.
pub struct TemplateCompiler {
    metadata: Arc<MethodMetadata>,
    target: Target,
    strategy: BindingStrategy,
    encoder: Arc<dyn Encoder>,
    query_map_encoder: Arc<dyn QueryMapEncoder>,
}

impl TemplateCompiler {
    /// A compiler for `metadata` against `target`.
    #[must_use]
    pub fn new(
        metadata: Arc<MethodMetadata>,
        target: Target,
        encoder: Arc<dyn Encoder>,
        query_map_encoder: Arc<dyn QueryMapEncoder>,
    ) -> Self {
        let strategy = BindingStrategy::for_metadata(&metadata);
        Self {
            metadata,
            target,
            strategy,
            encoder,
            query_map_encoder,
        }
    }

    /// The compiled metadata.
    #[must_use]
    pub fn metadata(&self) -> &MethodMetadata {
        &self.metadata
    }

    /// The target templates are built for.
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The selected strategy.
    #[must_use]
    pub fn strategy(&self) -> BindingStrategy {
        self.strategy
    }

    /// Template variables for `argv`. Null arguments are skipped.
    #[must_use]
    pub fn variables(&self, argv: &[Value]) -> Variables {
        let mut variables = Variables::new();
        for (index, names) in &self.metadata.index_to_name {
            let Some(value) = argv.get(*index).filter(|v| !v.is_null()) else {
                continue;
            };
            let value = match self.metadata.index_to_expander.get(index) {
                Some(expander) => expand_elements(expander.as_ref(), value),
                None => value.clone(),
            };
            for name in names {
                variables.insert(name.clone(), value.clone());
            }
        }
        variables
    }

    /// Build the template for one call.
    ///
    /// # Errors
    /// Fails when the URI or body argument is null, when an encoder fails, or when
    /// the header-map argument is null or not a map.
    pub fn create(&self, argv: &[Value]) -> FeignResult<RequestTemplate> {
        let md = &*self.metadata;
        let mut template = md.template.clone();
        template.set_feign_target(self.target.clone());

        if let Some(index) = md.url_index {
            let url = argv
                .get(index)
                .and_then(Value::to_template_string)
                .ok_or(FeignError::NullArgument {
                    kind: NullArgumentKind::Uri,
                    index,
                })?;
            template.set_target(&url);
        }

        let variables = self.variables(argv);
        self.resolve(argv, &mut template, &variables)?;

        if let Some(index) = md.query_map_index {
            if let Some(argument) = argv.get(index).filter(|v| !v.is_null()) {
                let entries = match argument {
                    Value::Map(entries) => entries.clone(),
                    other => self.query_map_encoder.encode(other)?,
                };
                add_query_map(&mut template, &entries, md.query_map_encoded);
            }
        }

        if let Some(index) = md.header_map_index {
            match argv.get(index) {
                Some(Value::Map(entries)) => add_header_map(&mut template, entries),
                other => {
                    let found = other.map_or_else(|| "nothing".to_owned(), ToString::to_string);
                    return Err(FeignError::invalid_argument(
                        md.config_key.clone(),
                        format!("header map argument must be a map, got {found}"),
                    ));
                }
            }
        }

        Ok(template)
    }

    fn resolve(
        &self,
        argv: &[Value],
        template: &mut RequestTemplate,
        variables: &Variables,
    ) -> FeignResult<()> {
        let md = &*self.metadata;
        match self.strategy {
            BindingStrategy::Resolve => template.resolve(variables),
            BindingStrategy::FormEncoded => {
                let (form, rest) =
                    variables.partition(|name| md.form_params.iter().any(|p| p == name));
                self.encoder
                    .encode(&form.into_value(), &ParamType::string_map(), template)?;
                template.resolve(&rest);
            }
            BindingStrategy::BodyEncoded => {
                let body_index = md.body_index.unwrap_or_default();
                let body = argv
                    .get(body_index)
                    .filter(|v| !v.is_null())
                    .ok_or(FeignError::NullArgument {
                        kind: NullArgumentKind::Body,
                        index: body_index,
                    })?;
                let body_type = md.body_type.clone().unwrap_or(ParamType::Unit);
                self.encoder.encode(body, &body_type, template)?;
                template.resolve(variables);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for TemplateCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateCompiler")
            .field("config_key", &self.metadata.config_key)
            .field("target", &self.target)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

/// Apply `expander` to a scalar, or to each non-null element of a list.
fn expand_elements(expander: &dyn Expander, value: &Value) -> Value {
    match value {
        Value::List(items) => Value::List(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| Value::Str(expander.expand(item)))
                .collect(),
        ),
        scalar => Value::Str(expander.expand(scalar)),
    }
}

fn entry_strings(value: &Value) -> Vec<String> {
    match value {
        Value::List(items) => items.iter().filter_map(Value::to_template_string).collect(),
        other => other.to_template_string().into_iter().collect(),
    }
}

fn add_query_map(template: &mut RequestTemplate, entries: &[(String, Value)], encoded: bool) {
    for (name, value) in entries {
        let values = entry_strings(value);
        if values.is_empty() {
            continue;
        }
        if encoded {
            template.query(name, values);
        } else {
            template.query(
                &encode_component(name),
                values.iter().map(|v| encode_component(v)),
            );
        }
    }
}

fn add_header_map(template: &mut RequestTemplate, entries: &[(String, Value)]) {
    for (name, value) in entries {
        let values = entry_strings(value);
        if !values.is_empty() {
            template.header(name, values);
        }
    }
}
