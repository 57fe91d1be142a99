//! Compiled per-method request shape.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::MethodKey;
use crate::expander::Expander;
use crate::template::RequestTemplate;
use crate::types::ParamType;

/// Everything needed to turn one call of a method into a request.
///
/// Produced by a contract, then owned read-only by the method's handler.
#[derive(Clone)]
pub struct MethodMetadata {
    /// `Interface#method(T1,T2)`.
    pub config_key: String,
    /// `method(T1,T2)`.
    pub method_key: MethodKey,
    /// Skeleton request template.
    pub template: RequestTemplate,
    /// Parameter position to the template variables it satisfies.
    pub index_to_name: BTreeMap<usize, Vec<String>>,
    /// Parameter position to the expander converting its value.
    pub index_to_expander: BTreeMap<usize, Arc<dyn Expander>>,
    /// Position of the body parameter.
    pub body_index: Option<usize>,
    /// Declared type of the body parameter.
    pub body_type: Option<ParamType>,
    /// Position of the URI parameter overriding the target.
    pub url_index: Option<usize>,
    /// Position of the query-map parameter.
    pub query_map_index: Option<usize>,
    /// Whether query-map entries are already percent-encoded.
    pub query_map_encoded: bool,
    /// Position of the header-map parameter.
    pub header_map_index: Option<usize>,
    /// Variable names bound to form fields instead of the URL or headers.
    pub form_params: Vec<String>,
    /// Whether invoking the method must fail.
    pub ignored: bool,
    /// Problems found while scanning that did not abort it.
    pub warnings: Vec<String>,
    /// Declared return type.
    pub return_type: ParamType,
    /// Declared parameter types, in order.
    pub parameter_types: Vec<ParamType>,
}

impl MethodMetadata {
    /// Empty metadata for one method.
    #[must_use]
    pub fn new(
        config_key: impl Into<String>,
        method_key: MethodKey,
        return_type: ParamType,
        parameter_types: Vec<ParamType>,
    ) -> Self {
        Self {
            config_key: config_key.into(),
            method_key,
            template: RequestTemplate::new(),
            index_to_name: BTreeMap::new(),
            index_to_expander: BTreeMap::new(),
            body_index: None,
            body_type: None,
            url_index: None,
            query_map_index: None,
            query_map_encoded: false,
            header_map_index: None,
            form_params: Vec::new(),
            ignored: false,
            warnings: Vec::new(),
            return_type,
            parameter_types,
        }
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameter_types.len()
    }

    /// Bind parameter `index` to variable `name`.
    pub fn name_param(&mut self, index: usize, name: &str) {
        let names = self.index_to_name.entry(index).or_default();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }

    /// Record `name` as a form parameter.
    pub fn add_form_param(&mut self, name: &str) {
        if !self.form_params.iter().any(|n| n == name) {
            self.form_params.push(name.to_owned());
        }
    }

    /// Record a non-fatal scanning problem.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Whether `index` already has a special or named role.
    #[must_use]
    pub fn is_bound(&self, index: usize) -> bool {
        self.index_to_name.contains_key(&index)
            || self.url_index == Some(index)
            || self.body_index == Some(index)
            || self.query_map_index == Some(index)
            || self.header_map_index == Some(index)
    }
}

impl fmt::Debug for MethodMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodMetadata")
            .field("config_key", &self.config_key)
            .field("template", &self.template)
            .field("index_to_name", &self.index_to_name)
            .field(
                "index_to_expander",
                &self.index_to_expander.keys().collect::<Vec<_>>(),
            )
            .field("body_index", &self.body_index)
            .field("url_index", &self.url_index)
            .field("query_map_index", &self.query_map_index)
            .field("header_map_index", &self.header_map_index)
            .field("form_params", &self.form_params)
            .field("ignored", &self.ignored)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}
