//! Contract: turns an annotated interface into per-method [`MethodMetadata`].
//!
//! [`DeclarativeContract`] walks an [`InterfaceDescriptor`] and feeds every class,
//! method, and parameter annotation to the rule registered for its type in
//! [`AnnotationRules`]. The scan itself only enforces the structural rules:
//!
//! 1. no generic type parameters, at most one super-interface, at most one level of
//!    inheritance;
//! 2. object, static, and default methods produce no metadata;
//! 3. class annotations of the super-interface apply before the type's own;
//! 4. every abstract method resolves an HTTP verb unless it is ignored;
//! 5. unbound parameters that are neither URIs nor request options become the body,
//!    and a body excludes form parameters;
//! 6. query maps and header maps are keyed by strings;
//! 7. config keys are unique;
//! 8. an inherited abstract method that the interface overrides with a default
//!    method produces no metadata.

mod default_rules;
mod mapping;
mod registry;

use std::collections::HashSet;
use std::fmt;

use rustfeign_model::{
    FeignError, FeignResult, InterfaceDescriptor, MethodDescriptor, MethodKind, MethodMetadata,
    ParamType, ParameterDescriptor, ViolationKind,
};
use tracing::{debug, warn};

pub use registry::{AnnotationRules, ParameterContext};

/// Extracts and validates request metadata from an interface.
pub trait Contract: Send + Sync + fmt::Debug {
    /// One [`MethodMetadata`] per abstract method of `interface`, in method order.
    ///
    /// # Errors
    /// Returns a contract violation for the first structural rule broken.
    fn parse_and_validate(&self, interface: &InterfaceDescriptor)
    -> FeignResult<Vec<MethodMetadata>>;
}

/// A contract driven entirely by registered annotation rules.
#[derive(Debug, Clone)]
pub struct DeclarativeContract {
    rules: AnnotationRules,
}

impl Default for DeclarativeContract {
    /// The native rule set.
    fn default() -> Self {
        let mut rules = AnnotationRules::new();
        default_rules::register(&mut rules);
        Self { rules }
    }
}

impl DeclarativeContract {
    /// A contract with no rules at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: AnnotationRules::new(),
        }
    }

    /// A contract understanding only the mapping-style annotations.
    #[must_use]
    pub fn mapping(decode_slash: bool) -> Self {
        Self::empty().with_mapping_rules(decode_slash)
    }

    /// Add the mapping-style rules to this contract.
    #[must_use]
    pub fn with_mapping_rules(mut self, decode_slash: bool) -> Self {
        mapping::register(&mut self.rules, decode_slash);
        self
    }

    /// The rule registry, for registering extensions.
    pub fn rules_mut(&mut self) -> &mut AnnotationRules {
        &mut self.rules
    }

    /// The rule registry.
    #[must_use]
    pub fn rules(&self) -> &AnnotationRules {
        &self.rules
    }

    fn check_type(interface: &InterfaceDescriptor) -> FeignResult<()> {
        let name = interface.name();
        if !interface.type_parameters().is_empty() {
            return Err(FeignError::contract(
                ViolationKind::ParameterizedType,
                name,
                format!("Parameterized types unsupported: {name}"),
            ));
        }
        match interface.super_interfaces() {
            [] => Ok(()),
            [parent] if parent.super_interfaces().is_empty() => Ok(()),
            [_] => Err(FeignError::contract(
                ViolationKind::MultiLevelInheritance,
                name,
                format!("Only single-level inheritance supported: {name}"),
            )),
            _ => Err(FeignError::contract(
                ViolationKind::MultipleInheritance,
                name,
                format!("Only single inheritance supported: {name}"),
            )),
        }
    }

    fn process_class(
        &self,
        md: &mut MethodMetadata,
        interface: &InterfaceDescriptor,
    ) -> FeignResult<()> {
        for annotation in interface.annotations() {
            self.rules.apply_class(annotation.as_ref(), md, interface)?;
        }
        Ok(())
    }

    fn process_parameter(
        &self,
        md: &mut MethodMetadata,
        index: usize,
        parameter: &ParameterDescriptor,
    ) -> FeignResult<()> {
        let mut is_http_annotation = false;
        let mut ctx = ParameterContext {
            metadata: &mut *md,
            index,
            parameter,
        };
        for annotation in &parameter.annotations {
            is_http_annotation |= self.rules.apply_parameter(annotation.as_ref(), &mut ctx)?;
        }

        if parameter.ty == ParamType::Uri {
            md.url_index = Some(index);
        } else if !is_http_annotation && parameter.ty != ParamType::Options {
            if md.is_bound(index) {
                if !md.form_params.is_empty() && md.body_index.is_some() {
                    return Err(body_form_conflict(md));
                }
            } else {
                if !md.form_params.is_empty() {
                    return Err(body_form_conflict(md));
                }
                if md.body_index.is_some() {
                    return Err(FeignError::contract(
                        ViolationKind::TooManyBodyParameters,
                        md.config_key.clone(),
                        format!(
                            "Method has too many Body parameters: {}{}",
                            md.method_key,
                            warnings_suffix(md)
                        ),
                    ));
                }
                md.body_index = Some(index);
                md.body_type = Some(parameter.ty.clone());
            }
        }
        Ok(())
    }

    fn check_maps(md: &MethodMetadata) -> FeignResult<()> {
        if let Some(index) = md.header_map_index {
            let ty = &md.parameter_types[index];
            if !ty.is_string_keyed_map() {
                return Err(FeignError::contract(
                    ViolationKind::InvalidMapKeyType,
                    md.config_key.clone(),
                    format!("HeaderMap parameter must be a map keyed by String, found {ty}"),
                ));
            }
        }
        if let Some(index) = md.query_map_index {
            let ty = &md.parameter_types[index];
            if ty.is_map() && !ty.is_string_keyed_map() {
                return Err(FeignError::contract(
                    ViolationKind::InvalidMapKeyType,
                    md.config_key.clone(),
                    format!("QueryMap key must be a String, found {ty}"),
                ));
            }
        }
        Ok(())
    }

    fn parse_method(
        &self,
        interface: &InterfaceDescriptor,
        method: &MethodDescriptor,
    ) -> FeignResult<MethodMetadata> {
        let mut md = MethodMetadata::new(
            interface.config_key(method),
            method.key(),
            method.return_type.clone(),
            method.parameters.iter().map(|p| p.ty.clone()).collect(),
        );

        if let Some(parent) = interface.super_interfaces().first() {
            self.process_class(&mut md, parent)?;
        }
        self.process_class(&mut md, interface)?;

        for annotation in &method.annotations {
            if !self.rules.apply_method(annotation.as_ref(), &mut md, method)? {
                md.add_warning(format!(
                    " Method {} has an annotation {} that is not used by this contract",
                    method.name,
                    annotation.annotation_name()
                ));
            }
        }
        for warning in &md.warnings {
            warn!(config_key = %md.config_key, warning = warning.trim(), "unused annotation");
        }

        if md.ignored {
            debug!(config_key = %md.config_key, "method ignored by contract");
            return Ok(md);
        }

        if md.template.method().is_none() {
            return Err(FeignError::contract(
                ViolationKind::MissingHttpMethod,
                md.config_key.clone(),
                format!(
                    "Method {} not annotated with HTTP method type (ex. GET, POST){}",
                    method.name,
                    warnings_suffix(&md)
                ),
            ));
        }

        for (index, parameter) in method.parameters.iter().enumerate() {
            self.process_parameter(&mut md, index, parameter)?;
        }

        if md.body_index.is_some() && !md.form_params.is_empty() {
            return Err(body_form_conflict(&md));
        }
        Self::check_maps(&md)?;

        debug!(
            config_key = %md.config_key,
            method = ?md.template.method(),
            uri = md.template.path(),
            body_index = ?md.body_index,
            form_params = md.form_params.len(),
            "parsed method metadata"
        );
        Ok(md)
    }
}

impl Contract for DeclarativeContract {
    fn parse_and_validate(
        &self,
        interface: &InterfaceDescriptor,
    ) -> FeignResult<Vec<MethodMetadata>> {
        Self::check_type(interface)?;

        let mut seen = HashSet::new();
        let mut overridden = HashSet::new();
        let mut result = Vec::new();
        for method in interface.all_methods() {
            match method.kind {
                MethodKind::Abstract => {}
                MethodKind::Default(_) => {
                    overridden.insert(method.key());
                    continue;
                }
                MethodKind::Static | MethodKind::Object => continue,
            }
            if overridden.contains(&method.key()) {
                debug!(method = %method.key(), "inherited method overridden by a default");
                continue;
            }
            let md = self.parse_method(interface, method)?;
            if !seen.insert(md.config_key.clone()) {
                return Err(FeignError::contract(
                    ViolationKind::DuplicateConfigKey,
                    md.config_key.clone(),
                    format!("Overrides unsupported: {}", md.config_key),
                ));
            }
            result.push(md);
        }
        Ok(result)
    }
}

fn warnings_suffix(md: &MethodMetadata) -> String {
    md.warnings.concat()
}

fn body_form_conflict(md: &MethodMetadata) -> FeignError {
    FeignError::contract(
        ViolationKind::BodyFormConflict,
        md.config_key.clone(),
        format!(
            "Body parameters cannot be used with form parameters.{}",
            warnings_suffix(md)
        ),
    )
}
