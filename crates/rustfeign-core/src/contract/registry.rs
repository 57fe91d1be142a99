//! Annotation rule registry.
//!
//! Rules are keyed by the concrete annotation type and live on one of three levels.
//! The scanner looks each annotation up here and never inspects annotation types
//! itself, so new kinds are added by registering rules.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rustfeign_model::{
    Annotation, FeignResult, InterfaceDescriptor, MethodDescriptor, MethodMetadata,
    ParameterDescriptor,
};

type ClassRule = Arc<
    dyn Fn(&dyn Annotation, &mut MethodMetadata, &InterfaceDescriptor) -> FeignResult<()>
        + Send
        + Sync,
>;
type MethodRule = Arc<
    dyn Fn(&dyn Annotation, &mut MethodMetadata, &MethodDescriptor) -> FeignResult<()>
        + Send
        + Sync,
>;
type ParameterRule =
    Arc<dyn Fn(&dyn Annotation, &mut ParameterContext<'_>) -> FeignResult<()> + Send + Sync>;

/// What a parameter rule sees: the metadata under construction and the parameter.
#[derive(Debug)]
pub struct ParameterContext<'a> {
    /// Metadata of the enclosing method.
    pub metadata: &'a mut MethodMetadata,
    /// Parameter position.
    pub index: usize,
    /// The parameter declaration.
    pub parameter: &'a ParameterDescriptor,
}

impl ParameterContext<'_> {
    /// Bind this parameter to template variable `name`.
    pub fn name_param(&mut self, name: &str) {
        self.metadata.name_param(self.index, name);
    }

    /// Config key of the enclosing method.
    #[must_use]
    pub fn config_key(&self) -> &str {
        &self.metadata.config_key
    }
}

/// Class, method, and parameter rules keyed by annotation type.
#[derive(Default, Clone)]
pub struct AnnotationRules {
    class: HashMap<TypeId, ClassRule>,
    method: HashMap<TypeId, MethodRule>,
    parameter: HashMap<TypeId, ParameterRule>,
}

impl AnnotationRules {
    /// A registry with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the class-level rule for `A`.
    pub fn register_class<A, F>(&mut self, rule: F)
    where
        A: Annotation + 'static,
        F: Fn(&A, &mut MethodMetadata, &InterfaceDescriptor) -> FeignResult<()>
            + Send
            + Sync
            + 'static,
    {
        self.class.insert(
            TypeId::of::<A>(),
            Arc::new(move |ann, md, iface| match ann.downcast_ref::<A>() {
                Some(a) => rule(a, md, iface),
                None => Ok(()),
            }),
        );
    }

    /// Register (or replace) the method-level rule for `A`.
    pub fn register_method<A, F>(&mut self, rule: F)
    where
        A: Annotation + 'static,
        F: Fn(&A, &mut MethodMetadata, &MethodDescriptor) -> FeignResult<()>
            + Send
            + Sync
            + 'static,
    {
        self.method.insert(
            TypeId::of::<A>(),
            Arc::new(move |ann, md, method| match ann.downcast_ref::<A>() {
                Some(a) => rule(a, md, method),
                None => Ok(()),
            }),
        );
    }

    /// Register (or replace) the parameter-level rule for `A`.
    pub fn register_parameter<A, F>(&mut self, rule: F)
    where
        A: Annotation + 'static,
        F: Fn(&A, &mut ParameterContext<'_>) -> FeignResult<()> + Send + Sync + 'static,
    {
        self.parameter.insert(
            TypeId::of::<A>(),
            Arc::new(move |ann, ctx| match ann.downcast_ref::<A>() {
                Some(a) => rule(a, ctx),
                None => Ok(()),
            }),
        );
    }

    /// Apply the class rule for `annotation`; returns whether one was registered.
    pub(crate) fn apply_class(
        &self,
        annotation: &dyn Annotation,
        metadata: &mut MethodMetadata,
        interface: &InterfaceDescriptor,
    ) -> FeignResult<bool> {
        match self.class.get(&annotation.annotation_type()) {
            Some(rule) => rule(annotation, metadata, interface).map(|()| true),
            None => Ok(false),
        }
    }

    /// Apply the method rule for `annotation`; returns whether one was registered.
    pub(crate) fn apply_method(
        &self,
        annotation: &dyn Annotation,
        metadata: &mut MethodMetadata,
        method: &MethodDescriptor,
    ) -> FeignResult<bool> {
        match self.method.get(&annotation.annotation_type()) {
            Some(rule) => rule(annotation, metadata, method).map(|()| true),
            None => Ok(false),
        }
    }

    /// Apply the parameter rule for `annotation`; returns whether one was registered.
    pub(crate) fn apply_parameter(
        &self,
        annotation: &dyn Annotation,
        context: &mut ParameterContext<'_>,
    ) -> FeignResult<bool> {
        match self.parameter.get(&annotation.annotation_type()) {
            Some(rule) => rule(annotation, context).map(|()| true),
            None => Ok(false),
        }
    }

    /// Number of registered rules across all levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.class.len() + self.method.len() + self.parameter.len()
    }

    /// Whether no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for AnnotationRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationRules")
            .field("class", &self.class.len())
            .field("method", &self.method.len())
            .field("parameter", &self.parameter.len())
            .finish()
    }
}
