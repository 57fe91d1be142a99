//! Interface descriptors: the explicit, statically built description of a remote API.
//!
//! A descriptor plays the role reflection plays elsewhere. It lists the class-level
//! annotations, the methods, and per-method parameters with their declared types and
//! annotations. The contract scanner walks it, and the dispatcher uses it to build
//! the method table.
//!
//! ```
//! use rustfeign_model::annotations::{Param, RequestLine};
//! use rustfeign_model::descriptor::{InterfaceDescriptor, MethodDescriptor, ParameterDescriptor};
//! use rustfeign_model::types::ParamType;
//!
//! let api = InterfaceDescriptor::new("GitHub").method(
//!     MethodDescriptor::new("repos")
//!         .annotation(RequestLine::new("GET /users/{user}/repos"))
//!         .param(ParameterDescriptor::new(ParamType::String).annotation(Param::new("user")))
//!         .returns(ParamType::list(ParamType::object("Repo"))),
//! );
//! assert_eq!(api.methods().len(), 1);
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::FeignResult;
use crate::types::ParamType;
use crate::value::Value;

/// Upcast helper so annotations can be downcast through `dyn Annotation`.
pub trait AsAny {
    /// Borrow as `dyn Any`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marker for declarative annotations attached to interfaces, methods, and parameters.
///
/// Any `'static` type can be an annotation; contract rules are registered per
/// concrete annotation type.
pub trait Annotation: AsAny + fmt::Debug + Send + Sync + 'static {
    /// Short annotation name used in warnings.
    fn annotation_name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

impl dyn Annotation {
    /// The concrete annotation type.
    #[must_use]
    pub fn annotation_type(&self) -> TypeId {
        Any::type_id(self.as_any())
    }

    /// Downcast to a concrete annotation.
    #[must_use]
    pub fn downcast_ref<T: Annotation>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Whether this annotation is of type `T`.
    #[must_use]
    pub fn is<T: Annotation>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }
}

/// Shared handle to an annotation.
pub type AnnotationRef = Arc<dyn Annotation>;

/// Anything proxy-like that default method bodies can call back into.
pub trait Invoker: Send + Sync {
    /// Invoke the method identified by `key`.
    fn invoke<'a>(&'a self, key: &'a MethodKey, args: Vec<Value>)
    -> BoxFuture<'a, FeignResult<Value>>;

    /// Invoke the single method named `name`.
    fn call<'a>(&'a self, name: &'a str, args: Vec<Value>) -> BoxFuture<'a, FeignResult<Value>>;
}

/// Body of a default interface method, run against the proxy it is bound to.
pub type DefaultBody = Arc<
    dyn Fn(Arc<dyn Invoker>, Vec<Value>) -> BoxFuture<'static, FeignResult<Value>> + Send + Sync,
>;

/// What kind of method a descriptor entry is.
#[derive(Clone)]
pub enum MethodKind {
    /// A method with no body; becomes an HTTP call.
    Abstract,
    /// A method with a default body.
    Default(DefaultBody),
    /// A static helper; never dispatched.
    Static,
    /// A universal object method (equality, hashing, formatting); never produces metadata.
    Object,
}

impl fmt::Debug for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abstract => f.write_str("Abstract"),
            Self::Default(_) => f.write_str("Default(..)"),
            Self::Static => f.write_str("Static"),
            Self::Object => f.write_str("Object"),
        }
    }
}

/// Identity of a method within an interface: its name plus erased parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey {
    /// Method name.
    pub name: String,
    /// Erased parameter type names.
    pub parameter_types: Vec<String>,
}

impl MethodKey {
    /// Create a key from a name and erased parameter type names.
    #[must_use]
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        parameter_types: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.parameter_types.join(","))
    }
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    /// Declared name, when known.
    pub name: Option<String>,
    /// Declared type.
    pub ty: ParamType,
    /// Parameter-level annotations, in declaration order.
    pub annotations: Vec<AnnotationRef>,
}

impl ParameterDescriptor {
    /// A parameter of type `ty` with no name and no annotations.
    #[must_use]
    pub fn new(ty: ParamType) -> Self {
        Self {
            name: None,
            ty,
            annotations: Vec::new(),
        }
    }

    /// Set the declared parameter name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach an annotation.
    #[must_use]
    pub fn annotation(mut self, annotation: impl Annotation + 'static) -> Self {
        self.annotations.push(Arc::new(annotation));
        self
    }
}

/// One declared method.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    /// Method name.
    pub name: String,
    /// Abstract, default, static, or object method.
    pub kind: MethodKind,
    /// Method-level annotations, in declaration order.
    pub annotations: Vec<AnnotationRef>,
    /// Parameters, in declaration order.
    pub parameters: Vec<ParameterDescriptor>,
    /// Declared return type.
    pub return_type: ParamType,
}

impl MethodDescriptor {
    /// An abstract method returning unit.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::Abstract,
            annotations: Vec::new(),
            parameters: Vec::new(),
            return_type: ParamType::Unit,
        }
    }

    /// A method with a default body.
    #[must_use]
    pub fn default_method<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Arc<dyn Invoker>, Vec<Value>) -> BoxFuture<'static, FeignResult<Value>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            kind: MethodKind::Default(Arc::new(body)),
            ..Self::new(name)
        }
    }

    /// Override the method kind.
    #[must_use]
    pub fn kind(mut self, kind: MethodKind) -> Self {
        self.kind = kind;
        self
    }

    /// Attach a method-level annotation.
    #[must_use]
    pub fn annotation(mut self, annotation: impl Annotation + 'static) -> Self {
        self.annotations.push(Arc::new(annotation));
        self
    }

    /// Append a parameter.
    #[must_use]
    pub fn param(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Set the return type.
    #[must_use]
    pub fn returns(mut self, ty: ParamType) -> Self {
        self.return_type = ty;
        self
    }

    /// The method identity.
    #[must_use]
    pub fn key(&self) -> MethodKey {
        MethodKey::new(
            self.name.clone(),
            self.parameters.iter().map(|p| p.ty.erased_name().to_owned()),
        )
    }

    /// Whether this method has a default body.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self.kind, MethodKind::Default(_))
    }
}

/// A declared interface.
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    name: String,
    type_parameters: Vec<String>,
    super_interfaces: Vec<Arc<InterfaceDescriptor>>,
    annotations: Vec<AnnotationRef>,
    methods: Vec<MethodDescriptor>,
}

impl InterfaceDescriptor {
    /// An empty interface with the given simple name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_parameters: Vec::new(),
            super_interfaces: Vec::new(),
            annotations: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Declare a generic type parameter.
    #[must_use]
    pub fn type_parameter(mut self, name: impl Into<String>) -> Self {
        self.type_parameters.push(name.into());
        self
    }

    /// Declare a super-interface.
    #[must_use]
    pub fn extends(mut self, parent: impl Into<Arc<InterfaceDescriptor>>) -> Self {
        self.super_interfaces.push(parent.into());
        self
    }

    /// Attach a class-level annotation.
    #[must_use]
    pub fn annotation(mut self, annotation: impl Annotation + 'static) -> Self {
        self.annotations.push(Arc::new(annotation));
        self
    }

    /// Declare a method.
    #[must_use]
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Simple type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared generic type parameters.
    #[must_use]
    pub fn type_parameters(&self) -> &[String] {
        &self.type_parameters
    }

    /// Directly extended interfaces.
    #[must_use]
    pub fn super_interfaces(&self) -> &[Arc<InterfaceDescriptor>] {
        &self.super_interfaces
    }

    /// Class-level annotations.
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationRef] {
        &self.annotations
    }

    /// Methods declared directly on this interface.
    #[must_use]
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Every public method: own methods followed by inherited ones.
    pub fn all_methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter().chain(
            self.super_interfaces
                .iter()
                .flat_map(|parent| parent.all_methods_boxed()),
        )
    }

    fn all_methods_boxed(&self) -> Box<dyn Iterator<Item = &MethodDescriptor> + '_> {
        Box::new(self.all_methods())
    }

    /// The config key of `method` when invoked through this interface.
    #[must_use]
    pub fn config_key(&self, method: &MethodDescriptor) -> String {
        format!("{}#{}", self.name, method.key())
    }
}
