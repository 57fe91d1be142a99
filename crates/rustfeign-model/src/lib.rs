//! Model types for RustFeign.
//!
//! This crate holds the passive data shared by the contract scanner, the template
//! compiler, and the dispatcher: interface descriptors and annotations, compiled
//! [`MethodMetadata`], the per-call [`RequestTemplate`], and the error taxonomy.

pub mod annotations;
pub mod descriptor;
pub mod error;
pub mod expander;
pub mod metadata;
pub mod multimap;
pub mod request;
pub mod target;
pub mod template;
pub mod types;
pub mod value;

pub use descriptor::{
    Annotation, AnnotationRef, InterfaceDescriptor, Invoker, MethodDescriptor, MethodKey,
    MethodKind, ParameterDescriptor,
};
pub use error::{
    ContractViolation, EncodeError, FeignError, FeignResult, NullArgumentKind, ViolationKind,
};
pub use expander::{Expander, ExpanderFactory, FnExpander, ToStringExpander};
pub use metadata::MethodMetadata;
pub use multimap::Multimap;
pub use request::{Request, Response};
pub use target::Target;
pub use template::{RequestTemplate, Variables};
pub use types::{CollectionFormat, HttpMethod, ParamType, RequestOptions};
pub use value::Value;
