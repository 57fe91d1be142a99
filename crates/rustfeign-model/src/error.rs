//! Error taxonomy shared by the contract scanner, template compiler, and dispatcher.
//!
//! Build-time failures are always a [`ContractViolation`] carrying the offending
//! config key. Per-call failures (null required arguments, encoder failures,
//! invocations of ignored methods) are separate [`FeignError`] variants so callers
//! can tell "the interface is broken" apart from "this call is broken".

use std::fmt;

/// The structural rule a [`ContractViolation`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ViolationKind {
    /// The interface declares generic type parameters.
    ParameterizedType,
    /// The interface extends more than one interface.
    MultipleInheritance,
    /// The single super-interface itself extends another interface.
    MultiLevelInheritance,
    /// Two methods produced the same config key.
    DuplicateConfigKey,
    /// A body parameter was combined with form parameters.
    BodyFormConflict,
    /// More than one parameter qualified as the request body.
    TooManyBodyParameters,
    /// No HTTP verb was resolved for the method.
    MissingHttpMethod,
    /// A query-map or header-map parameter is not keyed by strings.
    InvalidMapKeyType,
    /// More than one parameter was marked as query map.
    DuplicateQueryMap,
    /// More than one parameter was marked as header map.
    DuplicateHeaderMap,
    /// An annotation carried an empty or malformed value.
    InvalidAnnotation,
    /// An expander could not be constructed.
    ExpanderConstruction,
}

impl ViolationKind {
    /// Returns the rule name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParameterizedType => "ParameterizedType",
            Self::MultipleInheritance => "MultipleInheritance",
            Self::MultiLevelInheritance => "MultiLevelInheritance",
            Self::DuplicateConfigKey => "DuplicateConfigKey",
            Self::BodyFormConflict => "BodyFormConflict",
            Self::TooManyBodyParameters => "TooManyBodyParameters",
            Self::MissingHttpMethod => "MissingHttpMethod",
            Self::InvalidMapKeyType => "InvalidMapKeyType",
            Self::DuplicateQueryMap => "DuplicateQueryMap",
            Self::DuplicateHeaderMap => "DuplicateHeaderMap",
            Self::InvalidAnnotation => "InvalidAnnotation",
            Self::ExpanderConstruction => "ExpanderConstruction",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural rule broken by an interface declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} ({config_key}): {message}")]
pub struct ContractViolation {
    /// Which rule was broken.
    pub kind: ViolationKind,
    /// The config key (or interface name for type-level rules) that broke it.
    pub config_key: String,
    /// Human-readable rule description.
    pub message: String,
}

impl ContractViolation {
    /// Create a new violation.
    #[must_use]
    pub fn new(
        kind: ViolationKind,
        config_key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            config_key: config_key.into(),
            message: message.into(),
        }
    }
}

/// Which required argument was null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullArgumentKind {
    /// The URI-typed parameter.
    Uri,
    /// The body parameter.
    Body,
}

impl fmt::Display for NullArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri => f.write_str("URI"),
            Self::Body => f.write_str("Body"),
        }
    }
}

/// An encoder or query-map encoder failure.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct EncodeError {
    /// Description of what could not be encoded.
    pub message: String,
    /// The underlying cause, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl EncodeError {
    /// Create an encode error without an underlying cause.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying cause.
    #[must_use]
    pub fn wrap(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

/// Top-level error type for building and invoking clients.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FeignError {
    /// The interface declaration broke a structural rule.
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),

    /// A required argument was null at call time.
    #[error("{kind} parameter {index} was null")]
    NullArgument {
        /// Which role the argument plays.
        kind: NullArgumentKind,
        /// Its parameter position.
        index: usize,
    },

    /// A body, form, or query-map encoder failed.
    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),

    /// The invoked method was marked ignored by the contract.
    #[error("{config_key} is not a method handled by this client")]
    UnsupportedMethod {
        /// Config key of the ignored method.
        config_key: String,
    },

    /// No handler is registered for the invoked method.
    #[error("no handler for method {0}")]
    UnknownMethod(String),

    /// More than one method matches the given name.
    #[error("method name {0} is overloaded; invoke it by method key")]
    AmbiguousMethod(String),

    /// A default method was invoked before its proxy was bound.
    #[error("default method {0} is not bound to a proxy")]
    UnboundDefaultMethod(String),

    /// The call arguments do not fit the method shape.
    #[error("invalid argument for {config_key}: {message}")]
    InvalidArgument {
        /// Config key of the invoked method.
        config_key: String,
        /// What was wrong.
        message: String,
    },

    /// The finished request could not be represented.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transport collaborator failed.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The decoder collaborator failed.
    #[error("decode error: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FeignError {
    /// Shorthand for a contract violation.
    #[must_use]
    pub fn contract(
        kind: ViolationKind,
        config_key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Contract(ContractViolation::new(kind, config_key, message))
    }

    /// Shorthand for an invalid argument.
    #[must_use]
    pub fn invalid_argument(config_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            config_key: config_key.into(),
            message: message.into(),
        }
    }

    /// The violation kind, when this is a contract violation.
    #[must_use]
    pub fn violation_kind(&self) -> Option<ViolationKind> {
        match self {
            Self::Contract(v) => Some(v.kind),
            _ => None,
        }
    }
}

/// Convenience result type.
pub type FeignResult<T> = Result<T, FeignError>;
