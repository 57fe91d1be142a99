//! Contract scanning, argument binding, and dispatch for RustFeign.
//!
//! An [`InterfaceDescriptor`](rustfeign_model::InterfaceDescriptor) goes through a
//! [`Contract`](contract::Contract) to produce per-method metadata; the
//! [`Dispatcher`](dispatch::Dispatcher) compiles one handler per method and returns
//! a [`Proxy`](dispatch::Proxy) that routes calls into them.

pub mod binder;
pub mod builder;
pub mod codec;
pub mod config;
pub mod contract;
pub mod dispatch;
pub mod handler;
pub mod interceptor;

#[cfg(test)]
mod test_client;

pub use binder::{BindingStrategy, TemplateCompiler};
pub use builder::FeignBuilder;
pub use codec::{Decoder, Encoder, QueryMapEncoder};
pub use config::FeignConfig;
pub use contract::{AnnotationRules, Contract, DeclarativeContract, ParameterContext};
pub use dispatch::{Dispatcher, HandlerTable, Proxy};
pub use handler::{Client, MethodHandler};
pub use interceptor::RequestInterceptor;
