//! Dispatcher: builds the handler table for a target and the proxy routing into it.
//!
//! The one-time build runs the contract, compiles one handler per config key, walks
//! every method of the interface to key the dispatch table by [`MethodKey`], and
//! finally binds default-method handlers to the finished proxy. The proxy and
//! everything it owns are immutable afterwards.

use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use futures::future::BoxFuture;
use rustfeign_model::{
    FeignError, FeignResult, Invoker, MethodKey, MethodKind, RequestOptions, Target, Value,
};
use tracing::{debug, info};

use crate::binder::TemplateCompiler;
use crate::codec::{Decoder, Encoder, QueryMapEncoder};
use crate::contract::Contract;
use crate::handler::{
    Client, DefaultMethodHandler, HttpMethodHandler, MethodHandler, UnsupportedMethodHandler,
};
use crate::interceptor::RequestInterceptor;

const EQUALS: &str = "equals";
const HASH_CODE: &str = "hashCode";
const TO_STRING: &str = "toString";

/// Compiled handlers keyed by config key.
pub type HandlerTable = BTreeMap<String, Arc<dyn MethodHandler>>;

/// Collaborators shared by every handler a dispatcher builds.
#[derive(Clone)]
pub struct Dispatcher {
    pub(crate) contract: Arc<dyn Contract>,
    pub(crate) encoder: Arc<dyn Encoder>,
    pub(crate) decoder: Arc<dyn Decoder>,
    pub(crate) query_map_encoder: Arc<dyn QueryMapEncoder>,
    pub(crate) client: Arc<dyn Client>,
    pub(crate) interceptors: Arc<[Arc<dyn RequestInterceptor>]>,
    pub(crate) options: RequestOptions,
}

impl Dispatcher {
    /// Run the contract and compile one handler per config key.
    ///
    /// Ignored methods get a handler that always fails.
    ///
    /// # Errors
    /// Returns the contract violation that prevents building.
    pub fn handlers_by_config_key(&self, target: &Target) -> FeignResult<HandlerTable> {
        let metadata = self.contract.parse_and_validate(target.interface())?;
        let mut table = HandlerTable::new();
        for md in metadata {
            let config_key = md.config_key.clone();
            let handler: Arc<dyn MethodHandler> = if md.ignored {
                Arc::new(UnsupportedMethodHandler::new(config_key.clone()))
            } else {
                let compiler = TemplateCompiler::new(
                    Arc::new(md),
                    target.clone(),
                    Arc::clone(&self.encoder),
                    Arc::clone(&self.query_map_encoder),
                );
                debug!(
                    config_key = %config_key,
                    strategy = ?compiler.strategy(),
                    "compiled handler"
                );
                Arc::new(HttpMethodHandler::new(
                    compiler,
                    Arc::clone(&self.client),
                    Arc::clone(&self.decoder),
                    Arc::clone(&self.interceptors),
                    self.options,
                ))
            };
            table.insert(config_key, handler);
        }
        Ok(table)
    }

    /// Build the proxy for `target`.
    ///
    /// # Errors
    /// Returns the contract violation that prevents building; no proxy is created.
    pub fn new_instance(&self, target: Target) -> FeignResult<Proxy> {
        let by_config_key = self.handlers_by_config_key(&target)?;
        let interface = Arc::clone(target.interface());

        let mut dispatch: HashMap<MethodKey, Arc<dyn MethodHandler>> = HashMap::new();
        let mut defaults = Vec::new();
        for method in interface.all_methods() {
            match &method.kind {
                MethodKind::Object | MethodKind::Static => {}
                MethodKind::Default(body) => {
                    if let Entry::Vacant(slot) = dispatch.entry(method.key()) {
                        let default =
                            Arc::new(DefaultMethodHandler::new(method.key(), Arc::clone(body)));
                        defaults.push(Arc::clone(&default));
                        slot.insert(default);
                    }
                }
                MethodKind::Abstract => {
                    if let Some(handler) = by_config_key.get(&interface.config_key(method)) {
                        dispatch
                            .entry(method.key())
                            .or_insert_with(|| Arc::clone(handler));
                    }
                }
            }
        }

        let mut by_name: HashMap<String, Vec<MethodKey>> = HashMap::new();
        for key in dispatch.keys() {
            by_name.entry(key.name.clone()).or_default().push(key.clone());
        }

        let inner = Arc::new(ProxyInner {
            target,
            dispatch,
            by_name,
            handlers: by_config_key,
        });
        let weak: Weak<ProxyInner> = Arc::downgrade(&inner);
        for handler in &defaults {
            let weak: Weak<dyn Invoker> = weak.clone();
            handler.bind(weak);
        }

        info!(
            client = %inner.target,
            methods = inner.dispatch.len(),
            default_methods = defaults.len(),
            "built client proxy"
        );
        Ok(Proxy { inner })
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("contract", &self.contract)
            .field("encoder", &self.encoder)
            .field("decoder", &self.decoder)
            .field("query_map_encoder", &self.query_map_encoder)
            .field("client", &self.client)
            .field("interceptors", &self.interceptors.len())
            .field("options", &self.options)
            .finish()
    }
}

struct ProxyInner {
    target: Target,
    dispatch: HashMap<MethodKey, Arc<dyn MethodHandler>>,
    by_name: HashMap<String, Vec<MethodKey>>,
    handlers: HandlerTable,
}

impl ProxyInner {
    fn identity(&self, name: &str, args: &[Value]) -> Option<Value> {
        match name {
            EQUALS => Some(Value::Bool(matches!(
                args.first(),
                Some(Value::Target(other)) if *other == self.target
            ))),
            HASH_CODE => Some(Value::Int(target_hash(&self.target))),
            TO_STRING => Some(Value::Str(self.target.to_string())),
            _ => None,
        }
    }
}

impl Invoker for ProxyInner {
    fn invoke<'a>(
        &'a self,
        key: &'a MethodKey,
        args: Vec<Value>,
    ) -> BoxFuture<'a, FeignResult<Value>> {
        if let Some(value) = self.identity(&key.name, &args) {
            return Box::pin(async move { Ok(value) });
        }
        match self.dispatch.get(key) {
            Some(handler) => {
                debug!(method = %key, "dispatching");
                handler.invoke(args)
            }
            None => {
                let name = key.to_string();
                Box::pin(async move { Err(FeignError::UnknownMethod(name)) })
            }
        }
    }

    fn call<'a>(&'a self, name: &'a str, args: Vec<Value>) -> BoxFuture<'a, FeignResult<Value>> {
        if let Some(value) = self.identity(name, &args) {
            return Box::pin(async move { Ok(value) });
        }
        match self.by_name.get(name).map(Vec::as_slice) {
            Some([key]) => self.invoke(key, args),
            Some([_, _, ..]) => {
                let name = name.to_owned();
                Box::pin(async move { Err(FeignError::AmbiguousMethod(name)) })
            }
            _ => {
                let name = name.to_owned();
                Box::pin(async move { Err(FeignError::UnknownMethod(name)) })
            }
        }
    }
}

fn target_hash(target: &Target) -> i64 {
    let mut hasher = DefaultHasher::new();
    target.hash(&mut hasher);
    i64::from_ne_bytes(hasher.finish().to_ne_bytes())
}

/// A client for one target.
///
/// Equality, hashing, and formatting consider only the [`Target`].
#[derive(Clone)]
pub struct Proxy {
    inner: Arc<ProxyInner>,
}

impl Proxy {
    /// The target this proxy calls.
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.inner.target
    }

    /// Compiled handlers keyed by config key.
    #[must_use]
    pub fn handlers(&self) -> &HandlerTable {
        &self.inner.handlers
    }

    /// Method keys this proxy dispatches.
    pub fn method_keys(&self) -> impl Iterator<Item = &MethodKey> {
        self.inner.dispatch.keys()
    }

    /// This proxy as a value, for passing to `equals`.
    #[must_use]
    pub fn as_value(&self) -> Value {
        Value::Target(self.inner.target.clone())
    }

    /// Invoke the method identified by `key`.
    ///
    /// # Errors
    /// Propagates the handler's failure unchanged.
    pub async fn invoke(&self, key: &MethodKey, args: Vec<Value>) -> FeignResult<Value> {
        self.inner.invoke(key, args).await
    }

    /// Invoke the single method named `name`.
    ///
    /// # Errors
    /// Fails with [`FeignError::AmbiguousMethod`] for overloaded names, and
    /// propagates the handler's failure unchanged.
    pub async fn call(&self, name: &str, args: Vec<Value>) -> FeignResult<Value> {
        self.inner.call(name, args).await
    }
}

impl Invoker for Proxy {
    fn invoke<'a>(
        &'a self,
        key: &'a MethodKey,
        args: Vec<Value>,
    ) -> BoxFuture<'a, FeignResult<Value>> {
        self.inner.invoke(key, args)
    }

    fn call<'a>(&'a self, name: &'a str, args: Vec<Value>) -> BoxFuture<'a, FeignResult<Value>> {
        self.inner.call(name, args)
    }
}

impl PartialEq for Proxy {
    fn eq(&self, other: &Self) -> bool {
        self.inner.target == other.inner.target
    }
}

impl Eq for Proxy {}

impl Hash for Proxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.target.hash(state);
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner.target, f)
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("target", &self.inner.target)
            .field("methods", &self.inner.dispatch.len())
            .finish()
    }
}
