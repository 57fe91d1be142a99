//! Fluent assembly of a [`Dispatcher`] and its proxies.

use std::sync::Arc;

use rustfeign_model::{FeignResult, InterfaceDescriptor, RequestOptions, Target};

use crate::codec::{
    Decoder, DefaultDecoder, DefaultEncoder, DefaultQueryMapEncoder, Encoder, QueryMapEncoder,
};
use crate::config::FeignConfig;
use crate::contract::{Contract, DeclarativeContract};
use crate::dispatch::{Dispatcher, Proxy};
use crate::handler::Client;
use crate::interceptor::{DefaultHeadersInterceptor, LoggingInterceptor, RequestInterceptor};

/// Builder for client proxies.
///
/// Defaults: the native [`DeclarativeContract`], the text/bytes codecs, and the
/// options and default headers of [`FeignConfig::default`].
///
/// ```
/// use rustfeign_core::{Client, FeignBuilder};
/// use rustfeign_model::annotations::RequestLine;
/// use rustfeign_model::{
///     FeignResult, InterfaceDescriptor, MethodDescriptor, ParamType, Request, RequestOptions,
///     Response, Value,
/// };
///
/// #[derive(Debug)]
/// struct Echo;
///
/// #[async_trait::async_trait]
/// impl Client for Echo {
///     async fn execute(&self, request: Request, _: RequestOptions) -> FeignResult<Response> {
///         Ok(Response::new(200, request.url().to_owned()))
///     }
/// }
///
/// let api = InterfaceDescriptor::new("Status").method(
///     MethodDescriptor::new("health")
///         .annotation(RequestLine::new("GET /health"))
///         .returns(ParamType::String),
/// );
/// let proxy = FeignBuilder::new(Echo).target_url(api, "http://status").unwrap();
/// # tokio_test::block_on(async {
/// let body = proxy.call("health", Vec::new()).await.unwrap();
/// assert_eq!(body, Value::from("http://status/health"));
/// # });
/// ```
#[derive(Debug)]
pub struct FeignBuilder {
    contract: Arc<dyn Contract>,
    encoder: Arc<dyn Encoder>,
    decoder: Arc<dyn Decoder>,
    query_map_encoder: Arc<dyn QueryMapEncoder>,
    client: Arc<dyn Client>,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
    options: Option<RequestOptions>,
    config: FeignConfig,
}

impl FeignBuilder {
    /// A builder sending requests through `client`.
    pub fn new(client: impl Client + 'static) -> Self {
        Self::with_client(Arc::new(client))
    }

    /// A builder sending requests through a shared client.
    #[must_use]
    pub fn with_client(client: Arc<dyn Client>) -> Self {
        Self {
            contract: Arc::new(DeclarativeContract::default()),
            encoder: Arc::new(DefaultEncoder),
            decoder: Arc::new(DefaultDecoder),
            query_map_encoder: Arc::new(DefaultQueryMapEncoder),
            client,
            interceptors: Vec::new(),
            options: None,
            config: FeignConfig::default(),
        }
    }

    /// Use `contract` to read the interface.
    #[must_use]
    pub fn contract(mut self, contract: impl Contract + 'static) -> Self {
        self.contract = Arc::new(contract);
        self
    }

    /// Add the mapping-style rules to the native contract.
    ///
    /// Uses the `decode_slash` of the configuration set so far.
    #[must_use]
    pub fn mapping_annotations(mut self) -> Self {
        self.contract = Arc::new(
            DeclarativeContract::default().with_mapping_rules(self.config.decode_slash),
        );
        self
    }

    /// Use `encoder` for bodies and form fields.
    #[must_use]
    pub fn encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    /// Use `decoder` for responses.
    #[must_use]
    pub fn decoder(mut self, decoder: impl Decoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Use `encoder` for non-map query-map arguments.
    #[must_use]
    pub fn query_map_encoder(mut self, encoder: impl QueryMapEncoder + 'static) -> Self {
        self.query_map_encoder = Arc::new(encoder);
        self
    }

    /// Append a request interceptor.
    #[must_use]
    pub fn interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Append a [`LoggingInterceptor`] at the `log_level` of the configuration set so far.
    #[must_use]
    pub fn log_requests(mut self) -> Self {
        self.interceptors
            .push(Arc::new(LoggingInterceptor::from_config(&self.config)));
        self
    }

    /// Default options, overriding the configured timeouts.
    #[must_use]
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Use `config` for options and default headers.
    #[must_use]
    pub fn config(mut self, config: FeignConfig) -> Self {
        self.config = config;
        self
    }

    /// Assemble the dispatcher.
    #[must_use]
    pub fn build(self) -> Dispatcher {
        let mut interceptors = self.interceptors;
        if !self.config.default_headers.is_empty() {
            interceptors.insert(
                0,
                Arc::new(DefaultHeadersInterceptor::new(
                    self.config.default_headers.clone(),
                )),
            );
        }
        Dispatcher {
            contract: self.contract,
            encoder: self.encoder,
            decoder: self.decoder,
            query_map_encoder: self.query_map_encoder,
            client: self.client,
            interceptors: interceptors.into(),
            options: self.options.unwrap_or_else(|| self.config.options()),
        }
    }

    /// Build the proxy for `target`.
    ///
    /// # Errors
    /// Returns the contract violation that prevents building.
    pub fn target(self, target: Target) -> FeignResult<Proxy> {
        self.build().new_instance(target)
    }

    /// Build the proxy for `interface` at `url`, named after the URL.
    ///
    /// # Errors
    /// Returns the contract violation that prevents building.
    pub fn target_url(
        self,
        interface: impl Into<Arc<InterfaceDescriptor>>,
        url: &str,
    ) -> FeignResult<Proxy> {
        self.target(Target::new(interface, url, url))
    }
}
