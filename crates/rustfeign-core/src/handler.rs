//! Method handlers: what a proxy runs for each method.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use futures::future::BoxFuture;
use rustfeign_model::descriptor::DefaultBody;
use rustfeign_model::{
    FeignError, FeignResult, Invoker, MethodKey, Request, RequestOptions, Response, Value,
};
use tracing::debug;

use crate::binder::TemplateCompiler;
use crate::codec::Decoder;
use crate::interceptor::RequestInterceptor;

/// The transport collaborator sending requests.
#[async_trait::async_trait]
pub trait Client: Send + Sync + fmt::Debug {
    /// Send `request` and return the response.
    ///
    /// # Errors
    /// Transport failures are reported as [`FeignError::Transport`].
    async fn execute(&self, request: Request, options: RequestOptions) -> FeignResult<Response>;
}

/// One invocable entry of a proxy's dispatch table.
pub trait MethodHandler: Send + Sync + fmt::Debug {
    /// Run the method with `args`.
    fn invoke(&self, args: Vec<Value>) -> BoxFuture<'_, FeignResult<Value>>;
}

/// Sends an HTTP request built from the call arguments and decodes the response.
pub struct HttpMethodHandler {
    compiler: TemplateCompiler,
    client: Arc<dyn Client>,
    decoder: Arc<dyn Decoder>,
    interceptors: Arc<[Arc<dyn RequestInterceptor>]>,
    options: RequestOptions,
}

impl HttpMethodHandler {
    /// A handler running `compiler` output through `client` and `decoder`.
    #[must_use]
    pub fn new(
        compiler: TemplateCompiler,
        client: Arc<dyn Client>,
        decoder: Arc<dyn Decoder>,
        interceptors: Arc<[Arc<dyn RequestInterceptor>]>,
        options: RequestOptions,
    ) -> Self {
        Self {
            compiler,
            client,
            decoder,
            interceptors,
            options,
        }
    }

    /// The template compiler.
    #[must_use]
    pub fn compiler(&self) -> &TemplateCompiler {
        &self.compiler
    }

    /// Build the request a call with `args` would send.
    ///
    /// # Errors
    /// Fails on argument count mismatch or any binding failure.
    pub fn request(&self, args: &[Value]) -> FeignResult<Request> {
        let md = self.compiler.metadata();
        if args.len() != md.parameter_count() {
            return Err(FeignError::invalid_argument(
                md.config_key.clone(),
                format!(
                    "expected {} arguments, got {}",
                    md.parameter_count(),
                    args.len()
                ),
            ));
        }
        let mut template = self.compiler.create(args)?;
        for interceptor in self.interceptors.iter() {
            interceptor.apply(&mut template);
        }
        self.compiler.target().apply(&mut template);
        template.request()
    }

    fn options_for(&self, args: &[Value]) -> RequestOptions {
        args.iter()
            .find_map(|arg| match arg {
                Value::Options(options) => Some(*options),
                _ => None,
            })
            .unwrap_or(self.options)
    }
}

impl MethodHandler for HttpMethodHandler {
    fn invoke(&self, args: Vec<Value>) -> BoxFuture<'_, FeignResult<Value>> {
        Box::pin(async move {
            let request = self.request(&args)?;
            let options = self.options_for(&args);
            let md = self.compiler.metadata();
            debug!(
                config_key = %md.config_key,
                method = %request.method(),
                url = request.url(),
                "executing request"
            );
            let response = self.client.execute(request, options).await?;
            debug!(config_key = %md.config_key, status = response.status, "received response");
            self.decoder.decode(response, &md.return_type)
        })
    }
}

impl fmt::Debug for HttpMethodHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMethodHandler")
            .field("compiler", &self.compiler)
            .field("client", &self.client)
            .field("decoder", &self.decoder)
            .field("interceptors", &self.interceptors.len())
            .field("options", &self.options)
            .finish()
    }
}

/// Runs a default method body against the proxy it is bound to.
///
/// The proxy is held weakly; the proxy owns its handlers.
pub struct DefaultMethodHandler {
    key: MethodKey,
    body: DefaultBody,
    proxy: OnceLock<Weak<dyn Invoker>>,
}

impl DefaultMethodHandler {
    /// An unbound handler for `key`.
    #[must_use]
    pub fn new(key: MethodKey, body: DefaultBody) -> Self {
        Self {
            key,
            body,
            proxy: OnceLock::new(),
        }
    }

    /// Bind to `proxy`. Returns `false` when already bound.
    pub fn bind(&self, proxy: Weak<dyn Invoker>) -> bool {
        self.proxy.set(proxy).is_ok()
    }

    /// Whether [`bind`](Self::bind) has run.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.proxy.get().is_some()
    }
}

impl MethodHandler for DefaultMethodHandler {
    fn invoke(&self, args: Vec<Value>) -> BoxFuture<'_, FeignResult<Value>> {
        let Some(proxy) = self.proxy.get().and_then(Weak::upgrade) else {
            let key = self.key.to_string();
            return Box::pin(async move { Err(FeignError::UnboundDefaultMethod(key)) });
        };
        debug!(method = %self.key, "invoking default method");
        (self.body)(proxy, args)
    }
}

impl fmt::Debug for DefaultMethodHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultMethodHandler")
            .field("key", &self.key)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Always fails; stands in for methods the contract marked ignored.
#[derive(Debug, Clone)]
pub struct UnsupportedMethodHandler {
    config_key: String,
}

impl UnsupportedMethodHandler {
    /// A handler for the ignored method `config_key`.
    #[must_use]
    pub fn new(config_key: impl Into<String>) -> Self {
        Self {
            config_key: config_key.into(),
        }
    }
}

impl MethodHandler for UnsupportedMethodHandler {
    fn invoke(&self, _args: Vec<Value>) -> BoxFuture<'_, FeignResult<Value>> {
        let config_key = self.config_key.clone();
        Box::pin(async move { Err(FeignError::UnsupportedMethod { config_key }) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::FutureExt;
    use rustfeign_model::annotations::{Headers, Ignore, Param, RequestLine};
    use rustfeign_model::{
        InterfaceDescriptor, MethodDescriptor, ParamType, ParameterDescriptor, RequestTemplate,
        Target,
    };

    use super::*;
    use crate::builder::FeignBuilder;
    use crate::dispatch::HandlerTable;
    use crate::interceptor::FnInterceptor;
    use crate::test_client::RecordingClient;

    fn api() -> InterfaceDescriptor {
        InterfaceDescriptor::new("Api")
            .annotation(Headers::new(["Accept: text/plain"]))
            .method(
                MethodDescriptor::new("ping")
                    .annotation(RequestLine::new("GET /ping/{id}"))
                    .param(ParameterDescriptor::new(ParamType::String).annotation(Param::new("id")))
                    .returns(ParamType::String),
            )
            .method(
                MethodDescriptor::new("slow")
                    .annotation(RequestLine::new("GET /slow"))
                    .param(ParameterDescriptor::new(ParamType::Options)),
            )
            .method(MethodDescriptor::new("legacy").annotation(Ignore))
    }

    fn handlers(
        client: &Arc<RecordingClient>,
        builder: impl FnOnce(FeignBuilder) -> FeignBuilder,
    ) -> HandlerTable {
        let target = Target::new(api(), "api", "http://api");
        builder(FeignBuilder::with_client(client.clone()))
            .build()
            .handlers_by_config_key(&target)
            .unwrap()
    }

    #[tokio::test]
    async fn test_should_send_request_and_decode_response() {
        let client = Arc::new(RecordingClient::new(200, "pong"));
        let table = handlers(&client, |b| b);

        let value = table["Api#ping(String)"]
            .invoke(vec![Value::from("7")])
            .await
            .unwrap();
        assert_eq!(value, Value::from("pong"));

        let request = client.last();
        assert_eq!(request.url(), "http://api/ping/7");
        assert_eq!(request.headers().first("accept"), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_should_run_interceptors_before_sending() {
        let client = Arc::new(RecordingClient::new(200, "pong"));
        let table = handlers(&client, |b| {
            b.interceptor(FnInterceptor(|t: &mut RequestTemplate| {
                t.header("Authorization", ["Bearer token"]);
                assert!(t.target().is_none());
            }))
        });
        table["Api#ping(String)"]
            .invoke(vec![Value::from("1")])
            .await
            .unwrap();
        assert_eq!(client.last().headers().first("authorization"), Some("Bearer token"));
    }

    #[tokio::test]
    async fn test_should_reject_wrong_argument_count() {
        let client = Arc::new(RecordingClient::new(200, ""));
        let table = handlers(&client, |b| b);
        let err = table["Api#ping(String)"].invoke(Vec::new()).await.unwrap_err();
        assert!(matches!(err, FeignError::InvalidArgument { .. }));
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_should_prefer_per_call_options() {
        let client = Arc::new(RecordingClient::new(204, ""));
        let defaults = RequestOptions {
            follow_redirects: false,
            ..RequestOptions::default()
        };
        let table = handlers(&client, |b| b.options(defaults));
        let handler = &table["Api#slow(RequestOptions)"];

        handler.invoke(vec![Value::Null]).await.unwrap();
        assert_eq!(client.sent()[0].1, defaults);

        let custom = RequestOptions {
            read_timeout: Duration::from_millis(5),
            ..defaults
        };
        handler.invoke(vec![Value::Options(custom)]).await.unwrap();
        assert_eq!(client.sent()[1].1, custom);
    }

    #[tokio::test]
    async fn test_should_surface_error_statuses() {
        let client = Arc::new(RecordingClient::new(503, "unavailable"));
        let table = handlers(&client, |b| b);
        let err = table["Api#ping(String)"]
            .invoke(vec![Value::from("1")])
            .await
            .unwrap_err();
        assert!(matches!(err, FeignError::Decode(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_should_fail_ignored_methods() {
        let client = Arc::new(RecordingClient::new(200, ""));
        let table = handlers(&client, |b| b);
        let err = table["Api#legacy()"].invoke(Vec::new()).await.unwrap_err();
        assert!(matches!(
            err,
            FeignError::UnsupportedMethod { ref config_key } if config_key == "Api#legacy()"
        ));
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_should_fail_unbound_default_methods() {
        let body: DefaultBody = Arc::new(|_: Arc<dyn Invoker>, _: Vec<Value>| {
            async { Ok::<_, FeignError>(Value::Bool(true)) }.boxed()
        });
        let handler =
            DefaultMethodHandler::new(MethodKey::new("cached", Vec::<String>::new()), body);
        assert!(!handler.is_bound());
        let err = handler.invoke(Vec::new()).await.unwrap_err();
        assert!(matches!(err, FeignError::UnboundDefaultMethod(ref key) if key == "cached()"));
    }
}
