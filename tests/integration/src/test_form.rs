//! Form bodies, body templates, interceptors, and per-call options.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rustfeign_codec::FormEncoder;
    use rustfeign_core::FeignConfig;
    use rustfeign_core::interceptor::{FnInterceptor, LoggingInterceptor};
    use rustfeign_model::annotations::{Body, Headers, Param, RequestLine};
    use rustfeign_model::{
        FeignError, InterfaceDescriptor, MethodDescriptor, ParamType, ParameterDescriptor,
        RequestOptions, RequestTemplate, Target, Value,
    };

    use crate::{RecordingClient, feign};

    fn named(name: &str) -> ParameterDescriptor {
        ParameterDescriptor::new(ParamType::String).annotation(Param::new(name))
    }

    fn login_api() -> InterfaceDescriptor {
        InterfaceDescriptor::new("LoginClient")
            .method(
                MethodDescriptor::new("form")
                    .annotation(RequestLine::new("POST /{tenant}/login"))
                    .param(named("tenant"))
                    .param(named("user_name"))
                    .param(named("password")),
            )
            .method(
                MethodDescriptor::new("json")
                    .annotation(RequestLine::new("POST /login"))
                    .annotation(Headers::new(["Content-Type: application/json"]))
                    .annotation(Body::new(
                        r#"%7B"user_name": "{user_name}", "password": "{password}"%7D"#,
                    ))
                    .param(named("user_name"))
                    .param(named("password")),
            )
            .method(
                MethodDescriptor::new("session")
                    .annotation(RequestLine::new("GET /session"))
                    .param(ParameterDescriptor::new(ParamType::Uri))
                    .param(ParameterDescriptor::new(ParamType::Options)),
            )
    }

    #[tokio::test]
    async fn test_should_send_url_encoded_form() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        let client = feign(&recorder)
            .encoder(FormEncoder::default())
            .target_url(login_api(), "http://auth.local")?;

        client
            .call(
                "form",
                vec![
                    Value::from("acme"),
                    Value::from("denominator"),
                    Value::from("pa ss&word"),
                ],
            )
            .await?;

        let request = recorder.last();
        assert_eq!(request.url(), "http://auth.local/acme/login");
        assert_eq!(
            request.headers().first("Content-Type"),
            Some("application/x-www-form-urlencoded; charset=UTF-8")
        );
        assert_eq!(
            request.body_text().as_deref(),
            Some("user_name=denominator&password=pa+ss%26word")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_should_expand_body_template() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        let client = feign(&recorder)
            .encoder(FormEncoder::default())
            .target_url(login_api(), "http://auth.local")?;

        client
            .call("json", vec![Value::from("denominator"), Value::from("secret")])
            .await?;

        let request = recorder.last();
        assert_eq!(
            request.body_text().as_deref(),
            Some(r#"{"user_name": "denominator", "password": "secret"}"#)
        );
        assert_eq!(request.headers().first("content-type"), Some("application/json"));
        Ok(())
    }

    #[tokio::test]
    async fn test_should_apply_interceptors_in_order() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        let client = feign(&recorder)
            .interceptor(FnInterceptor(|t: &mut RequestTemplate| {
                t.header("X-Trace", ["first"]);
            }))
            .interceptor(FnInterceptor(|t: &mut RequestTemplate| {
                t.header("X-Trace", ["second"]);
                t.query("tenant", ["acme"]);
            }))
            .interceptor(LoggingInterceptor::default())
            .target_url(login_api(), "http://auth.local")?;

        client
            .call("json", vec![Value::from("a"), Value::from("b")])
            .await?;

        let request = recorder.last();
        assert_eq!(request.headers().get("x-trace").unwrap(), ["first", "second"]);
        assert_eq!(request.url(), "http://auth.local/login?tenant=acme");
        Ok(())
    }

    #[tokio::test]
    async fn test_should_honour_uri_and_options_arguments() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        let config = FeignConfig::builder()
            .read_timeout_ms(1_000)
            .default_headers(vec![("User-Agent".to_owned(), "rustfeign-tests".to_owned())])
            .build();
        let target = Target::for_client(login_api(), "auth", None, "/v1/");
        assert_eq!(target.url(), "http://auth/v1");
        let client = feign(&recorder).config(config).target(target)?;

        let err = client
            .call("session", vec![Value::Null, Value::Null])
            .await
            .unwrap_err();
        assert!(matches!(err, FeignError::NullArgument { index: 0, .. }));
        assert!(recorder.requests().is_empty());

        let custom = RequestOptions {
            read_timeout: Duration::from_millis(250),
            ..RequestOptions::default()
        };
        client
            .call(
                "session",
                vec![Value::from("https://replica.auth"), Value::Options(custom)],
            )
            .await?;
        client
            .call("session", vec![Value::from("https://replica.auth/"), Value::Null])
            .await?;

        let requests = recorder.requests();
        assert_eq!(requests[0].url(), "https://replica.auth/session");
        assert_eq!(
            requests[0].headers().first("user-agent"),
            Some("rustfeign-tests")
        );
        let options = recorder.options();
        assert_eq!(options[0], custom);
        assert_eq!(options[1].read_timeout, Duration::from_secs(1));
        Ok(())
    }
}
