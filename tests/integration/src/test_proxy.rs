//! Proxy identity, inheritance, and build-time failures.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use futures::FutureExt;
    use rustfeign_core::Proxy;
    use rustfeign_model::annotations::{Headers, Ignore, Param, RequestLine};
    use rustfeign_model::{
        FeignError, InterfaceDescriptor, Invoker, MethodDescriptor, MethodKey, ParamType,
        ParameterDescriptor, Target, Value, ViolationKind,
    };

    use crate::{RecordingClient, feign};

    fn named(name: &str, ty: ParamType) -> ParameterDescriptor {
        ParameterDescriptor::new(ty).annotation(Param::new(name))
    }

    fn base() -> Arc<InterfaceDescriptor> {
        Arc::new(
            InterfaceDescriptor::new("Base")
                .annotation(Headers::new(["Accept: text/plain", "X-Base: 1"]))
                .method(
                    MethodDescriptor::new("ping")
                        .annotation(RequestLine::new("GET /ping"))
                        .returns(ParamType::String),
                ),
        )
    }

    fn child() -> InterfaceDescriptor {
        InterfaceDescriptor::new("Child")
            .extends(base())
            .annotation(Headers::new(["Accept: application/json"]))
            .method(
                MethodDescriptor::new("echo")
                    .annotation(RequestLine::new("GET /echo/{word}"))
                    .param(named("word", ParamType::String))
                    .returns(ParamType::String),
            )
            .method(
                MethodDescriptor::new("echo")
                    .annotation(RequestLine::new("GET /echo/{word}/{times}"))
                    .param(named("word", ParamType::String))
                    .param(named("times", ParamType::Integer))
                    .returns(ParamType::String),
            )
            .method(MethodDescriptor::new("deprecated").annotation(Ignore))
            .method(
                MethodDescriptor::default_method(
                    "pingTwice",
                    |proxy: Arc<dyn Invoker>, _args: Vec<Value>| {
                        async move {
                            let first = proxy.call("ping", Vec::new()).await?;
                            let second = proxy.call("ping", Vec::new()).await?;
                            Ok::<_, FeignError>(Value::from(format!("{first}+{second}")))
                        }
                        .boxed()
                    },
                )
                .returns(ParamType::String),
            )
    }

    fn proxy(recorder: &Arc<RecordingClient>, url: &str) -> anyhow::Result<Proxy> {
        Ok(feign(recorder).target(Target::new(child(), "child", url))?)
    }

    #[tokio::test]
    async fn test_should_call_inherited_methods_with_merged_headers() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        recorder.respond(200, "pong");
        let client = proxy(&recorder, "http://child")?;

        assert!(client.handlers().contains_key("Child#ping()"));
        assert_eq!(client.call("ping", Vec::new()).await?, Value::from("pong"));

        let request = recorder.last();
        assert_eq!(request.url(), "http://child/ping");
        assert_eq!(request.headers().get("accept").unwrap(), ["application/json"]);
        assert_eq!(request.headers().first("x-base"), Some("1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_should_route_overloads_by_method_key() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        let client = proxy(&recorder, "http://child")?;

        let err = client.call("echo", vec![Value::from("hi")]).await.unwrap_err();
        assert!(matches!(err, FeignError::AmbiguousMethod(_)));

        client
            .invoke(&MethodKey::new("echo", ["String"]), vec![Value::from("hi")])
            .await?;
        client
            .invoke(
                &MethodKey::new("echo", ["String", "i64"]),
                vec![Value::from("hi"), Value::from(3_i64)],
            )
            .await?;
        let urls: Vec<String> = recorder
            .requests()
            .iter()
            .map(|r| r.url().to_owned())
            .collect();
        assert_eq!(urls, vec!["http://child/echo/hi", "http://child/echo/hi/3"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_should_run_default_methods_through_siblings() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        recorder.respond(200, "a");
        recorder.respond(200, "b");
        let client = proxy(&recorder, "http://child")?;

        assert_eq!(client.call("pingTwice", Vec::new()).await?, Value::from("a+b"));
        assert_eq!(recorder.requests().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_should_reject_ignored_methods_at_call_time() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        let client = proxy(&recorder, "http://child")?;

        let err = client.call("deprecated", Vec::new()).await.unwrap_err();
        assert!(matches!(
            err,
            FeignError::UnsupportedMethod { ref config_key } if config_key == "Child#deprecated()"
        ));
        assert!(recorder.requests().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_should_compare_by_target_identity() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        let a = proxy(&recorder, "http://child")?;
        let b = proxy(&recorder, "http://child")?;
        let c = proxy(&recorder, "http://elsewhere")?;

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.call("equals", vec![b.as_value()]).await?, Value::Bool(true));
        assert_eq!(a.call("equals", vec![c.as_value()]).await?, Value::Bool(false));
        assert_eq!(a.call("equals", vec![Value::Null]).await?, Value::Bool(false));
        assert_eq!(
            a.call("hashCode", Vec::new()).await?,
            b.call("hashCode", Vec::new()).await?
        );
        assert_eq!(
            a.call("toString", Vec::new()).await?,
            Value::from("Target(type=Child, name=child, url=http://child)")
        );

        let unique: HashSet<Proxy> = [a, b, c].into_iter().collect();
        assert_eq!(unique.len(), 2);
        assert!(recorder.requests().is_empty());
        Ok(())
    }

    #[test]
    fn test_should_refuse_to_build_broken_interfaces() {
        let recorder = RecordingClient::new();

        let grandchild = InterfaceDescriptor::new("Grandchild").extends(child());
        let err = feign(&recorder)
            .target_url(grandchild, "http://x")
            .unwrap_err();
        assert_eq!(err.violation_kind(), Some(ViolationKind::MultiLevelInheritance));

        let redeclared = InterfaceDescriptor::new("Redeclared").extends(base()).method(
            MethodDescriptor::new("ping")
                .annotation(RequestLine::new("GET /v2/ping"))
                .returns(ParamType::String),
        );
        let err = feign(&recorder)
            .target_url(redeclared, "http://x")
            .unwrap_err();
        assert_eq!(err.violation_kind(), Some(ViolationKind::DuplicateConfigKey));
        assert!(err.to_string().contains("Redeclared#ping()"));
    }
}
