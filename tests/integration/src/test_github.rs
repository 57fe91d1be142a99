//! A GitHub-style API over the native annotations and the JSON codecs.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::FutureExt;
    use rustfeign_codec::{JsonDecoder, JsonEncoder};
    use rustfeign_core::Proxy;
    use rustfeign_model::annotations::{Headers, Param, RequestLine};
    use rustfeign_model::{
        FeignError, HttpMethod, InterfaceDescriptor, Invoker, MethodDescriptor, ParamType,
        ParameterDescriptor, Value,
    };
    use serde::{Deserialize, Serialize};

    use crate::{RecordingClient, feign};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Contributor {
        login: String,
        contributions: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Issue {
        title: String,
        body: String,
        assignees: Vec<String>,
    }

    fn named(name: &str) -> ParameterDescriptor {
        ParameterDescriptor::new(ParamType::String).annotation(Param::new(name))
    }

    fn contributors_type() -> ParamType {
        ParamType::list(ParamType::object("Contributor"))
    }

    fn github() -> InterfaceDescriptor {
        InterfaceDescriptor::new("GitHub")
            .annotation(Headers::new(["Accept: application/vnd.github+json"]))
            .method(
                MethodDescriptor::new("contributors")
                    .annotation(RequestLine::new("GET /repos/{owner}/{repo}/contributors"))
                    .param(named("owner"))
                    .param(named("repo"))
                    .returns(contributors_type()),
            )
            .method(
                MethodDescriptor::new("createIssue")
                    .annotation(RequestLine::new("POST /repos/{owner}/{repo}/issues"))
                    .param(ParameterDescriptor::new(ParamType::object("Issue")))
                    .param(named("owner"))
                    .param(named("repo")),
            )
            .method(
                MethodDescriptor::new("searchRepositories")
                    .annotation(RequestLine::new(
                        "GET /search/repositories?q={q}&sort={sort}&per_page=10",
                    ))
                    .param(named("q"))
                    .param(named("sort"))
                    .returns(ParamType::object("SearchResult")),
            )
            .method(
                MethodDescriptor::default_method(
                    "projectContributors",
                    |github: Arc<dyn Invoker>, _args: Vec<Value>| {
                        async move {
                            github
                                .call(
                                    "contributors",
                                    vec![Value::from("rustfeign"), Value::from("rustfeign")],
                                )
                                .await
                        }
                        .boxed()
                    },
                )
                .returns(contributors_type()),
            )
    }

    fn client_for(recorder: &Arc<RecordingClient>) -> anyhow::Result<Proxy> {
        Ok(feign(recorder)
            .encoder(JsonEncoder)
            .decoder(JsonDecoder)
            .target_url(github(), "https://api.github.com")?)
    }

    fn contributors(value: &Value) -> anyhow::Result<Vec<Contributor>> {
        Ok(serde_json::from_value(value.to_json())?)
    }

    #[tokio::test]
    async fn test_should_list_contributors() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        recorder.respond(
            200,
            r#"[{"login":"octocat","contributions":42},{"login":"hubot","contributions":7}]"#,
        );
        let github = client_for(&recorder)?;

        let value = github
            .call("contributors", vec![Value::from("octo"), Value::from("hello world")])
            .await?;
        let list = contributors(&value)?;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].login, "octocat");

        let request = recorder.last();
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(
            request.url(),
            "https://api.github.com/repos/octo/hello%20world/contributors"
        );
        assert_eq!(
            request.headers().first("accept"),
            Some("application/vnd.github+json")
        );
        assert!(request.body().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_should_post_json_body() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        let github = client_for(&recorder)?;
        let issue = Issue {
            title: "Crash on empty body".into(),
            body: "Steps to reproduce".into(),
            assignees: vec!["octocat".into()],
        };

        github
            .call(
                "createIssue",
                vec![Value::object(&issue)?, Value::from("octo"), Value::from("repo")],
            )
            .await?;

        let request = recorder.last();
        assert_eq!(request.method(), HttpMethod::Post);
        assert_eq!(request.url(), "https://api.github.com/repos/octo/repo/issues");
        assert_eq!(request.headers().first("content-type"), Some("application/json"));
        let sent: serde_json::Value = serde_json::from_slice(request.body().expect("body"))?;
        assert_eq!(sent["title"], "Crash on empty body");
        assert_eq!(sent["assignees"][0], "octocat");
        assert_eq!(request.charset(), Some("UTF-8"));
        Ok(())
    }

    #[tokio::test]
    async fn test_should_drop_unset_query_parameters() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        recorder.respond(200, r#"{"total_count":0,"items":[]}"#);
        let github = client_for(&recorder)?;

        let result = github
            .call("searchRepositories", vec![Value::from("rust lang"), Value::Null])
            .await?;
        assert_eq!(result.to_json()["total_count"], 0);
        assert_eq!(
            recorder.last().url(),
            "https://api.github.com/search/repositories?q=rust%20lang&per_page=10"
        );

        github
            .call("searchRepositories", vec![Value::from("feign"), Value::from("stars")])
            .await?;
        assert_eq!(
            recorder.last().url(),
            "https://api.github.com/search/repositories?q=feign&sort=stars&per_page=10"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_should_run_default_method_against_the_proxy() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        recorder.respond(200, r#"[{"login":"denominator","contributions":1}]"#);
        let github = client_for(&recorder)?;

        let value = github.call("projectContributors", Vec::new()).await?;
        assert_eq!(
            contributors(&value)?,
            vec![Contributor {
                login: "denominator".into(),
                contributions: 1
            }]
        );
        assert_eq!(
            recorder.last().url(),
            "https://api.github.com/repos/rustfeign/rustfeign/contributors"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_should_surface_error_responses() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        recorder.respond(404, r#"{"message":"Not Found"}"#);
        let github = client_for(&recorder)?;

        let err = github
            .call("contributors", vec![Value::from("nobody"), Value::from("nothing")])
            .await
            .unwrap_err();
        assert!(matches!(err, FeignError::Decode(_)));
        assert!(err.to_string().contains("404"));
        Ok(())
    }
}
