//! A store API over the mapping-style annotations.

#[cfg(test)]
mod tests {
    use rustfeign_codec::{FieldQueryMapEncoder, JsonDecoder, JsonEncoder};
    use rustfeign_core::{FeignBuilder, FeignConfig};
    use rustfeign_model::annotations::{
        CollectionFormatting, PathVariable, QueryObject, RequestHeader, RequestMapping,
        RequestParam,
    };
    use rustfeign_model::{
        CollectionFormat, HttpMethod, InterfaceDescriptor, MethodDescriptor, ParamType,
        ParameterDescriptor, Value,
    };
    use serde::{Deserialize, Serialize};

    use crate::{RecordingClient, feign};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Item {
        sku: String,
        price: u32,
    }

    #[derive(Serialize)]
    struct Cursor {
        after: String,
    }

    #[derive(Serialize)]
    struct Page {
        size: u32,
        cursor: Cursor,
    }

    fn string(annotation: impl rustfeign_model::Annotation + 'static) -> ParameterDescriptor {
        ParameterDescriptor::new(ParamType::String).annotation(annotation)
    }

    fn store() -> InterfaceDescriptor {
        InterfaceDescriptor::new("StoreApi")
            .annotation(RequestMapping::prefix("/api/v1/"))
            .method(
                MethodDescriptor::new("item")
                    .annotation(RequestMapping::get("/items/{sku}").produces("application/json"))
                    .param(string(PathVariable("sku".into())))
                    .param(string(RequestHeader("X-Tenant".into())))
                    .returns(ParamType::object("Item")),
            )
            .method(
                MethodDescriptor::new("search")
                    .annotation(RequestMapping::get("items"))
                    .annotation(CollectionFormatting(CollectionFormat::Csv))
                    .param(
                        ParameterDescriptor::new(ParamType::list(ParamType::String))
                            .annotation(RequestParam("tag".into())),
                    )
                    .param(
                        ParameterDescriptor::new(ParamType::object("Page")).annotation(QueryObject),
                    )
                    .returns(ParamType::list(ParamType::object("Item"))),
            )
            .method(
                MethodDescriptor::new("update")
                    .annotation(
                        RequestMapping::new(HttpMethod::Put, "items/{sku}")
                            .consumes("application/json")
                            .header("X-Source=rustfeign"),
                    )
                    .param(string(PathVariable("sku".into())))
                    .param(ParameterDescriptor::new(ParamType::object("Item")))
                    .param(
                        ParameterDescriptor::new(ParamType::string_map())
                            .annotation(RequestHeader(String::new())),
                    ),
            )
    }

    fn builder(recorder: &std::sync::Arc<RecordingClient>, config: FeignConfig) -> FeignBuilder {
        feign(recorder)
            .config(config)
            .mapping_annotations()
            .encoder(JsonEncoder)
            .decoder(JsonDecoder)
            .query_map_encoder(FieldQueryMapEncoder)
    }

    #[tokio::test]
    async fn test_should_fetch_item_by_path_variable() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        recorder.respond(200, r#"{"sku":"a-1","price":300}"#);
        recorder.respond(200, "{}");
        let store =
            builder(&recorder, FeignConfig::default()).target_url(store(), "http://store")?;

        let item = store
            .call("item", vec![Value::from("a-1"), Value::from("acme")])
            .await?;
        let item: Item = serde_json::from_value(item.to_json())?;
        assert_eq!(item.price, 300);

        let request = recorder.last();
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.url(), "http://store/api/v1/items/a-1");
        assert_eq!(request.headers().first("Accept"), Some("application/json"));
        assert_eq!(request.headers().first("x-tenant"), Some("acme"));

        store
            .call("item", vec![Value::from("a/b"), Value::Null])
            .await?;
        let request = recorder.last();
        assert_eq!(request.url(), "http://store/api/v1/items/a/b");
        assert!(!request.headers().contains("X-Tenant"));
        Ok(())
    }

    #[tokio::test]
    async fn test_should_encode_slashes_when_configured() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        let config = FeignConfig::builder().decode_slash(false).build();
        let store = builder(&recorder, config).target_url(store(), "http://store")?;

        store
            .call("item", vec![Value::from("a/b"), Value::from("acme")])
            .await?;
        assert_eq!(recorder.last().url(), "http://store/api/v1/items/a%2Fb");
        Ok(())
    }

    #[tokio::test]
    async fn test_should_flatten_query_objects() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        recorder.respond(200, r#"[{"sku":"a-1","price":1}]"#);
        let store =
            builder(&recorder, FeignConfig::default()).target_url(store(), "http://store")?;
        let page = Page {
            size: 20,
            cursor: Cursor {
                after: "a-0".into(),
            },
        };

        let items = store
            .call("search", vec![Value::list(["new", "sale"]), Value::object(&page)?])
            .await?;
        assert_eq!(items.as_list().map(<[Value]>::len), Some(1));

        let url = recorder.last().url().to_owned();
        assert!(url.starts_with("http://store/api/v1/items?tag=new,sale&"), "{url}");
        assert!(url.contains("cursor.after=a-0"), "{url}");
        assert!(url.contains("size=20"), "{url}");
        Ok(())
    }

    #[tokio::test]
    async fn test_should_put_body_with_header_map() -> anyhow::Result<()> {
        let recorder = RecordingClient::new();
        let store =
            builder(&recorder, FeignConfig::default()).target_url(store(), "http://store")?;
        let item = Item {
            sku: "a-1".into(),
            price: 250,
        };

        store
            .call(
                "update",
                vec![
                    Value::from("a-1"),
                    Value::object(&item)?,
                    Value::map([("X-Request-Id", "r-1")]),
                ],
            )
            .await?;

        let request = recorder.last();
        assert_eq!(request.method(), HttpMethod::Put);
        assert_eq!(request.url(), "http://store/api/v1/items/a-1");
        assert_eq!(request.headers().first("content-type"), Some("application/json"));
        assert_eq!(request.headers().first("X-Source"), Some("rustfeign"));
        assert_eq!(request.headers().first("x-request-id"), Some("r-1"));
        let sent: Item = serde_json::from_slice(request.body().expect("body"))?;
        assert_eq!(sent, item);
        Ok(())
    }
}
