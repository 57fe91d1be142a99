//! Rules for the native declarative annotations.

use rustfeign_model::annotations::{Body, HeaderMap, Headers, Ignore, Param, QueryMap, RequestLine};
use rustfeign_model::{FeignError, FeignResult, HttpMethod, MethodMetadata, ViolationKind};

use super::registry::AnnotationRules;

/// Split `VERB path` into the leading upper-case verb and the rest.
fn split_request_line(line: &str) -> Option<(&str, &str)> {
    let verb_len = line.bytes().take_while(u8::is_ascii_uppercase).count();
    if verb_len == 0 {
        return None;
    }
    Some((&line[..verb_len], line[verb_len..].trim_start_matches(' ')))
}

fn invalid(md: &MethodMetadata, message: String) -> FeignError {
    FeignError::contract(ViolationKind::InvalidAnnotation, md.config_key.clone(), message)
}

/// Parse `"Name: value"` entries, grouping values by name in declaration order.
pub(crate) fn parse_headers(
    md: &MethodMetadata,
    entries: &[String],
) -> FeignResult<Vec<(String, Vec<String>)>> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for entry in entries {
        let Some((name, value)) = entry.split_once(':') else {
            return Err(invalid(md, format!("header {entry:?} is not of the form Name: value")));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid(md, format!("header {entry:?} has an empty name")));
        }
        let value = value.trim().to_owned();
        match grouped.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some((_, values)) => values.push(value),
            None => grouped.push((name.to_owned(), vec![value])),
        }
    }
    Ok(grouped)
}

fn apply_headers(md: &mut MethodMetadata, entries: &[String], level: &str) -> FeignResult<()> {
    if entries.is_empty() {
        return Err(invalid(md, format!("Headers annotation was empty on {level}")));
    }
    for (name, values) in parse_headers(md, entries)? {
        md.template.set_header(&name, values);
    }
    Ok(())
}

/// Register the native rules into `rules`.
#[allow(clippy::too_many_lines)]
pub fn register(rules: &mut AnnotationRules) {
    rules.register_class::<Headers, _>(|headers, md, iface| {
        apply_headers(md, &headers.0, &format!("type {}", iface.name()))
    });

    rules.register_method::<RequestLine, _>(|line, md, method| {
        let value = line.value.trim();
        if value.is_empty() {
            return Err(invalid(
                md,
                format!("RequestLine annotation was empty on method {}", method.name),
            ));
        }
        let Some((verb, uri)) = split_request_line(value) else {
            return Err(invalid(
                md,
                format!(
                    "RequestLine annotation didn't start with an HTTP verb on method {}",
                    method.name
                ),
            ));
        };
        let http_method: HttpMethod = verb.parse().map_err(|e: String| invalid(md, e))?;
        md.template.set_method(http_method);
        md.template.set_uri(uri.trim());
        md.template.set_decode_slash(line.decode_slash);
        md.template.set_collection_format(line.collection_format);
        Ok(())
    });

    rules.register_method::<Body, _>(|body, md, method| {
        if body.0.trim().is_empty() {
            return Err(invalid(
                md,
                format!("Body annotation was empty on method {}", method.name),
            ));
        }
        if body.0.contains('{') {
            md.template.set_body_template(body.0.clone());
        } else {
            md.template.set_body_text(body.0.clone());
        }
        Ok(())
    });

    rules.register_method::<Headers, _>(|headers, md, method| {
        apply_headers(md, &headers.0, &format!("method {}", method.name))
    });

    rules.register_method::<Ignore, _>(|_, md, _| {
        md.ignored = true;
        Ok(())
    });

    rules.register_parameter::<Param, _>(|param, ctx| {
        if param.names.is_empty() || param.names.iter().any(|n| n.trim().is_empty()) {
            return Err(invalid(
                ctx.metadata,
                format!("Param annotation was empty on param {}", ctx.index),
            ));
        }
        for name in &param.names {
            ctx.name_param(name);
            if !ctx.metadata.template.has_request_variable(name) {
                ctx.metadata.add_form_param(name);
            }
        }
        if let Some(factory) = &param.expander {
            let expander = factory.build().map_err(|reason| {
                FeignError::contract(
                    ViolationKind::ExpanderConstruction,
                    ctx.config_key().to_owned(),
                    format!("could not build expander {}: {reason}", factory.name()),
                )
            })?;
            ctx.metadata.index_to_expander.insert(ctx.index, expander);
        }
        Ok(())
    });

    rules.register_parameter::<QueryMap, _>(|query_map, ctx| {
        if ctx.metadata.query_map_index.is_some() {
            return Err(FeignError::contract(
                ViolationKind::DuplicateQueryMap,
                ctx.config_key().to_owned(),
                "QueryMap annotation was present on multiple parameters",
            ));
        }
        ctx.metadata.query_map_index = Some(ctx.index);
        ctx.metadata.query_map_encoded = query_map.encoded;
        Ok(())
    });

    rules.register_parameter::<HeaderMap, _>(|_, ctx| {
        if ctx.metadata.header_map_index.is_some() {
            return Err(FeignError::contract(
                ViolationKind::DuplicateHeaderMap,
                ctx.config_key().to_owned(),
                "HeaderMap annotation was present on multiple parameters",
            ));
        }
        ctx.metadata.header_map_index = Some(ctx.index);
        Ok(())
    });
}
