//! Rules for MVC-style mapping annotations.
//!
//! These are registered on top of (or instead of) the native rules through the same
//! registry; the scanner itself knows nothing about them.

use rustfeign_model::annotations::{
    CollectionFormatting, PathVariable, QueryObject, RequestHeader, RequestMapping, RequestParam,
};
use rustfeign_model::{FeignError, FeignResult, HttpMethod, ViolationKind};

use super::registry::{AnnotationRules, ParameterContext};

const ACCEPT: &str = "Accept";
const CONTENT_TYPE: &str = "Content-Type";

fn empty_value(ctx: &ParameterContext<'_>, annotation: &str) -> FeignError {
    FeignError::contract(
        ViolationKind::InvalidAnnotation,
        ctx.config_key().to_owned(),
        format!("{annotation} annotation was empty on param {}", ctx.index),
    )
}

fn claim_query_map(ctx: &mut ParameterContext<'_>) -> FeignResult<()> {
    if ctx.metadata.query_map_index.is_some() {
        return Err(FeignError::contract(
            ViolationKind::DuplicateQueryMap,
            ctx.config_key().to_owned(),
            "Query map can only be present once",
        ));
    }
    ctx.metadata.query_map_index = Some(ctx.index);
    ctx.metadata.query_map_encoded = false;
    Ok(())
}

fn claim_header_map(ctx: &mut ParameterContext<'_>) -> FeignResult<()> {
    if ctx.metadata.header_map_index.is_some() {
        return Err(FeignError::contract(
            ViolationKind::DuplicateHeaderMap,
            ctx.config_key().to_owned(),
            "Header map can only be present once",
        ));
    }
    ctx.metadata.header_map_index = Some(ctx.index);
    Ok(())
}

/// Register the mapping-style rules into `rules`.
///
/// `decode_slash` is applied to every template a mapping touches.
#[allow(clippy::too_many_lines)]
pub fn register(rules: &mut AnnotationRules, decode_slash: bool) {
    rules.register_class::<RequestMapping, _>(move |mapping, md, iface| {
        if !iface.super_interfaces().is_empty() {
            return Ok(());
        }
        let Some(path) = mapping.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(());
        };
        let mut prefix = path.trim_end_matches('/').to_owned();
        if !prefix.starts_with('/') {
            prefix.insert(0, '/');
        }
        md.template.set_uri(&prefix);
        md.template.set_decode_slash(decode_slash);
        Ok(())
    });

    rules.register_method::<RequestMapping, _>(move |mapping, md, _| {
        md.template
            .set_method(mapping.method.unwrap_or(HttpMethod::Get));

        if let Some(path) = mapping.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            if !path.starts_with('/') && !md.template.path().ends_with('/') {
                md.template.append_uri("/");
            }
            md.template.append_uri(path);
            md.template.set_decode_slash(decode_slash);
        }

        if let Some(accept) = mapping.produces.first().filter(|p| !p.trim().is_empty()) {
            md.template.set_header(ACCEPT, [accept.trim()]);
        }
        if let Some(content_type) = mapping.consumes.first().filter(|c| !c.trim().is_empty()) {
            md.template.set_header(CONTENT_TYPE, [content_type.trim()]);
        }
        for entry in &mapping.headers {
            if entry.contains("!=") {
                continue;
            }
            if let Some((name, value)) = entry.split_once('=') {
                md.template.header(name.trim(), [value.trim()]);
            }
        }
        Ok(())
    });

    rules.register_method::<CollectionFormatting, _>(|format, md, _| {
        md.template.set_collection_format(format.0);
        Ok(())
    });

    rules.register_parameter::<PathVariable, _>(|variable, ctx| {
        let name = variable.0.trim();
        if name.is_empty() {
            return Err(empty_value(ctx, "PathVariable"));
        }
        ctx.name_param(name);
        if !ctx.metadata.template.has_request_variable(name) {
            ctx.metadata.add_form_param(name);
        }
        Ok(())
    });

    rules.register_parameter::<RequestParam, _>(|param, ctx| {
        if ctx.parameter.ty.is_map() {
            return claim_query_map(ctx);
        }
        let name = param.0.trim();
        if name.is_empty() {
            return Err(empty_value(ctx, "RequestParam"));
        }
        ctx.name_param(name);
        ctx.metadata.template.query(name, [format!("{{{name}}}")]);
        Ok(())
    });

    rules.register_parameter::<RequestHeader, _>(|header, ctx| {
        if ctx.parameter.ty.is_map() {
            return claim_header_map(ctx);
        }
        let name = header.0.trim();
        if name.is_empty() {
            return Err(empty_value(ctx, "RequestHeader"));
        }
        ctx.name_param(name);
        ctx.metadata.template.header(name, [format!("{{{name}}}")]);
        Ok(())
    });

    rules.register_parameter::<QueryObject, _>(|_, ctx| claim_query_map(ctx));
}
