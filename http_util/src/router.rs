//! Assemble routes into an axum router

use crate::auth::require_auth;
use crate::errors::{ApiError, RouteError};
use crate::route::{HttpMethod, Route};
use axum::http::Uri;
use axum::middleware;
use axum::routing::MethodRouter;
use axum::Router;
use jwt::JwtService;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build a router from `routes`.
///
/// Methods registered on the same path are merged. Authenticated routes
/// get the bearer middleware and require `jwt`. Unmatched paths answer
/// with a JSON 404.
pub fn build_router<S>(routes: Vec<Route<S>>, jwt: Option<Arc<JwtService>>) -> Result<Router<S>, RouteError>
where
    S: Clone + Send + Sync + 'static,
{
    let mut seen: HashSet<(HttpMethod, String)> = HashSet::new();
    let mut by_path: BTreeMap<String, MethodRouter<S>> = BTreeMap::new();
    let mut shapes: Vec<(String, Vec<Segment>)> = Vec::new();

    for route in routes {
        let path = route.full_path();
        let shape = parse_path(&path)?;
        if !by_path.contains_key(&path) {
            if let Some(existing) = shapes
                .iter()
                .find(|(_, other)| shapes_conflict(&shape, other))
                .map(|(existing, _)| existing.clone())
            {
                return Err(RouteError::InvalidPath {
                    path,
                    message: format!("conflicts with route '{}'", existing),
                });
            }
            shapes.push((path.clone(), shape));
        }

        if !seen.insert((route.method(), path.clone())) {
            return Err(RouteError::Duplicate {
                method: route.method(),
                path,
            });
        }

        let authenticated = route.is_authenticated();
        let mut handler = route.handler;
        if authenticated {
            let service = jwt
                .clone()
                .ok_or_else(|| RouteError::MissingAuthenticator { path: path.clone() })?;
            handler = handler.route_layer(middleware::from_fn_with_state(service, require_auth));
        }

        tracing::debug!(%path, authenticated, "Registered route");

        let merged = match by_path.remove(&path) {
            Some(existing) => existing.merge(handler),
            None => handler,
        };
        by_path.insert(path, merged);
    }

    let router = by_path
        .into_iter()
        .fold(Router::new(), |router, (path, handler)| router.route(&path, handler));

    Ok(router
        .fallback(not_found)
        .layer(TraceLayer::new_for_http()))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param,
    CatchAll,
}

fn invalid_path(path: &str, message: String) -> RouteError {
    RouteError::InvalidPath {
        path: path.to_string(),
        message,
    }
}

/// Parse a normalized path into segments.
///
/// Captures must fill a whole segment as `{name}` or `{*name}`, names are
/// unique and a catch-all may only end the path.
fn parse_path(path: &str) -> Result<Vec<Segment>, RouteError> {
    let raw: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut names: HashSet<&str> = HashSet::new();
    let mut segments = Vec::with_capacity(raw.len());

    for (i, segment) in raw.iter().enumerate() {
        if segment.starts_with(':') || segment.starts_with('*') {
            return Err(invalid_path(
                path,
                format!("segment '{}' must be written as '{{name}}'", segment),
            ));
        }
        if !segment.contains(['{', '}']) {
            segments.push(Segment::Static(segment.to_string()));
            continue;
        }

        let inner = segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .filter(|inner| !inner.contains(['{', '}']))
            .ok_or_else(|| {
                invalid_path(
                    path,
                    format!("segment '{}' must be a single '{{name}}' capture", segment),
                )
            })?;

        let (name, catch_all) = match inner.strip_prefix('*') {
            Some(name) => (name, true),
            None => (inner, false),
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid_path(
                path,
                format!("capture name in '{}' is not valid", segment),
            ));
        }
        if !names.insert(name) {
            return Err(invalid_path(
                path,
                format!("capture '{}' appears more than once", name),
            ));
        }
        if catch_all && i + 1 != raw.len() {
            return Err(invalid_path(
                path,
                format!("catch-all '{}' must be the last segment", segment),
            ));
        }

        segments.push(if catch_all {
            Segment::CatchAll
        } else {
            Segment::Param
        });
    }

    Ok(segments)
}

/// Two paths that would match the same requests through captures alone.
/// Static segments may overlap captures.
fn shapes_conflict(a: &[Segment], b: &[Segment]) -> bool {
    for (left, right) in a.iter().zip(b) {
        match (left, right) {
            (Segment::CatchAll, Segment::Param | Segment::CatchAll)
            | (Segment::Param, Segment::CatchAll) => return true,
            (Segment::Param, Segment::Param) => {}
            (Segment::Static(x), Segment::Static(y)) if x == y => {}
            _ => return false,
        }
    }
    a.len() == b.len()
}
