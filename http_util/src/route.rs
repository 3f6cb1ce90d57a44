//! Route descriptions

use axum::handler::Handler;
use axum::routing::{self, MethodRouter};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One handler bound to a method and path
pub struct Route<S = ()> {
    method: HttpMethod,
    path: String,
    version: Option<u32>,
    authenticated: bool,
    pub(crate) handler: MethodRouter<S>,
}

impl<S> fmt::Debug for Route<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.full_path())
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

impl<S> Route<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_handler(method: HttpMethod, path: impl Into<String>, handler: MethodRouter<S>) -> Self {
        Self {
            method,
            path: path.into(),
            version: None,
            authenticated: false,
            handler,
        }
    }

    pub fn get<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::with_handler(HttpMethod::Get, path, routing::get(handler))
    }

    pub fn post<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::with_handler(HttpMethod::Post, path, routing::post(handler))
    }

    pub fn put<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::with_handler(HttpMethod::Put, path, routing::put(handler))
    }

    pub fn patch<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::with_handler(HttpMethod::Patch, path, routing::patch(handler))
    }

    pub fn delete<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::with_handler(HttpMethod::Delete, path, routing::delete(handler))
    }
}

impl<S> Route<S> {
    /// Mount under `/v{version}`
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Require a valid bearer token
    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Version prefix plus the normalized path
    pub fn full_path(&self) -> String {
        let path = normalize_path(&self.path);
        match self.version {
            Some(version) if path == "/" => format!("/v{}", version),
            Some(version) => format!("/v{}{}", version, path),
            None => path,
        }
    }
}

/// Leading slash, no trailing or repeated slashes
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.trim().split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}
