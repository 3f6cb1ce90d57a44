//! Core Goku functionality
//!
//! [`Goku`] wires the configured connection provider, JWT service and HTTP
//! server together for an application.

use axum::Router;
use dal::ConnectionProvider;
use http_util::{build_router, Route};
use jwt::JwtService;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

use crate::errors::GokuError;
use config::AppConfig;

/// Application bootstrap holding the shared services
#[derive(Debug, Clone)]
pub struct Goku {
    config: AppConfig,
    provider: ConnectionProvider,
    jwt: Arc<JwtService>,
}

impl Goku {
    /// Connect to the database and build the JWT service
    pub async fn new(config: AppConfig) -> Result<Self, GokuError> {
        let jwt = Arc::new(JwtService::new(&config.jwt)?);
        let provider = ConnectionProvider::connect(&config.database).await?;

        tracing::info!(environment = %config.environment, "Goku initialized");
        Ok(Self::from_parts(config, provider, jwt))
    }

    /// Load configuration from the environment, install logging, then
    /// connect
    pub async fn from_env() -> Result<Self, GokuError> {
        let config = AppConfig::load()?;
        logging::init(&config.logging)?;
        Self::new(config).await
    }

    /// Assemble from already built services
    pub fn from_parts(config: AppConfig, provider: ConnectionProvider, jwt: Arc<JwtService>) -> Self {
        Self {
            config,
            provider,
            jwt,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn provider(&self) -> &ConnectionProvider {
        &self.provider
    }

    pub fn jwt(&self) -> Arc<JwtService> {
        Arc::clone(&self.jwt)
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), GokuError> {
        self.provider.health_check().await?;
        crate::trace_log!("Health check passed");
        Ok(())
    }

    /// Build a router whose authenticated routes use this instance's JWT
    /// service
    pub fn router<S>(&self, routes: Vec<Route<S>>) -> Result<Router<S>, GokuError>
    where
        S: Clone + Send + Sync + 'static,
    {
        crate::debug_log!(routes = routes.len(), "Building router");
        Ok(build_router(routes, Some(self.jwt()))?)
    }

    /// Serve `routes` on `http.host:http.port` until the server stops
    pub async fn serve(&self, routes: Vec<Route>) -> Result<(), GokuError> {
        let timeout = Duration::from_secs(self.config.http.request_timeout_seconds);
        let router = self.router(routes)?.layer(TimeoutLayer::new(timeout));

        let address = self.config.http.bind_address();
        let server_error = |source| GokuError::Server {
            address: address.clone(),
            source,
        };

        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(server_error)?;

        tracing::info!(%address, "Serving HTTP");
        axum::serve(listener, router).await.map_err(server_error)
    }
}
