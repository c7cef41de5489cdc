//! HTTP server
//!
//! Binds the session's route tree behind one listener. All dashboard
//! routes live under `/api/v1`; liveness stays at the root.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::ServerConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::session::Session;

use super::concepts_routes::concepts_routes;
use super::explorer_routes::explorer_routes;
use super::observability_routes::health_routes;
use super::rules_routes::rules_routes;
use super::views_routes::views_routes;

/// HTTP server for one dashboard session
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server for a session with the given bind settings
    pub fn new(session: Arc<Session>, config: ServerConfig) -> Self {
        let router = Self::build_router(session, &config);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(session: Arc<Session>, config: &ServerConfig) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let api = Router::new()
            .merge(rules_routes(session.clone()))
            .merge(explorer_routes(session.clone()))
            .merge(views_routes(session.clone()))
            .merge(concepts_routes(session.clone()));

        Router::new()
            .merge(health_routes(session))
            .nest("/api/v1", api)
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start serving (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid socket address {}: {}", self.config.socket_addr(), err),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        log_event_with_fields(Event::Serving, &[("addr", addr.to_string().as_str())]);
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::backend::{
        BackendResult, ConceptStat, InspectRuleRequest, InspectRuleResponse, StatisticsBackend,
        UpdateConceptRequest,
    };
    use crate::backend::{BackendError, OrderedMap};
    use crate::dataset::{DatasetBundle, DatasetDescriptor, Document, ModelOutput, ProjectionPoint};
    use crate::rules::RuleSet;

    struct OfflineBackend;

    #[async_trait]
    impl StatisticsBackend for OfflineBackend {
        async fn inspect_rule(
            &self,
            _request: &InspectRuleRequest,
        ) -> BackendResult<InspectRuleResponse> {
            Err(BackendError::status("inspect_rule/", 503))
        }

        async fn update_concept(
            &self,
            _request: &UpdateConceptRequest,
        ) -> BackendResult<ConceptStat> {
            Err(BackendError::status("update_concept", 503))
        }
    }

    fn session() -> Arc<Session> {
        let descriptor = DatasetDescriptor::from_json(
            r#"{
                "name": "twitter",
                "doc_kind": "sentiment",
                "model_name": "twitter-roberta-base-sentiment",
                "accuracy": 0.7,
                "labels": ["negative", "neutral", "positive"]
            }"#,
        )
        .unwrap();
        let bundle = DatasetBundle::from_parts(
            descriptor,
            vec![Document::from_value(serde_json::json!({"text": "fine", "label": 1}))],
            vec![ModelOutput { truth: 1, prediction: 1 }],
            vec![ProjectionPoint { x: 0.0, y: 0.0 }],
            OrderedMap::new(),
            RuleSet::default(),
            RuleSet::default(),
        );
        Arc::new(Session::new(Arc::new(bundle), Arc::new(OfflineBackend)))
    }

    #[test]
    fn test_socket_addr_follows_config() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            cors_origins: Vec::new(),
        };
        let server = HttpServer::new(session(), config);
        assert_eq!(server.socket_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_router_builds_with_restricted_origins() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["http://localhost:5173".to_string()],
        };
        let server = HttpServer::new(session(), config);
        let _router = server.router();
    }
}
