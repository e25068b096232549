//! The route table: every endpoint group, where it is mounted, and which
//! service-graph fields it reads.

use axum::{extract::DefaultBodyLimit, middleware, Router};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::graph::ServiceGraph;
use crate::http::{auxiliary, human, machine};
use crate::lifecycle::startup::ListenerSettings;
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Programmatic REST.
    Machine,
    /// Browsable HTML.
    Human,
    /// Status and configuration.
    Auxiliary,
}

impl GroupKind {
    pub fn label(self) -> &'static str {
        match self {
            GroupKind::Machine => "machine",
            GroupKind::Human => "human",
            GroupKind::Auxiliary => "auxiliary",
        }
    }
}

/// One mounted set of routes.
pub struct EndpointGroup {
    pub kind: GroupKind,
    pub mount: &'static str,
    /// Service-graph fields the handlers read.
    pub uses: &'static [&'static str],
    build: fn(ServiceGraph) -> Router,
}

impl EndpointGroup {
    pub fn router(&self, graph: ServiceGraph) -> Router {
        (self.build)(graph)
    }
}

pub const ENDPOINT_GROUPS: [EndpointGroup; 3] = [
    EndpointGroup {
        kind: GroupKind::Machine,
        mount: "/schema-repo",
        uses: &["repository", "codec"],
        build: machine::router,
    },
    EndpointGroup {
        kind: GroupKind::Human,
        mount: human::MOUNT,
        uses: &["repository"],
        build: human::router,
    },
    EndpointGroup {
        kind: GroupKind::Auxiliary,
        mount: "/",
        uses: &["config", "codec"],
        build: auxiliary::router,
    },
];

/// Mount every group on one router backed by `graph`.
#[allow(deprecated)]
pub fn build_router(graph: &ServiceGraph, settings: &ListenerSettings) -> Router {
    let mut app = Router::new();
    for group in &ENDPOINT_GROUPS {
        let routes = group.router(graph.clone()).layer(middleware::from_fn_with_state(
            group.kind.label(),
            metrics::track_requests,
        ));
        app = if group.mount == "/" {
            app.merge(routes)
        } else {
            app.nest(group.mount, routes)
        };
        tracing::debug!(
            group = group.kind.label(),
            mount = group.mount,
            uses = ?group.uses,
            "Endpoint group mounted"
        );
    }

    app.layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.max_body_bytes))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(TraceLayer::new_for_http())
}
