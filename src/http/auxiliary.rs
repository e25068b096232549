//! Auxiliary endpoints: liveness and effective configuration.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::graph::ServiceGraph;
use crate::http::response::{text, Format};

pub fn router(graph: ServiceGraph) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/config", get(config))
        .with_state(graph)
}

async fn status() -> Response {
    text(StatusCode::OK, "OK")
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigQuery {
    include_defaults: bool,
}

async fn config(
    State(graph): State<ServiceGraph>,
    Query(query): Query<ConfigQuery>,
    headers: HeaderMap,
) -> Response {
    let properties: BTreeMap<String, String> = if query.include_defaults {
        graph
            .config
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    } else {
        graph
            .config
            .overrides()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    };

    Format::from_headers(&headers).respond(
        || {
            properties
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("\n")
        },
        || graph.codec.properties_to_json(&properties),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn body_of(app: Router, uri: &str) -> String {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn app() -> Router {
        let config = Configuration::from_overrides([("server.port", "9999")]);
        router(ServiceGraph::compose(Arc::new(config)).unwrap())
    }

    #[tokio::test]
    async fn status_is_ok() {
        assert_eq!(body_of(app(), "/status").await, "OK");
    }

    #[tokio::test]
    async fn config_lists_overrides_unless_defaults_requested() {
        assert_eq!(body_of(app(), "/config").await, "server.port=9999");

        let all = body_of(app(), "/config?include_defaults=true").await;
        assert!(all.contains("server.port=9999"));
        assert!(all.contains("server.host=localhost"));
    }
}
