//! Shared utilities for integration testing.

use schema_repo_server::RepositoryServer;

/// Build and start a server on an ephemeral loopback port.
pub async fn start_server(extra: &[(&str, &str)]) -> RepositoryServer {
    let mut overrides = vec![("server.host", "127.0.0.1"), ("server.port", "0")];
    overrides.extend_from_slice(extra);
    let mut server = RepositoryServer::new(overrides).expect("server should build");
    server.start().await.expect("server should start");
    server
}

/// Client without pooling so a stopped server is observed immediately.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .expect("client should build")
}

/// `base_url` without the trailing slash.
pub fn base(server: &RepositoryServer) -> String {
    server.base_url().as_str().trim_end_matches('/').to_string()
}
