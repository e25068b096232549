//! Human-oriented browser over the repository.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use url::form_urlencoded;

use crate::graph::ServiceGraph;
use crate::http::response::ApiResult;

/// Where the browser is mounted; used to build links.
pub const MOUNT: &str = "/schema-repo-browser";

pub fn router(graph: ServiceGraph) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/{subject}", get(subject_page))
        .route("/{subject}/{id}", get(entry_page))
        .with_state(graph)
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn encode_segment(segment: &str) -> String {
    // Form encoding writes a space as `+`; a literal `+` is already `%2B`.
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Browser path under [`MOUNT`], one encoded segment per element.
fn link(segments: &[&str]) -> String {
    segments.iter().fold(MOUNT.to_string(), |mut path, segment| {
        path.push('/');
        path.push_str(&encode_segment(segment));
        path
    })
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{t}</title></head>\
         <body><h1>{t}</h1>{body}</body></html>",
        t = escape(title),
    )
}

fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, Html(page("Not found", &format!("<p>{}</p>", escape(what))))).into_response()
}

async fn index(State(graph): State<ServiceGraph>) -> Html<String> {
    let subjects = graph.repository.subjects();
    let items: String = subjects
        .iter()
        .map(|s| {
            format!(
                "<li><a href=\"{}\">{}</a></li>",
                link(&[s.name.as_str()]),
                escape(&s.name)
            )
        })
        .collect();
    let body = if subjects.is_empty() {
        "<p>No subjects registered.</p>".to_string()
    } else {
        format!("<ul>{items}</ul>")
    };
    Html(page("Subjects", &body))
}

async fn subject_page(State(graph): State<ServiceGraph>, Path(subject): Path<String>) -> ApiResult {
    let Some(found) = graph.repository.subject(&subject) else {
        return Ok(not_found(&format!("Subject {subject} does not exist.")));
    };
    let entries = graph.repository.all_entries(&subject)?;
    let rows: String = entries
        .iter()
        .map(|e| {
            format!(
                "<tr><td><a href=\"{}\">{}</a></td><td><pre>{}</pre></td></tr>",
                link(&[found.name.as_str(), e.id.as_str()]),
                escape(&e.id),
                escape(&e.schema)
            )
        })
        .collect();
    let props: String = found
        .config
        .properties()
        .iter()
        .map(|(k, v)| format!("<li>{} = {}</li>", escape(k), escape(v)))
        .collect();

    let body = format!(
        "<p><a href=\"{MOUNT}\">All subjects</a></p>\
         <h2>Configuration</h2><ul>{props}</ul>\
         <h2>Schemas</h2><table><tr><th>id</th><th>schema</th></tr>{rows}</table>"
    );
    Ok(Html(page(&format!("Subject {}", found.name), &body)).into_response())
}

async fn entry_page(
    State(graph): State<ServiceGraph>,
    Path((subject, id)): Path<(String, String)>,
) -> ApiResult {
    if graph.repository.subject(&subject).is_none() {
        return Ok(not_found(&format!("Subject {subject} does not exist.")));
    }
    let Some(entry) = graph.repository.lookup_by_id(&subject, &id)? else {
        return Ok(not_found(&format!("No schema {id} in {subject}.")));
    };
    let body = format!(
        "<p><a href=\"{href}\">Back to {s}</a></p><pre>{schema}</pre>",
        href = link(&[subject.as_str()]),
        s = escape(&subject),
        schema = escape(&entry.schema),
    );
    Ok(Html(page(&format!("{subject} / {id}"), &body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::repository::SubjectConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn get_page(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[tokio::test]
    async fn pages_render_repository_contents() {
        let graph = ServiceGraph::compose(Arc::new(Configuration::defaults())).unwrap();
        graph.repository.register_subject("users", SubjectConfig::default()).unwrap();
        graph.repository.register_schema("users", "<record/>").unwrap();
        let app = router(graph);

        let (status, body) = get_page(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/schema-repo-browser/users"));

        let (status, body) = get_page(app.clone(), "/users").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("&lt;record/&gt;"));

        let (status, _) = get_page(app.clone(), "/users/0").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = get_page(app.clone(), "/users/7").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get_page(app, "/ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!(encode_segment("a#b c?d+e%"), "a%23b%20c%3Fd%2Be%25");
        assert_eq!(link(&["orders", "3"]), "/schema-repo-browser/orders/3");
    }

    #[tokio::test]
    async fn links_survive_reserved_characters() {
        let graph = ServiceGraph::compose(Arc::new(Configuration::defaults())).unwrap();
        graph.repository.register_subject("a#b c?d", SubjectConfig::default()).unwrap();
        graph.repository.register_schema("a#b c?d", "s").unwrap();
        let app = router(graph);

        let (_, body) = get_page(app.clone(), "/").await;
        assert!(body.contains("href=\"/schema-repo-browser/a%23b%20c%3Fd\""));

        // The encoded link resolves back to the same subject.
        let (status, body) = get_page(app.clone(), "/a%23b%20c%3Fd").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("href=\"/schema-repo-browser/a%23b%20c%3Fd/0\""));

        let (status, body) = get_page(app, "/a%23b%20c%3Fd/0").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("href=\"/schema-repo-browser/a%23b%20c%3Fd\""));
    }
}
