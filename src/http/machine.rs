//! Machine-oriented REST surface.
//!
//! Plain text by default (`id<TAB>schema` per entry, one subject name per
//! line); JSON through the graph's codec when the client accepts it.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Router,
};

use crate::graph::ServiceGraph;
use crate::http::response::{text, ApiError, ApiResult, Format};
use crate::repository::{SchemaEntry, SubjectConfig};

/// Path segment standing for "no latest entry" in `register_if_latest`.
pub const NO_LATEST: &str = "null";

pub fn router(graph: ServiceGraph) -> Router {
    Router::new()
        .route("/", get(list_subjects))
        .route("/{subject}", get(get_subject).put(create_subject))
        .route("/{subject}/config", get(subject_config))
        .route("/{subject}/all", get(all_entries))
        .route("/{subject}/latest", get(latest))
        .route("/{subject}/id/{id}", get(by_id))
        .route("/{subject}/schema", post(lookup_by_schema))
        .route("/{subject}/register", put(register))
        .route("/{subject}/register_if_latest/{latest_id}", put(register_if_latest))
        .with_state(graph)
}

fn entry_line(entry: &SchemaEntry) -> String {
    format!("{}\t{}", entry.id, entry.schema)
}

async fn list_subjects(State(graph): State<ServiceGraph>, headers: HeaderMap) -> ApiResult {
    let subjects = graph.repository.subjects();
    Ok(Format::from_headers(&headers).respond(
        || {
            subjects
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        },
        || graph.codec.subject_names_to_json(&subjects),
    ))
}

async fn get_subject(State(graph): State<ServiceGraph>, Path(subject): Path<String>) -> ApiResult {
    graph
        .repository
        .subject(&subject)
        .map(|s| text(StatusCode::OK, s.name))
        .ok_or_else(|| ApiError::not_found(format!("subject `{subject}` does not exist")))
}

async fn create_subject(
    State(graph): State<ServiceGraph>,
    Path(subject): Path<String>,
    body: String,
) -> ApiResult {
    let properties = graph.codec.properties_from_json(&body)?;
    let created = graph
        .repository
        .register_subject(&subject, SubjectConfig::from_properties(properties))?;
    Ok(text(StatusCode::OK, created.name))
}

async fn subject_config(
    State(graph): State<ServiceGraph>,
    Path(subject): Path<String>,
    headers: HeaderMap,
) -> ApiResult {
    let found = graph
        .repository
        .subject(&subject)
        .ok_or_else(|| ApiError::not_found(format!("subject `{subject}` does not exist")))?;
    let properties = found.config.properties();
    Ok(Format::from_headers(&headers).respond(
        || {
            properties
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("\n")
        },
        || graph.codec.properties_to_json(properties),
    ))
}

async fn all_entries(
    State(graph): State<ServiceGraph>,
    Path(subject): Path<String>,
    headers: HeaderMap,
) -> ApiResult {
    let entries = graph.repository.all_entries(&subject)?;
    Ok(Format::from_headers(&headers).respond(
        || entries.iter().map(entry_line).collect::<Vec<_>>().join("\n"),
        || graph.codec.entries_to_json(&entries),
    ))
}

async fn latest(
    State(graph): State<ServiceGraph>,
    Path(subject): Path<String>,
    headers: HeaderMap,
) -> ApiResult {
    let entry = graph
        .repository
        .latest(&subject)?
        .ok_or_else(|| ApiError::not_found(format!("subject `{subject}` has no schemas")))?;
    Ok(Format::from_headers(&headers).respond(
        || entry_line(&entry),
        || graph.codec.entry_to_json(&entry),
    ))
}

async fn by_id(
    State(graph): State<ServiceGraph>,
    Path((subject, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult {
    let entry = graph
        .repository
        .lookup_by_id(&subject, &id)?
        .ok_or_else(|| ApiError::not_found(format!("no schema with id `{id}` in `{subject}`")))?;
    Ok(Format::from_headers(&headers).respond(
        || entry.schema.clone(),
        || graph.codec.entry_to_json(&entry),
    ))
}

async fn lookup_by_schema(
    State(graph): State<ServiceGraph>,
    Path(subject): Path<String>,
    schema: String,
) -> ApiResult {
    graph
        .repository
        .lookup_by_schema(&subject, &schema)?
        .map(|e| text(StatusCode::OK, e.id))
        .ok_or_else(|| ApiError::not_found(format!("schema not registered in `{subject}`")))
}

async fn register(
    State(graph): State<ServiceGraph>,
    Path(subject): Path<String>,
    schema: String,
) -> ApiResult {
    let entry = graph.repository.register_schema(&subject, &schema)?;
    Ok(text(StatusCode::OK, entry.id))
}

async fn register_if_latest(
    State(graph): State<ServiceGraph>,
    Path((subject, latest_id)): Path<(String, String)>,
    schema: String,
) -> ApiResult {
    let expected = (latest_id != NO_LATEST).then_some(latest_id.as_str());
    graph
        .repository
        .register_schema_if_latest(&subject, &schema, expected)?
        .map(|e| text(StatusCode::OK, e.id))
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::CONFLICT,
                format!("latest schema of `{subject}` is not `{latest_id}`"),
            )
        })
}
