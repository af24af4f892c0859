use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use morph_types::{Analysis, CompactCorpus, CompactLine, LemmaTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolve::{resolve_lines, resolve_token};

#[derive(Clone)]
pub struct AppState {
    pub lemmas: Arc<LemmaTable>,
    pub compact: Arc<CompactCorpus>,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct MorphQuery {
    pub line: Option<usize>,
    pub token: Option<usize>,
}

#[derive(Serialize)]
struct LemmaResponse<'a> {
    word: &'a str,
    analyses: &'a [Analysis],
}

#[derive(Serialize)]
struct PoemResponse<'a> {
    id: &'a str,
    lines: &'a [CompactLine],
}

#[derive(Serialize)]
struct PoemMorphResponse<'a> {
    id: &'a str,
    lines_morph: Vec<Vec<&'a [Analysis]>>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/lemmas/{word}", get(lemma))
        .route("/v1/poems/{id}", get(poem))
        .route("/v1/poems/{id}/morph", get(poem_morph))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn lemma(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> Result<Response, ApiError> {
    let analyses = state
        .lemmas
        .get(&word)
        .ok_or_else(|| ApiError::not_found(format!("unknown word: {word}")))?;
    Ok(cached(
        &state,
        LemmaResponse {
            word: &word,
            analyses,
        },
    ))
}

async fn poem(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let lines = find_poem(&state, &id)?;
    Ok(cached(&state, PoemResponse { id: &id, lines }))
}

async fn poem_morph(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<MorphQuery>,
) -> Result<Response, ApiError> {
    let lines = find_poem(&state, &id)?;

    match (params.line, params.token) {
        (None, None) => Ok(cached(
            &state,
            PoemMorphResponse {
                id: &id,
                lines_morph: resolve_lines(lines, &state.lemmas),
            },
        )),
        (Some(line), Some(token)) => {
            let (word, analyses) = resolve_token(lines, &state.lemmas, line, token)
                .ok_or_else(|| {
                    ApiError::not_found(format!("no token {token} on line {line} of poem {id}"))
                })?;
            Ok(cached(&state, LemmaResponse { word, analyses }))
        }
        _ => Err(ApiError::bad_request(
            "line and token must be given together",
        )),
    }
}

fn find_poem<'a>(state: &'a AppState, id: &str) -> Result<&'a [CompactLine], ApiError> {
    state
        .compact
        .get(id)
        .ok_or_else(|| ApiError::not_found(format!("unknown poem: {id}")))
}

fn cached<T: Serialize>(state: &AppState, body: T) -> Response {
    if state.disable_cache {
        Json(body).into_response()
    } else {
        (
            [(
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=300"),
            )],
            Json(body),
        )
            .into_response()
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }

    fn not_found<T: Into<String>>(msg: T) -> Self {
        ApiError::NotFound(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
