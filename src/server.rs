//! HTTP routes for browsing songs and explaining phrases

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::catalog::{Catalog, language_key};
use crate::explain::{ExplainError, PhraseExplainer, explain_phrase};
use crate::views::{self, Views};

pub const LANGUAGE_NOT_AVAILABLE: &str = "Selected language is not available.";
pub const SONG_NOT_FOUND: &str = "Selected song not found.";

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub explainer: Arc<dyn PhraseExplainer>,
    pub views: Arc<Views>,
}

pub fn create_router(
    catalog: Arc<Catalog>,
    explainer: Arc<dyn PhraseExplainer>,
    static_dir: impl AsRef<std::path::Path>,
) -> anyhow::Result<Router> {
    let views = Arc::new(Views::new()?);
    let state = AppState {
        catalog,
        explainer,
        views,
    };

    // Stylesheet and the phrase-selection script
    let static_service = ServeDir::new(static_dir.as_ref());

    let router = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route(
            "/choose-language",
            get(choose_language).post(submit_language),
        )
        .route(
            "/choose-song/:language",
            get(choose_song).post(submit_song),
        )
        .route("/explain", post(explain))
        .nest_service("/static", static_service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    Ok(router)
}

/// Turn a rendered page into a response, hiding render failures behind a 500
fn page(rendered: anyhow::Result<String>) -> Response {
    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render page: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Welcome page
async fn welcome(State(state): State<AppState>) -> Response {
    page(state.views.welcome_page())
}

async fn health() -> &'static str {
    "OK"
}

// ========== BROWSING ==========

/// List the available languages
async fn choose_language(State(state): State<AppState>) -> Response {
    page(state.views.choose_language_page(state.catalog.languages(), None))
}

#[derive(Debug, Deserialize)]
struct LanguageForm {
    #[serde(default)]
    language: String,
}

/// Go to the song list of the submitted language
async fn submit_language(
    State(state): State<AppState>,
    Form(form): Form<LanguageForm>,
) -> Response {
    let language = language_key(&form.language);
    tracing::debug!("Language selected: '{}'", language);

    if state.catalog.contains_language(&language) {
        Redirect::to(&views::choose_song_path(&language)).into_response()
    } else {
        tracing::warn!("Language '{}' not in catalog", language);
        page(
            state
                .views
                .choose_language_page(state.catalog.languages(), Some(LANGUAGE_NOT_AVAILABLE)),
        )
    }
}

/// List the songs of a language
async fn choose_song(State(state): State<AppState>, Path(language): Path<String>) -> Response {
    let language = language_key(&language);

    match state.catalog.songs_in(&language) {
        Some(songs) => page(state.views.choose_song_page(&language, songs, None)),
        None => {
            tracing::debug!("Unknown language '{}', redirecting", language);
            Redirect::to("/choose-language").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SongForm {
    #[serde(default)]
    song_id: String,
}

/// Show the lyrics of the submitted song
async fn submit_song(
    State(state): State<AppState>,
    Path(language): Path<String>,
    Form(form): Form<SongForm>,
) -> Response {
    let language = language_key(&language);

    let Some(songs) = state.catalog.songs_in(&language) else {
        tracing::debug!("Unknown language '{}', redirecting", language);
        return Redirect::to("/choose-language").into_response();
    };

    match state.catalog.find_song(&language, &form.song_id) {
        Some(song) => {
            tracing::debug!("Showing lyrics for song {}", song.id);
            page(state.views.lyrics_page(&language, song))
        }
        None => {
            tracing::warn!("Song '{}' not found in {}", form.song_id, language);
            page(state.views.choose_song_page(&language, songs, Some(SONG_NOT_FOUND)))
        }
    }
}

// ========== EXPLANATIONS ==========

#[derive(Debug, Deserialize)]
struct ExplainRequest {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExplainResponse {
    explanation: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Explain a phrase selected in the lyrics
async fn explain(State(state): State<AppState>, Json(request): Json<ExplainRequest>) -> Response {
    let text = request.text.unwrap_or_default();

    match explain_phrase(state.explainer.as_ref(), &text).await {
        Ok(explanation) => Json(ExplainResponse { explanation }).into_response(),
        Err(e @ ExplainError::EmptyInput) => {
            tracing::debug!("Rejected explain request: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
