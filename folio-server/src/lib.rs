use anyhow::Result;
use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use folio_core::{PAGES, PageKind, RenderError, RenderPolicy, RenderTarget, Rendered, Renderer};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Configuration for the site server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Directory served under `/assets/`
    pub assets: PathBuf,
    /// Auto-open browser
    pub open: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            assets: PathBuf::from("./assets"),
            open: false,
        }
    }
}

/// Serves the site by rendering each page on request.
pub struct SiteServer {
    config: ServerConfig,
    renderer: Arc<Renderer>,
}

#[derive(Clone)]
struct AppState {
    renderer: Arc<Renderer>,
}

impl SiteServer {
    pub fn new(config: ServerConfig, renderer: Renderer) -> Self {
        Self {
            config,
            renderer: Arc::new(renderer),
        }
    }

    /// Routes for every fixed page, blog posts and assets.
    pub fn router(&self) -> Router {
        let mut router = Router::new();

        for page in PAGES {
            router = match page.redirect_to {
                Some(target) => router.route(
                    page.path,
                    get(move || async move { (StatusCode::FOUND, [(header::LOCATION, target)]) }),
                ),
                None => {
                    let kind = page.kind;
                    router.route(
                        page.path,
                        get(move |State(state): State<AppState>| page_handler(state, kind)),
                    )
                }
            };
        }

        router
            .route("/blog/{slug}", get(post_handler))
            .route("/blog/{slug}/", get(post_handler))
            .nest_service("/assets", ServeDir::new(&self.config.assets))
            .layer(TraceLayer::new_for_http())
            .with_state(AppState {
                renderer: self.renderer.clone(),
            })
    }

    /// Run the server
    pub async fn run(self) -> Result<()> {
        if !self.config.assets.is_dir() {
            tracing::warn!(
                assets = %self.config.assets.display(),
                "assets directory does not exist, /assets/ will 404"
            );
        }

        let app = self.router();
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("Server running at http://{}", addr);

        // Open browser if requested
        if self.config.open {
            if let Err(e) = open::that(format!("http://{}/about/", addr)) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn page_handler(state: AppState, kind: PageKind) -> Response {
    let renderer = state.renderer;
    let result = tokio::task::spawn_blocking(move || {
        renderer.render(RenderTarget::Page(kind), RenderPolicy::Resilient)
    })
    .await;

    match result {
        Ok(rendered) => respond(rendered),
        Err(e) => {
            tracing::error!("render task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn post_handler(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let renderer = state.renderer;
    let result = tokio::task::spawn_blocking(move || {
        renderer
            .registry()
            .resolve(&slug)
            .map(|post| renderer.render(RenderTarget::Post(post), RenderPolicy::Resilient))
    })
    .await;

    match result {
        Ok(Some(rendered)) => respond(rendered),
        Ok(None) => (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response(),
        Err(e) => {
            tracing::error!("render task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn respond(rendered: Result<Rendered, RenderError>) -> Response {
    match rendered {
        Ok(Rendered::Html(html)) => Html(html).into_response(),
        Ok(Rendered::Recovered { html, .. }) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
        }
        // Resilient rendering does not return errors, but keep the server up
        // if that ever changes.
        Err(e) => {
            tracing::error!("{}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

const NOT_FOUND_PAGE: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Not found</title></head>\n<body><h1>Post not found</h1><p><a href=\"/blog/\">Back to the blog</a></p></body>\n</html>\n";
