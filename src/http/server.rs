//! HTTP server setup and request handlers.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, timeout, concurrency limit)
//! - Resolve identifiers and list registered NAANs
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::ark::identifier::{stripped_target, ARK_SCHEME};
use crate::ark::{ArkIdentifier, ParseError, Resolution, Resolver};
use crate::config::{ListingConfig, ResolverConfig};
use crate::http::negotiate::{negotiate, ListingFormat};
use crate::http::request::{
    propagate_request_id_layer, raw_target, request_id, request_url, set_request_id_layer,
    X_REQUEST_ID,
};
use crate::http::response::{redirect, AppError};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::store::RecordStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
    pub listing: ListingConfig,
    pub redirect_status: StatusCode,
    pub landing_url: Arc<str>,
}

impl AppState {
    pub fn new(config: &ResolverConfig, store: Arc<dyn RecordStore>) -> Self {
        Self {
            resolver: Resolver::with_info_markers(store, config.resolver.info_markers.clone()),
            listing: config.listing.clone(),
            redirect_status: match config.resolver.redirect_status {
                302 => StatusCode::FOUND,
                _ => StatusCode::TEMPORARY_REDIRECT,
            },
            landing_url: Arc::from(config.resolver.landing_url.as_str()),
        }
    }

    fn listing_formats(&self) -> &'static [ListingFormat] {
        if self.listing.text_formats {
            &[ListingFormat::Json, ListingFormat::Csv, ListingFormat::Text]
        } else {
            &[ListingFormat::Json]
        }
    }
}

/// HTTP server for the ARK resolver.
pub struct HttpServer {
    router: Router,
    config: ResolverConfig,
}

impl HttpServer {
    /// Create a new HTTP server resolving against `store`.
    pub fn new(config: ResolverConfig, store: Arc<dyn RecordStore>) -> Self {
        let state = AppState::new(&config, store);
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ResolverConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", get(list_naans))
            .route("/favicon.ico", get(favicon))
            .route("/diag/{*identifier}", get(diagnose))
            .route("/{*identifier}", get(resolve))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections));

        if config.cors.enabled {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([Method::GET, Method::HEAD])
                    .allow_headers(Any),
            );
        }

        router
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            data_dir = %self.config.store.data_dir.display(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }
}

/// Redirect to the identified resource or return the authority record.
async fn resolve(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let id = match ArkIdentifier::parse(raw_target(&uri, "/")) {
        Ok(id) => id,
        Err(ParseError::Empty) => {
            metrics::record_resolution("landing", start);
            return redirect(state.redirect_status, &state.landing_url);
        }
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Not an ARK");
            metrics::record_resolution("not_an_ark", start);
            return Err(e.into());
        }
    };

    match state.resolver.resolve(&id).await {
        Ok(resolution) => {
            metrics::record_resolution(resolution.outcome(), start);
            tracing::info!(
                request_id = %request_id,
                naan = %id.naan(),
                outcome = resolution.outcome(),
                "Resolved identifier"
            );
            match resolution {
                Resolution::Redirect(location) => redirect(state.redirect_status, &location),
                Resolution::Info(record) => Ok(Json(record).into_response()),
            }
        }
        Err(e) => {
            metrics::record_resolution(e.outcome(), start);
            tracing::info!(
                request_id = %request_id,
                naan = %id.naan(),
                outcome = e.outcome(),
                "Resolution failed"
            );
            Err(e.into())
        }
    }
}

/// List registered NAANs as JSON, CSV or plain text.
async fn list_naans(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
    let format = negotiate(accept, state.listing_formats());

    let naans = state
        .resolver
        .store()
        .naans()
        .await
        .map_err(|e| AppError::Resolve(e.into()))?;
    metrics::record_listing(format.label());

    Ok(match format {
        ListingFormat::Json => Json(naans).into_response(),
        ListingFormat::Csv | ListingFormat::Text => (
            [(header::CONTENT_TYPE, format.media_type())],
            naans.join("\n"),
        )
            .into_response(),
    })
}

async fn favicon() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Echo the parser's view of a request.
async fn diagnose(uri: Uri, headers: HeaderMap) -> Json<serde_json::Value> {
    let target = raw_target(&uri, "/diag/");
    let parsed = ArkIdentifier::parse(target).ok();
    let (stripped, path) = stripped_target(target);

    let arkpid = match &parsed {
        Some(id) => id.arkpid(),
        None if stripped.starts_with("ark:") => stripped.to_string(),
        None => format!("{ARK_SCHEME}{stripped}"),
    };

    Json(json!({
        "url": request_url(&uri, &headers),
        "url.path": uri.path(),
        "url.query": uri.query().unwrap_or(""),
        "path": path,
        "naan": parsed.as_ref().map(|id| id.naan()),
        "remainder": parsed.as_ref().map(|id| id.remainder()),
        "pid": parsed.as_ref().map(|id| id.pid()),
        "arkpid": arkpid,
        "request_id": headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok()),
    }))
}
