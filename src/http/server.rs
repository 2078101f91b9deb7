//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the two Axum routers (intercepting proxy, local file server)
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch proxied requests and forward each one exactly once
//! - Serve verified local overrides from disk
//! - Swap in a freshly built rule set on config reload

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceExt;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeFile,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::routes::route_defs;
use crate::config::ProxyConfig;
use crate::dispatch::{Dispatcher, ForwardTarget, TokioFs};
use crate::http::request::{request_host, request_id, request_url, MakeRequestUuid};
use crate::observability::logging::{LogSink, Logger};
use crate::routing::{Router as RuleRouter, RoutingDecision};

/// Fatal server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ArcSwap<Dispatcher>>,
    pub client: Client<HttpConnector, Body>,
}

/// Intercepting proxy plus the local file server it forwards overrides to.
pub struct HttpServer {
    config: ProxyConfig,
    client: Client<HttpConnector, Body>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self { config, client }
    }

    /// Build the Axum router for the intercepting proxy.
    #[allow(deprecated)]
    fn build_proxy_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Build the Axum router for the local file server.
    #[allow(deprecated)]
    fn build_file_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .fallback(file_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run both listeners until `shutdown` fires.
    ///
    /// Every config received on `config_updates` replaces the rule set;
    /// listener addresses are only read at startup.
    pub async fn run(
        self,
        proxy_listener: TcpListener,
        file_listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let proxy_addr = proxy_listener.local_addr()?;
        let file_addr = file_listener.local_addr()?;
        let local_endpoint = ForwardTarget::from(file_addr);

        let dispatcher = Arc::new(ArcSwap::from_pointee(build_dispatcher(
            &self.config,
            local_endpoint.clone(),
        )));
        let state = AppState {
            dispatcher: dispatcher.clone(),
            client: self.client,
        };

        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                dispatcher.store(Arc::new(build_dispatcher(&new_config, local_endpoint.clone())));
                tracing::info!(routes = new_config.routes.len(), "Route configuration reloaded");
            }
        });

        let proxy_app = Self::build_proxy_router(&self.config, state.clone());
        let file_app = Self::build_file_router(&self.config, state.clone());

        let log = state.dispatcher.load().router().log().clone();
        log.notice(&format!("proxy server running on {}", proxy_addr));
        log.notice(&format!("file server running on {}", file_addr));

        let proxy = axum::serve(proxy_listener, proxy_app)
            .with_graceful_shutdown(wait_for(shutdown.resubscribe()))
            .into_future();
        let files = axum::serve(file_listener, file_app)
            .with_graceful_shutdown(wait_for(shutdown))
            .into_future();
        tokio::try_join!(proxy, files)?;

        tracing::info!("HTTP servers stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Build the per-request decision maker for `config`.
pub fn build_dispatcher(config: &ProxyConfig, local_endpoint: ForwardTarget) -> Dispatcher {
    let log: Arc<dyn LogSink> = Arc::new(Logger::new(config.log_filter()));
    let router = RuleRouter::with_policy(&route_defs(&config.routes), config.on_invalid_route, log);
    Dispatcher::new(Arc::new(router), TokioFs, local_endpoint)
}

async fn wait_for(mut shutdown: broadcast::Receiver<()>) {
    let _ = shutdown.recv().await;
}

/// Main proxy handler.
/// Decides between local override and original host, then forwards once.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(&request);

    if request.method() == Method::CONNECT {
        tracing::debug!(request_id = %request_id, uri = %request.uri(), "Refusing CONNECT tunnel");
        return (StatusCode::METHOD_NOT_ALLOWED, "Tunnelling is not supported").into_response();
    }

    let (Some(url), Some(host)) = (request_url(&request), request_host(&request)) else {
        tracing::warn!(request_id = %request_id, uri = %request.uri(), "Request without host");
        return (StatusCode::BAD_REQUEST, "Missing Host header").into_response();
    };

    let dispatcher = state.dispatcher.load_full();
    let dispatch = dispatcher.dispatch(&url, &host).await;

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        url = %url,
        target = %dispatch.target,
        local = dispatch.is_local(),
        "Proxying request"
    );

    forward(&state.client, request, &host, &dispatch.target, &request_id).await
}

/// Send `request` to `target`, keeping its method, path, headers and body.
async fn forward(
    client: &Client<HttpConnector, Body>,
    request: Request<Body>,
    host: &str,
    target: &ForwardTarget,
    request_id: &str,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let path_and_query = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
    let uri = match Uri::try_from(format!("http://{}{}", target.authority(), path_and_query)) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %request_id, target = %target, error = %e, "Unusable forward target");
            return (StatusCode::BAD_REQUEST, "Invalid request target").into_response();
        }
    };
    parts.uri = uri;
    parts.version = axum::http::Version::HTTP_11;
    parts.headers.remove("proxy-connection");
    if !parts.headers.contains_key(header::HOST) {
        if let Ok(value) = HeaderValue::from_str(host) {
            parts.headers.insert(header::HOST, value);
        }
    }

    match client.request(Request::from_parts(parts, body)).await {
        Ok(response) => into_axum(response),
        Err(e) => {
            tracing::error!(request_id = %request_id, target = %target, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Stream an upstream response back to the client as-is.
fn into_axum(response: hyper::Response<Incoming>) -> Response {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(body))
}

/// File server handler.
/// Re-derives the local path from the original URL and serves it.
async fn file_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let Some(url) = request_url(&request) else {
        return (StatusCode::BAD_REQUEST, "Missing Host header").into_response();
    };

    let decision = state.dispatcher.load().router().remap(&url);
    match decision {
        RoutingDecision::Local(path) => {
            tracing::debug!(url = %url, path = %path, "Serving local file");
            match ServeFile::new(&path).oneshot(request).await {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            }
        }
        RoutingDecision::NoMatch => (StatusCode::NOT_FOUND, "No local override").into_response(),
    }
}
