use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

#[cfg(not(test))]
use {
    std::net::IpAddr,
    std::sync::Arc,
    tower_governor::{governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorLayer},
};

use crate::api::handlers::{self, AppState};
use crate::config::Settings;
use crate::{Error, Result};

/// Create the router with all endpoints
#[cfg_attr(test, allow(unused_variables))]
pub fn create_router(state: AppState, settings: &Settings) -> Result<Router> {
    // Endpoints that do real work per request; rate limited per client IP
    #[cfg_attr(test, allow(unused_mut))]
    let mut api_routes = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/api/match", post(handlers::match_recipe))
        .with_state(state.clone());

    // Rate limiting only in non-test builds. The key is the peer IP from
    // ConnectInfo, falling back to localhost when the server was not started
    // with connect info.
    #[cfg(not(test))]
    {
        #[derive(Clone, Copy, Debug)]
        struct FallbackIpKeyExtractor;

        impl KeyExtractor for FallbackIpKeyExtractor {
            type Key = IpAddr;

            fn extract<B>(
                &self,
                req: &axum::http::Request<B>,
            ) -> std::result::Result<Self::Key, tower_governor::GovernorError> {
                if let Some(axum::extract::ConnectInfo(addr)) = req
                    .extensions()
                    .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
                {
                    return Ok(addr.ip());
                }

                Ok(IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)))
            }
        }

        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(FallbackIpKeyExtractor)
                .per_second(settings.server.api_rate_limit)
                .burst_size(burst_size(settings.server.api_rate_limit))
                .finish()
                .ok_or_else(|| Error::Config("Invalid API rate limit".to_string()))?,
        );
        let governor_layer = GovernorLayer {
            config: governor_conf,
        };
        api_routes = api_routes.layer(governor_layer);
    }

    let api_routes = api_routes;

    // Health check routes (no state needed for health, state needed for ready)
    let health_routes = Router::new()
        .route("/", get(handlers::health_check))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(state);

    Ok(Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .layer(
            // Request body size limit - prevent memory exhaustion from large payloads
            RequestBodyLimitLayer::new(settings.server.max_request_body_size),
        )
        .layer(
            // CORS - the blog's widget is the only browser client
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .allow_origin(allowed_origin(&settings.server.cors_origin)?)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(
            // Security headers
            SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http()))
}

/// Burst allowance of the per-client limiter, twice the rate, saturating
fn burst_size(rate_limit: u64) -> u32 {
    u32::try_from(rate_limit)
        .unwrap_or(u32::MAX)
        .saturating_mul(2)
}

/// `*` allows any origin, anything else must be a single valid origin
fn allowed_origin(origin: &str) -> Result<AllowOrigin> {
    if origin.trim() == "*" {
        return Ok(AllowOrigin::any());
    }

    let value = HeaderValue::from_str(origin.trim())
        .map_err(|_| Error::Config(format!("Invalid CORS_ORIGIN: {origin}")))?;
    Ok(AllowOrigin::exact(value))
}
