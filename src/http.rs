use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use percent_encoding::percent_decode_str;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::card::CardService;
use crate::error::AppError;
use crate::models::{ErrorBody, Locale, SteamCard};
use crate::steam::SteamApi;

pub fn router<S>(service: CardService<S>, cors: CorsLayer) -> Router
where
    S: SteamApi + 'static,
{
    Router::new()
        .route("/api/steam-user/{steam_id}", get(get_steam_user::<S>))
        .with_state(Arc::new(service))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// With no configured origins every origin is accepted, credentials
/// included. Production deployments should pass an explicit list.
pub fn cors_layer(allowed_origins: &[HeaderValue]) -> CorsLayer {
    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(allowed_origins.iter().cloned())
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// The `{steam_id}` segment, percent-decoded lossily. Steam IDs are opaque,
/// so bytes that are not UTF-8 become U+FFFD instead of rejecting the
/// request.
#[derive(Debug)]
pub struct SteamIdParam(pub String);

impl SteamIdParam {
    fn decode(segment: &str) -> Self {
        Self(percent_decode_str(segment).decode_utf8_lossy().into_owned())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for SteamIdParam {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The id is the last segment of `/api/steam-user/{steam_id}`.
        let segment = parts.uri.path().rsplit('/').next().unwrap_or_default();
        Ok(Self::decode(segment))
    }
}

async fn get_steam_user<S: SteamApi>(
    State(service): State<Arc<CardService<S>>>,
    SteamIdParam(steam_id): SteamIdParam,
) -> Result<Json<SteamCard>, ApiError> {
    service
        .build_card(&steam_id)
        .await
        .map(Json)
        .map_err(|err| ApiError::new(err, service.locale()))
}

/// Client-facing failure. Only "not found" keeps its message; everything
/// else is logged and replaced by the generic internal error text.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(err: AppError, locale: Locale) -> Self {
        match err {
            AppError::NotFound(detail) => Self {
                status: StatusCode::NOT_FOUND,
                detail,
            },
            other => {
                tracing::error!(code = other.code(), error = %other, "steam card request failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: locale.internal_error().to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}
