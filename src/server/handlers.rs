use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::card::{status_line, ContactCard, DistanceInfo};
use crate::hours::{is_open_at, parse_local_time, NextChange, WeeklySchedule};
use crate::location::{generate_map_urls, BusinessLocation, Coordinates, MapUrls, VisitorPosition};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

/// Malformed query strings (e.g. `lat=abc`) get the same JSON body as
/// every other client error.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        api_error(rejection.status(), rejection.body_text())
    }
}

// ─── GET /api/location ───────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub location: BusinessLocation,
    pub maps: MapUrls,
    pub formatted_coords: String,
}

pub async fn location(State(state): State<Arc<AppState>>) -> Json<LocationResponse> {
    let config = &state.config;
    tracing::info!("GET /api/location");
    Json(LocationResponse {
        location: config.location.clone(),
        maps: generate_map_urls(&config.location, config.maps_api_key.as_deref()),
        formatted_coords: config.location.coordinates.to_string(),
    })
}

// ─── GET /api/distance ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct DistanceQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

pub async fn distance(
    State(state): State<Arc<AppState>>,
    params: Result<Query<DistanceQuery>, QueryRejection>,
) -> Result<Json<DistanceInfo>, ApiError> {
    let start = Instant::now();
    let Query(params) = params?;
    let origin = visitor_coordinates(params.lat, params.lng)?
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Provide 'lat' and 'lng' parameters"))?;

    let info = DistanceInfo::new(VisitorPosition::manual(origin), &state.config.location);

    tracing::info!(
        lat = origin.lat,
        lng = origin.lng,
        distance = %info.formatted,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/distance"
    );
    Ok(Json(info))
}

// ─── GET /api/hours ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct HoursQuery {
    /// Shop-local time, "YYYY-MM-DDTHH:MM" or "YYYY-MM-DD HH:MM". Defaults to now.
    pub at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HoursResponse {
    pub open: bool,
    pub status: String,
    pub next_change: Option<NextChange>,
    pub local_time: NaiveDateTime,
    pub lines: Vec<String>,
}

pub async fn hours(
    State(state): State<Arc<AppState>>,
    params: Result<Query<HoursQuery>, QueryRejection>,
) -> Result<Json<HoursResponse>, ApiError> {
    let Query(params) = params?;
    let config = &state.config;
    let at = match params.at.as_deref() {
        Some(s) => time_param(s)?,
        None => config.local_time(Utc::now()),
    };

    let schedule = WeeklySchedule::standard();
    let next_change = schedule.next_change(at);
    let open = is_open_at(&config.location.hours, at);
    tracing::info!(%at, open, "GET /api/hours");

    Ok(Json(HoursResponse {
        open,
        status: status_line(open, next_change.as_ref(), at),
        next_change,
        local_time: at,
        lines: config.location.hours.clone(),
    }))
}

// ─── GET /api/card ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CardQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub at: Option<String>,
}

pub async fn card(
    State(state): State<Arc<AppState>>,
    params: Result<Query<CardQuery>, QueryRejection>,
) -> Result<Json<ContactCard>, ApiError> {
    let start = Instant::now();
    let Query(params) = params?;
    let config = &state.config;
    let visitor = visitor_coordinates(params.lat, params.lng)?.map(VisitorPosition::manual);
    let at = match params.at.as_deref() {
        Some(s) => time_param(s)?,
        None => config.local_time(Utc::now()),
    };

    let card = ContactCard::build(config, visitor, at);

    tracing::info!(
        open = card.open,
        distance = ?card.distance.as_ref().map(|d| d.formatted.as_str()),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/card"
    );
    Ok(Json(card))
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Both or neither; a lone `lat` or `lng` is a client error.
fn visitor_coordinates(lat: Option<f64>, lng: Option<f64>) -> Result<Option<Coordinates>, ApiError> {
    match (lat, lng) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => {
            let c = Coordinates::new(lat, lng);
            if c.is_valid() {
                Ok(Some(c))
            } else {
                Err(api_error(
                    StatusCode::BAD_REQUEST,
                    "Invalid coordinates. Lat: -90..90, Lng: -180..180",
                ))
            }
        }
        _ => Err(api_error(StatusCode::BAD_REQUEST, "Provide both 'lat' and 'lng'")),
    }
}

fn time_param(s: &str) -> Result<NaiveDateTime, ApiError> {
    parse_local_time(s).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid time '{}'. Use YYYY-MM-DDTHH:MM.", s),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn state() -> State<Arc<AppState>> {
        State(Arc::new(AppState { config: AppConfig::default() }))
    }

    #[tokio::test]
    async fn test_location_endpoint() {
        let Json(resp) = location(state()).await;
        assert_eq!(resp.location.name, "Nexus Caf\u{00E9}");
        assert!(resp.maps.embed.contains("YOUR_API_KEY"));
        assert_eq!(resp.formatted_coords, "40.7128\u{00B0}N, 74.0059\u{00B0}W");
    }

    #[tokio::test]
    async fn test_distance_endpoint() {
        let q = DistanceQuery { lat: Some(40.7580), lng: Some(-73.9855) };
        let Json(info) = distance(state(), Ok(Query(q))).await.unwrap();
        assert_eq!(info.formatted, "5.3km");
    }

    #[tokio::test]
    async fn test_distance_rejects_bad_input() {
        let missing = DistanceQuery { lat: None, lng: None };
        let err = distance(state(), Ok(Query(missing))).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let half = DistanceQuery { lat: Some(1.0), lng: None };
        assert!(distance(state(), Ok(Query(half))).await.is_err());

        let out_of_range = DistanceQuery { lat: Some(95.0), lng: Some(0.0) };
        let err = distance(state(), Ok(Query(out_of_range))).await.unwrap_err();
        assert!(err.1.contains("Invalid coordinates"));
    }

    #[tokio::test]
    async fn test_hours_endpoint_at_explicit_time() {
        let q = HoursQuery { at: Some("2026-10-21T12:00".into()) };
        let Json(resp) = hours(state(), Ok(Query(q))).await.unwrap();
        assert!(resp.open);
        assert_eq!(resp.status, "Open now \u{00B7} Closes at 9:00 PM");
        assert_eq!(resp.lines.len(), 7);

        let q = HoursQuery { at: Some("2026-10-21 23:00".into()) };
        let Json(resp) = hours(state(), Ok(Query(q))).await.unwrap();
        assert!(!resp.open);
        assert_eq!(resp.status, "Closed \u{00B7} Opens tomorrow at 6:00 AM");
    }

    #[tokio::test]
    async fn test_hours_status_matches_card() {
        let q = HoursQuery { at: Some("2026-10-24T06:30".into()) };
        let Json(resp) = hours(state(), Ok(Query(q))).await.unwrap();
        let q = CardQuery { lat: None, lng: None, at: Some("2026-10-24T06:30".into()) };
        let Json(c) = card(state(), Ok(Query(q))).await.unwrap();
        assert_eq!(resp.status, c.status);
    }

    #[tokio::test]
    async fn test_hours_rejects_bad_time() {
        let q = HoursQuery { at: Some("noon".into()) };
        let err = hours(state(), Ok(Query(q))).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_numeric_coordinates_get_json_error() {
        let uri: axum::http::Uri = "http://localhost/api/distance?lat=abc&lng=-73.9".parse().unwrap();
        let rejected = Query::<DistanceQuery>::try_from_uri(&uri);
        assert!(rejected.is_err());

        let err = distance(state(), rejected).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 400);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));

        let uri: axum::http::Uri = "http://localhost/api/card?lat=1&lng=north".parse().unwrap();
        let err = card(state(), Query::<CardQuery>::try_from_uri(&uri)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_card_endpoint() {
        let q = CardQuery { lat: Some(40.7150), lng: Some(-74.0100), at: Some("2026-10-24T06:30".into()) };
        let Json(c) = card(state(), Ok(Query(q))).await.unwrap();
        assert_eq!(c.distance.unwrap().formatted, "422m");
        assert!(!c.open);
        assert_eq!(c.status, "Closed \u{00B7} Opens at 7:00 AM");
    }

    #[tokio::test]
    async fn test_api_error_response_status() {
        let resp = api_error(StatusCode::BAD_REQUEST, "nope").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
