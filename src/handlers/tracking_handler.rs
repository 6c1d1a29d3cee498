//! handlers/tracking_handler.rs
//! Endpoints que reciben el pixel de apertura y los clicks de las campañas.

use std::sync::Arc;

use actix_web::{http::header, web, HttpResponse};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::services::{analytics_service::AnalyticsRecorder, email_log_service::EmailLogService};

/// PNG de 1x1
const PIXEL_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[derive(Debug, Deserialize)]
pub struct ClickQuery {
    pub url: Option<String>,
}

fn pixel_response() -> HttpResponse {
    let bytes = STANDARD.decode(PIXEL_PNG_BASE64).unwrap_or_default();
    HttpResponse::Ok()
        .content_type("image/png")
        .append_header((header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"))
        .append_header((header::PRAGMA, "no-cache"))
        .append_header((header::EXPIRES, "0"))
        .body(bytes)
}

/// GET /track/open/{tracking_id}/pixel.png
///
/// Siempre responde el pixel, aunque el id no exista: nunca rompemos la imagen.
pub async fn track_open_endpoint(
    log_service: web::Data<EmailLogService>,
    analytics: web::Data<Arc<dyn AnalyticsRecorder>>,
    path: web::Path<String>,
) -> HttpResponse {
    let Ok(tracking_id) = Uuid::parse_str(&path.into_inner()) else {
        return pixel_response();
    };

    match log_service.find_tracked(tracking_id).await {
        Ok(Some(delivery)) => {
            log::info!(
                "Apertura de {} (campaña '{}')",
                delivery.contact.email,
                delivery.campaign_name
            );
            analytics
                .track_open(
                    &delivery.contact,
                    &delivery.campaign_name,
                    &delivery.subject,
                    tracking_id,
                )
                .await;
        }
        Ok(None) => log::warn!("Apertura con tracking id desconocido: {}", tracking_id),
        Err(e) => log::error!("Error buscando tracking id {}: {:#}", tracking_id, e),
    }

    pixel_response()
}

/// GET /track/click/{tracking_id}/?url=...
pub async fn track_click_endpoint(
    log_service: web::Data<EmailLogService>,
    analytics: web::Data<Arc<dyn AnalyticsRecorder>>,
    path: web::Path<String>,
    query: web::Query<ClickQuery>,
) -> HttpResponse {
    let target = match query.into_inner().url {
        Some(url) if is_http_url(&url) => url,
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": "Missing or invalid url"
            }))
        }
    };

    let not_found = || {
        HttpResponse::NotFound().json(json!({
            "success": false,
            "error": "Unknown tracking id"
        }))
    };

    let Ok(tracking_id) = Uuid::parse_str(&path.into_inner()) else {
        return not_found();
    };

    match log_service.find_tracked(tracking_id).await {
        Ok(Some(delivery)) => {
            log::info!("Click de {} hacia {}", delivery.contact.email, target);
            analytics
                .track_click(&delivery.contact, &delivery.campaign_name, &target, tracking_id)
                .await;
            HttpResponse::Found()
                .append_header((header::LOCATION, target))
                .finish()
        }
        Ok(None) => not_found(),
        Err(e) => {
            log::error!("Error buscando tracking id {}: {:#}", tracking_id, e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}

fn is_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
