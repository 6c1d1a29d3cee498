//! tests/tracking_handler_tests.rs
//! Endpoints de apertura y click con actix_web::test.

use std::sync::Arc;

use actix_rt::test;
use actix_web::{http::StatusCode, test as actix_test, web, App};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::app::init_app;
use crate::db::memory_pool;
use crate::models::contact_model::ContactUpsert;
use crate::models::email_log_model::DeliveryStatus;
use crate::services::analytics_service::AnalyticsRecorder;
use crate::services::campaign_service::CampaignService;
use crate::services::contact_service::ContactService;
use crate::services::email_log_service::EmailLogService;
use crate::tests::support::{AnalyticsEvent, RecordingAnalytics};

/// Un envío registrado para ada@example.com; devuelve su tracking id.
async fn seed_delivery(db_pool: &Pool<Sqlite>) -> Uuid {
    let contacts = ContactService::new(db_pool.clone());
    contacts
        .upsert(&ContactUpsert {
            email: "ada@example.com".to_string(),
            first_name: Some("Ada".to_string()),
            company: Some("Acme".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let contact = contacts.get_by_email("ada@example.com").await.unwrap().unwrap();

    let campaign = CampaignService::new(db_pool.clone())
        .get_or_create("launch", "Hello", "template.md")
        .await
        .unwrap();

    let tracking_id = Uuid::new_v4();
    EmailLogService::new(db_pool.clone())
        .record_outcome(tracking_id, campaign.id, contact.id, "Hello Ada", DeliveryStatus::Sent, None)
        .await
        .unwrap();
    tracking_id
}

macro_rules! tracking_app {
    ($db_pool:expr, $analytics:expr) => {{
        let analytics: Arc<dyn AnalyticsRecorder> = $analytics;
        actix_test::init_service(
            App::new()
                .app_data(web::Data::new(EmailLogService::new($db_pool)))
                .app_data(web::Data::new(analytics))
                .configure(init_app),
        )
        .await
    }};
}

#[test]
async fn test_open_pixel_records_event() {
    let db_pool = memory_pool().await;
    let tracking_id = seed_delivery(&db_pool).await;
    let analytics = Arc::new(RecordingAnalytics::default());
    let app = tracking_app!(db_pool, analytics.clone());

    let req = actix_test::TestRequest::get()
        .uri(&format!("/track/open/{tracking_id}/pixel.png"))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap().to_str().unwrap(),
        "image/png"
    );
    let body = actix_test::read_body(resp).await;
    assert!(body.starts_with(b"\x89PNG"));

    assert_eq!(
        analytics.events(),
        vec![AnalyticsEvent::Opened {
            email: "ada@example.com".to_string(),
            campaign: "launch".to_string(),
            tracking_id,
        }]
    );
}

#[test]
async fn test_open_pixel_with_unknown_id_still_serves_image() {
    let db_pool = memory_pool().await;
    let analytics = Arc::new(RecordingAnalytics::default());
    let app = tracking_app!(db_pool, analytics.clone());

    for uri in [
        format!("/track/open/{}/pixel.png", Uuid::new_v4()),
        "/track/open/not-a-uuid/pixel.png".to_string(),
    ] {
        let req = actix_test::TestRequest::get().uri(&uri).to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert!(analytics.events().is_empty());
}

#[test]
async fn test_click_redirects_and_records_event() {
    let db_pool = memory_pool().await;
    let tracking_id = seed_delivery(&db_pool).await;
    let analytics = Arc::new(RecordingAnalytics::default());
    let app = tracking_app!(db_pool, analytics.clone());

    let target = "https://example.com/page?a=1&b=2";
    let req = actix_test::TestRequest::get()
        .uri(&format!(
            "/track/click/{tracking_id}/?url={}",
            urlencoding::encode(target)
        ))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get("location").unwrap().to_str().unwrap(), target);
    assert_eq!(
        analytics.events(),
        vec![AnalyticsEvent::Clicked {
            email: "ada@example.com".to_string(),
            url: target.to_string(),
            tracking_id,
        }]
    );
}

#[test]
async fn test_click_rejects_unknown_id_and_bad_urls() {
    let db_pool = memory_pool().await;
    let tracking_id = seed_delivery(&db_pool).await;
    let analytics = Arc::new(RecordingAnalytics::default());
    let app = tracking_app!(db_pool, analytics.clone());

    let unknown = actix_test::TestRequest::get()
        .uri(&format!("/track/click/{}/?url=https%3A%2F%2Fexample.com", Uuid::new_v4()))
        .to_request();
    assert_eq!(actix_test::call_service(&app, unknown).await.status(), StatusCode::NOT_FOUND);

    let not_http = actix_test::TestRequest::get()
        .uri(&format!("/track/click/{tracking_id}/?url=javascript%3Aalert(1)"))
        .to_request();
    assert_eq!(actix_test::call_service(&app, not_http).await.status(), StatusCode::BAD_REQUEST);

    let missing = actix_test::TestRequest::get()
        .uri(&format!("/track/click/{tracking_id}/"))
        .to_request();
    assert_eq!(actix_test::call_service(&app, missing).await.status(), StatusCode::BAD_REQUEST);

    assert!(analytics.events().is_empty());
}
