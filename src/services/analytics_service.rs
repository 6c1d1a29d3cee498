//! services/analytics_service.rs
//! Eventos de campaña (envío, apertura, click) hacia un colaborador de analytics.
//!
//! Se construye una vez en `main` y se inyecta donde haga falta; en tests se
//! reemplaza por un recorder falso.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::models::email_log_model::TrackedContact;

const MIXPANEL_TRACK_URL: &str = "https://api.mixpanel.com/track";

#[async_trait]
pub trait AnalyticsRecorder: Send + Sync {
    async fn track_sent(
        &self,
        contact: &TrackedContact,
        campaign_name: &str,
        subject: &str,
        tracking_id: Uuid,
    );

    async fn track_open(
        &self,
        contact: &TrackedContact,
        campaign_name: &str,
        subject: &str,
        tracking_id: Uuid,
    );

    async fn track_click(
        &self,
        contact: &TrackedContact,
        campaign_name: &str,
        target_url: &str,
        tracking_id: Uuid,
    );
}

/// Para cuando no hay MIXPANEL_TOKEN.
#[derive(Debug, Clone, Default)]
pub struct NoopRecorder;

#[async_trait]
impl AnalyticsRecorder for NoopRecorder {
    async fn track_sent(&self, _contact: &TrackedContact, _campaign: &str, _subject: &str, _id: Uuid) {}

    async fn track_open(&self, _contact: &TrackedContact, _campaign: &str, _subject: &str, _id: Uuid) {}

    async fn track_click(&self, _contact: &TrackedContact, _campaign: &str, _url: &str, _id: Uuid) {}
}

#[derive(Clone)]
pub struct MixpanelRecorder {
    token: String,
    http_client: Client,
}

impl MixpanelRecorder {
    pub fn new(token: String) -> Self {
        Self {
            token,
            http_client: Client::new(),
        }
    }

    /// Los errores se loguean; analytics nunca corta un envío ni un redirect.
    async fn track(&self, event: &str, distinct_id: &str, properties: Value) {
        if let Err(e) = self.post_event(event, distinct_id, properties).await {
            log::warn!("(mixpanel) No se pudo registrar '{}': {:#}", event, e);
        }
    }

    async fn post_event(&self, event: &str, distinct_id: &str, properties: Value) -> Result<()> {
        let mut props = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        props.insert("token".into(), json!(self.token));
        props.insert("distinct_id".into(), json!(distinct_id));
        props.insert("time".into(), json!(chrono::Utc::now().timestamp()));
        props.insert("$insert_id".into(), json!(Uuid::new_v4().simple().to_string()));

        let payload = json!([{ "event": event, "properties": props }]);

        let resp = self
            .http_client
            .post(MIXPANEL_TRACK_URL)
            .header("accept", "text/plain")
            .json(&payload)
            .send()
            .await
            .context("Mixpanel request failed")?;

        if !resp.status().is_success() {
            let body_txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Mixpanel rejected event: {body_txt}"));
        }
        Ok(())
    }
}

#[async_trait]
impl AnalyticsRecorder for MixpanelRecorder {
    async fn track_sent(
        &self,
        contact: &TrackedContact,
        campaign_name: &str,
        subject: &str,
        tracking_id: Uuid,
    ) {
        let props = json!({
            "Campaign": campaign_name,
            "Subject": subject,
            "Tracking ID": tracking_id.to_string(),
            "Email": contact.email,
            "Company": contact.company,
        });
        self.track("Email Sent", &contact.email, props).await;
    }

    async fn track_open(
        &self,
        contact: &TrackedContact,
        campaign_name: &str,
        subject: &str,
        tracking_id: Uuid,
    ) {
        let props = json!({
            "Campaign": campaign_name,
            "Subject": subject,
            "Tracking ID": tracking_id.to_string(),
            "Email": contact.email,
            "Company": contact.company,
            "Job Role": contact.job_role,
        });
        self.track("Email Opened", &contact.email, props).await;
    }

    async fn track_click(
        &self,
        contact: &TrackedContact,
        campaign_name: &str,
        target_url: &str,
        tracking_id: Uuid,
    ) {
        let props = json!({
            "Campaign": campaign_name,
            "Target URL": target_url,
            "Tracking ID": tracking_id.to_string(),
            "Email": contact.email,
        });
        self.track("Email Link Clicked", &contact.email, props).await;
    }
}
