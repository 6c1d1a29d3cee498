//! tests/support.rs
//! Fakes de transporte y analytics, y helpers de archivos.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::email_log_model::TrackedContact;
use crate::models::message_model::OutgoingEmail;
use crate::services::analytics_service::AnalyticsRecorder;
use crate::services::email_service::MailTransport;

/// Guarda cada correo; falla para los destinatarios indicados.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    failing: HashSet<String>,
}

impl RecordingTransport {
    pub fn failing_for(emails: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: emails.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|e| e.to.clone()).collect()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        if self.failing.contains(&email.to) {
            return Err(anyhow!("connection refused"));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsEvent {
    Sent { email: String, campaign: String, tracking_id: Uuid },
    Opened { email: String, campaign: String, tracking_id: Uuid },
    Clicked { email: String, url: String, tracking_id: Uuid },
}

#[derive(Default)]
pub struct RecordingAnalytics {
    pub events: Mutex<Vec<AnalyticsEvent>>,
}

impl RecordingAnalytics {
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalyticsRecorder for RecordingAnalytics {
    async fn track_sent(&self, contact: &TrackedContact, campaign_name: &str, _subject: &str, tracking_id: Uuid) {
        self.events.lock().unwrap().push(AnalyticsEvent::Sent {
            email: contact.email.clone(),
            campaign: campaign_name.to_string(),
            tracking_id,
        });
    }

    async fn track_open(&self, contact: &TrackedContact, campaign_name: &str, _subject: &str, tracking_id: Uuid) {
        self.events.lock().unwrap().push(AnalyticsEvent::Opened {
            email: contact.email.clone(),
            campaign: campaign_name.to_string(),
            tracking_id,
        });
    }

    async fn track_click(&self, contact: &TrackedContact, _campaign_name: &str, target_url: &str, tracking_id: Uuid) {
        self.events.lock().unwrap().push(AnalyticsEvent::Clicked {
            email: contact.email.clone(),
            url: target_url.to_string(),
            tracking_id,
        });
    }
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write test file");
    path
}
