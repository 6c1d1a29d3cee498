//! models/email_log_model.rs
//! Registro de cada intento de envío (DeliveryOutcome).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOutcome {
    /// Igual al tracking id del mensaje enviado
    pub id: Uuid,
    pub campaign_id: i64,
    pub contact_id: i64,
    pub subject: String,
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// Datos del contacto que viajan con cada evento de analytics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedContact {
    pub email: String,
    pub company: String,
    pub job_role: String,
}

/// Lo que necesitan los endpoints de tracking para reportar un evento.
#[derive(Debug, Clone)]
pub struct TrackedDelivery {
    pub campaign_name: String,
    pub subject: String,
    pub contact: TrackedContact,
}
