//! models/message_model.rs

use serde::Serialize;
use uuid::Uuid;

/// Mensaje personalizado para un contacto. No se persiste.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedMessage {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub tracking_id: Uuid,
}

/// Lo que recibe el transporte de salida.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}
