//! models/campaign_model.rs

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::contact_model::ImportResult;
use crate::services::template_service::TemplateOptions;

#[derive(Debug, Clone, Serialize)]
pub struct CampaignDefinition {
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub template_path: String,
    pub created_at: DateTime<Utc>,
}

/// A quién se le envía la campaña.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecipientScope {
    /// Solo los contactos tocados por la importación de esta corrida.
    #[default]
    Imported,
    /// Todos los contactos guardados.
    AllContacts,
}

#[derive(Debug, Clone)]
pub struct CampaignRequest {
    pub name: String,
    /// Se usa si la plantilla no declara `Subject:`
    pub default_subject: String,
    pub template_path: PathBuf,
    pub csv_path: PathBuf,
    pub dry_run: bool,
    pub recipients: RecipientScope,
    pub template_options: TemplateOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagePreview {
    pub recipient: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CampaignReport {
    pub import_stats: ImportResult,
    pub sent: usize,
    pub errors: Vec<String>,
    pub previews: Vec<MessagePreview>,
    /// Motivo si la campaña se cortó antes de terminar (falla de la base).
    pub aborted: Option<String>,
}
