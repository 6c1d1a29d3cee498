//! models/contact_model.rs
//! Contactos de campaña y resultado de la importación CSV.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    /// Todas las columnas de la fila CSV, tal cual vinieron.
    pub extra: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Datos de una fila lista para upsert.
///
/// `None` significa que la columna no existe en el archivo: en un update
/// el campo guardado no se toca.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactUpsert {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportResult {
    pub created: usize,
    pub updated: usize,
    /// Filas sin email (warning, no error)
    pub skipped: usize,
    pub errors: Vec<String>,
    /// Emails tocados por esta importación, en orden del archivo y sin repetir.
    pub emails: Vec<String>,
}

impl ImportResult {
    pub fn file_error(message: String) -> Self {
        Self {
            errors: vec![message],
            ..Default::default()
        }
    }
}
