//! services/import_service.rs
//! Importación de contactos desde CSV.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::contact_model::{ContactUpsert, ImportResult, UpsertOutcome};
use crate::services::contact_service::ContactService;

/// Posiciones de las columnas conocidas dentro del header.
#[derive(Debug, Default)]
struct ColumnMap {
    email: Option<usize>,
    name: Option<usize>,
    first_name: Option<usize>,
    last_name: Option<usize>,
    company: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Self {
        let mut map = ColumnMap::default();
        for (idx, header) in headers.iter().enumerate() {
            let slot = match header.to_lowercase().as_str() {
                "email" => &mut map.email,
                "name" => &mut map.name,
                "first_name" | "first name" => &mut map.first_name,
                "last_name" | "last name" => &mut map.last_name,
                "company" => &mut map.company,
                _ => continue,
            };
            // Si hay columnas repetidas gana la primera
            slot.get_or_insert(idx);
        }
        map
    }
}

#[derive(Clone, Debug)]
pub struct ImportService {
    contact_service: ContactService,
}

impl ImportService {
    pub fn new(contact_service: ContactService) -> Self {
        Self { contact_service }
    }

    /// Importa el CSV. Nunca devuelve error: todo problema queda en `errors`.
    pub async fn import_contacts(&self, csv_path: &Path) -> ImportResult {
        let (headers, records) = match read_csv(csv_path) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::error!("No se pudo leer {}: {:#}", csv_path.display(), e);
                return ImportResult::file_error(format!("{e:#}"));
            }
        };

        let columns = ColumnMap::from_headers(&headers);
        let mut result = ImportResult::default();
        let mut seen = HashSet::new();

        if columns.email.is_none() {
            log::warn!("{} no tiene columna Email", csv_path.display());
        }

        for (idx, record) in records.into_iter().enumerate() {
            // fila 1 es el header
            let row_number = idx + 2;

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("Fila {} inválida: {}", row_number, e);
                    result.errors.push(format!("row {row_number}: {e}"));
                    continue;
                }
            };

            let Some(data) = contact_from_record(&headers, &columns, &record) else {
                log::warn!("Fila {} sin email, se omite: {:?}", row_number, record);
                result.skipped += 1;
                continue;
            };

            match self.contact_service.upsert(&data).await {
                Ok(UpsertOutcome::Created) => result.created += 1,
                Ok(UpsertOutcome::Updated) => result.updated += 1,
                Err(e) => {
                    log::error!("Fila {}: no se pudo guardar {}: {:#}", row_number, data.email, e);
                    result.errors.push(format!("row {row_number}: {e:#}"));
                    continue;
                }
            }

            if seen.insert(data.email.clone()) {
                result.emails.push(data.email);
            }
        }

        log::info!(
            "Importación de {}: {} creados, {} actualizados, {} sin email, {} errores",
            csv_path.display(),
            result.created,
            result.updated,
            result.skipped,
            result.errors.len()
        );
        result
    }
}

type CsvRecords = Vec<csv::Result<csv::StringRecord>>;

fn read_csv(csv_path: &Path) -> Result<(Vec<String>, CsvRecords)> {
    let file = File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header of {}", csv_path.display()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    Ok((headers, reader.records().collect()))
}

fn contact_from_record(
    headers: &[String],
    columns: &ColumnMap,
    record: &csv::StringRecord,
) -> Option<ContactUpsert> {
    let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(|v| v.trim().to_string());

    let email = field(columns.email).filter(|e| !e.is_empty())?;

    let (name_first, name_last) = match field(columns.name) {
        Some(full) => {
            let (first, last) = split_name(&full);
            (Some(first), Some(last))
        }
        None => (None, None),
    };

    // Columnas explícitas de nombre tienen prioridad sobre "Name"
    let first_name = field(columns.first_name)
        .filter(|v| !v.is_empty())
        .or(name_first);
    let last_name = field(columns.last_name)
        .filter(|v| !v.is_empty())
        .or(name_last);

    let extra: BTreeMap<String, String> = headers
        .iter()
        .zip(record.iter())
        .filter(|(h, _)| !h.is_empty())
        .map(|(h, v)| (h.clone(), v.trim().to_string()))
        .collect();

    Some(ContactUpsert {
        email,
        first_name,
        last_name,
        company: field(columns.company),
        extra,
    })
}

/// Primer token es el nombre; el resto, unido con un espacio, el apellido.
pub fn split_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}
