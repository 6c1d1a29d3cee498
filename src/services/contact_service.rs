//! services/contact_service.rs
//! Acceso a la tabla `contacts`.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::models::contact_model::{ContactRecord, ContactUpsert, UpsertOutcome};

#[derive(Clone, Debug)]
pub struct ContactService {
    db_pool: Pool<Sqlite>,
}

impl ContactService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        ContactService { db_pool }
    }

    /// Crea el contacto si no existe; si existe, mezcla solo los campos presentes.
    pub async fn upsert(&self, data: &ContactUpsert) -> Result<UpsertOutcome> {
        let existing = sqlx::query("SELECT extra_data FROM contacts WHERE email = ?1")
            .bind(&data.email)
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to look up contact")?;

        match existing {
            None => {
                let extra = serde_json::to_string(&data.extra)?;
                let now = Utc::now().to_rfc3339();
                sqlx::query(
                    r#"
                    INSERT INTO contacts (email, first_name, last_name, company, extra_data, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .bind(&data.email)
                .bind(data.first_name.as_deref().unwrap_or_default())
                .bind(data.last_name.as_deref().unwrap_or_default())
                .bind(data.company.as_deref().unwrap_or_default())
                .bind(extra)
                .bind(now)
                .execute(&self.db_pool)
                .await
                .context("Failed to insert contact")?;

                Ok(UpsertOutcome::Created)
            }
            Some(row) => {
                let stored: String = row.try_get("extra_data")?;
                let mut extra = parse_extra(&stored);
                extra.extend(data.extra.clone());
                let extra = serde_json::to_string(&extra)?;

                sqlx::query(
                    r#"
                    UPDATE contacts
                    SET first_name = COALESCE(?2, first_name),
                        last_name = COALESCE(?3, last_name),
                        company = COALESCE(?4, company),
                        extra_data = ?5
                    WHERE email = ?1
                    "#,
                )
                .bind(&data.email)
                .bind(data.first_name.as_deref())
                .bind(data.last_name.as_deref())
                .bind(data.company.as_deref())
                .bind(extra)
                .execute(&self.db_pool)
                .await
                .context("Failed to update contact")?;

                Ok(UpsertOutcome::Updated)
            }
        }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<ContactRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, first_name, last_name, company, extra_data, created_at
            FROM contacts
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to fetch contact")?;

        row.map(|r| contact_from_row(&r)).transpose()
    }

    /// Contactos en el mismo orden que `emails`; los que no existen se omiten.
    pub async fn list_by_emails(&self, emails: &[String]) -> Result<Vec<ContactRecord>> {
        let mut contacts = Vec::with_capacity(emails.len());
        for email in emails {
            if let Some(contact) = self.get_by_email(email).await? {
                contacts.push(contact);
            }
        }
        Ok(contacts)
    }

    pub async fn list_all(&self) -> Result<Vec<ContactRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, first_name, last_name, company, extra_data, created_at
            FROM contacts
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to list contacts")?;

        rows.iter().map(contact_from_row).collect()
    }
}

fn contact_from_row(row: &SqliteRow) -> Result<ContactRecord> {
    let extra: String = row.try_get("extra_data")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(ContactRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        company: row.try_get("company")?,
        extra: parse_extra(&extra),
        created_at: created_at.parse()?,
    })
}

fn parse_extra(raw: &str) -> BTreeMap<String, String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        log::warn!("extra_data inválido, se ignora: {}", e);
        BTreeMap::new()
    })
}
