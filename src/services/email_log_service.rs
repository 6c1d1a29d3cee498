//! services/email_log_service.rs
//! Log de resultados de envío (uno por intento) y consultas para tracking.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use crate::models::email_log_model::{
    DeliveryOutcome, DeliveryStatus, TrackedContact, TrackedDelivery,
};

#[derive(Clone, Debug)]
pub struct EmailLogService {
    db_pool: Pool<Sqlite>,
}

impl EmailLogService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        EmailLogService { db_pool }
    }

    pub async fn record_outcome(
        &self,
        tracking_id: Uuid,
        campaign_id: i64,
        contact_id: i64,
        subject: &str,
        status: DeliveryStatus,
        error: Option<&str>,
    ) -> Result<DeliveryOutcome> {
        let sent_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO email_logs (
                id, campaign_id, contact_id, subject, status, error_message, sent_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(tracking_id.to_string())
        .bind(campaign_id)
        .bind(contact_id)
        .bind(subject)
        .bind(status.as_str())
        .bind(error)
        .bind(sent_at.to_rfc3339())
        .execute(&self.db_pool)
        .await
        .context("Failed to insert email log")?;

        Ok(DeliveryOutcome {
            id: tracking_id,
            campaign_id,
            contact_id,
            subject: subject.to_string(),
            status,
            error_message: error.map(str::to_string),
            sent_at,
        })
    }

    /// Cantidad de registros de una campaña, opcionalmente filtrando por estado.
    pub async fn count_for_campaign(
        &self,
        campaign_id: i64,
        status: Option<DeliveryStatus>,
    ) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt
            FROM email_logs
            WHERE campaign_id = ?1 AND (?2 IS NULL OR status = ?2)
            "#,
        )
        .bind(campaign_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to count email logs")?;

        Ok(row.try_get("cnt")?)
    }

    pub async fn list_for_campaign(&self, campaign_id: i64) -> Result<Vec<DeliveryOutcome>> {
        let rows = sqlx::query(
            r#"
            SELECT id, campaign_id, contact_id, subject, status, error_message, sent_at
            FROM email_logs
            WHERE campaign_id = ?1
            ORDER BY sent_at, rowid
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to list email logs")?;

        let mut outcomes = Vec::with_capacity(rows.len());
        for r in rows {
            let id: String = r.try_get("id")?;
            let status: String = r.try_get("status")?;
            let sent_at: String = r.try_get("sent_at")?;
            outcomes.push(DeliveryOutcome {
                id: Uuid::parse_str(&id)?,
                campaign_id: r.try_get("campaign_id")?,
                contact_id: r.try_get("contact_id")?,
                subject: r.try_get("subject")?,
                status: if status == "sent" {
                    DeliveryStatus::Sent
                } else {
                    DeliveryStatus::Failed
                },
                error_message: r.try_get("error_message")?,
                sent_at: sent_at.parse()?,
            });
        }
        Ok(outcomes)
    }

    /// Busca el envío asociado a un tracking id (con contacto y campaña).
    pub async fn find_tracked(&self, tracking_id: Uuid) -> Result<Option<TrackedDelivery>> {
        let row = sqlx::query(
            r#"
            SELECT l.subject, c.email, c.company, c.extra_data, k.name AS campaign_name
            FROM email_logs l
            JOIN contacts c ON c.id = l.contact_id
            JOIN campaigns k ON k.id = l.campaign_id
            WHERE l.id = ?1
            "#,
        )
        .bind(tracking_id.to_string())
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to fetch tracked email")?;

        let Some(r) = row else {
            return Ok(None);
        };

        let extra: String = r.try_get("extra_data")?;
        let job_role = serde_json::from_str::<serde_json::Value>(&extra)
            .ok()
            .and_then(|v| v.get("Job Role").and_then(|j| j.as_str()).map(str::to_string))
            .unwrap_or_default();

        Ok(Some(TrackedDelivery {
            campaign_name: r.try_get("campaign_name")?,
            subject: r.try_get("subject")?,
            contact: TrackedContact {
                email: r.try_get("email")?,
                company: r.try_get("company")?,
                job_role,
            },
        }))
    }
}
