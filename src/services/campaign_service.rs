//! services/campaign_service.rs

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::models::campaign_model::CampaignDefinition;

#[derive(Clone, Debug)]
pub struct CampaignService {
    db_pool: Pool<Sqlite>,
}

impl CampaignService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CampaignService { db_pool }
    }

    /// Devuelve la campaña con ese nombre o la crea con `subject` y `template_path`.
    pub async fn get_or_create(
        &self,
        name: &str,
        subject: &str,
        template_path: &str,
    ) -> Result<CampaignDefinition> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO campaigns (name, subject, template_path, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(subject)
        .bind(template_path)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Failed to insert campaign")?;

        self.get_by_name(name)
            .await?
            .with_context(|| format!("Campaign {name} not found after insert"))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<CampaignDefinition>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, subject, template_path, created_at
            FROM campaigns
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to fetch campaign")?;

        row.map(|r| campaign_from_row(&r)).transpose()
    }

    pub async fn update_subject(&self, campaign_id: i64, subject: &str) -> Result<()> {
        sqlx::query(r#"UPDATE campaigns SET subject = ?1 WHERE id = ?2"#)
            .bind(subject)
            .bind(campaign_id)
            .execute(&self.db_pool)
            .await
            .context("Failed to update campaign subject")?;
        Ok(())
    }
}

fn campaign_from_row(row: &SqliteRow) -> Result<CampaignDefinition> {
    let created_at: String = row.try_get("created_at")?;
    Ok(CampaignDefinition {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        subject: row.try_get("subject")?,
        template_path: row.try_get("template_path")?,
        created_at: created_at.parse()?,
    })
}
