//! services/campaign_sender_service.rs
//! Orquesta una campaña: importa, parsea la plantilla, personaliza y envía
//! (o previsualiza) contacto por contacto.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::models::{
    campaign_model::{CampaignDefinition, CampaignReport, CampaignRequest, MessagePreview, RecipientScope},
    contact_model::ContactRecord,
    email_log_model::{DeliveryStatus, TrackedContact},
    message_model::{OutgoingEmail, RenderedMessage},
};
use crate::services::{
    analytics_service::AnalyticsRecorder,
    campaign_service::CampaignService,
    contact_service::ContactService,
    email_log_service::EmailLogService,
    email_service::MailTransport,
    import_service::ImportService,
    placeholder_service::{build_context, PlaceholderResolver},
    render_service::ContentRenderer,
    template_service::parse_template,
};

#[derive(Clone)]
pub struct CampaignSenderService {
    import_service: ImportService,
    contact_service: ContactService,
    campaign_service: CampaignService,
    log_service: EmailLogService,
    resolver: PlaceholderResolver,
    renderer: ContentRenderer,
    /// `None` cuando no hay SMTP configurado: solo se permite dry-run.
    transport: Option<Arc<dyn MailTransport>>,
    analytics: Arc<dyn AnalyticsRecorder>,
    send_delay: Duration,
}

impl CampaignSenderService {
    pub fn new(
        db_pool: Pool<Sqlite>,
        renderer: ContentRenderer,
        transport: Option<Arc<dyn MailTransport>>,
        analytics: Arc<dyn AnalyticsRecorder>,
        send_delay: Duration,
    ) -> Self {
        let contact_service = ContactService::new(db_pool.clone());
        Self {
            import_service: ImportService::new(contact_service.clone()),
            contact_service,
            campaign_service: CampaignService::new(db_pool.clone()),
            log_service: EmailLogService::new(db_pool),
            resolver: PlaceholderResolver::new(),
            renderer,
            transport,
            analytics,
            send_delay,
        }
    }

    pub async fn send_campaign(&self, req: &CampaignRequest) -> Result<CampaignReport> {
        log::info!(
            "(send_campaign) Iniciando campaña '{}' (dry_run={})",
            req.name,
            req.dry_run
        );

        // 1) Archivos de entrada: si falta alguno no se procesa nada
        if !req.csv_path.is_file() {
            bail!("CSV file not found: {}", req.csv_path.display());
        }
        if !req.template_path.is_file() {
            bail!("Template file not found: {}", req.template_path.display());
        }

        let transport = if req.dry_run {
            None
        } else {
            Some(
                self.transport
                    .clone()
                    .ok_or_else(|| anyhow!("SMTP is not configured; use dry run or set SMTP_HOST"))?,
            )
        };

        // 2) Plantilla (antes de importar, para fallar sin tocar la base)
        let raw_template = tokio::fs::read_to_string(&req.template_path)
            .await
            .with_context(|| format!("Failed to read template {}", req.template_path.display()))?;
        let parsed = parse_template(&raw_template, req.template_options);
        let subject_template = parsed.subject_or(&req.default_subject).to_string();
        self.resolver.validate(&subject_template)?;
        self.resolver.validate(&parsed.body)?;

        if parsed.subject.is_some() {
            log::info!("(send_campaign) Asunto tomado de la plantilla: {}", subject_template);
        }

        // 3) Contactos
        let import_stats = self.import_service.import_contacts(&req.csv_path).await;

        // 4) Campaña, con el asunto que realmente se usa
        let template_path = req.template_path.to_string_lossy();
        let campaign = self
            .campaign_service
            .get_or_create(&req.name, &subject_template, &template_path)
            .await?;
        if campaign.subject != subject_template {
            self.campaign_service
                .update_subject(campaign.id, &subject_template)
                .await?;
        }

        // 5) Destinatarios
        let contacts = match req.recipients {
            RecipientScope::Imported => {
                self.contact_service
                    .list_by_emails(&import_stats.emails)
                    .await?
            }
            RecipientScope::AllContacts => self.contact_service.list_all().await?,
        };
        log::info!(
            "(send_campaign) {} destinatarios para '{}'",
            contacts.len(),
            campaign.name
        );

        let mut report = CampaignReport {
            import_stats,
            ..Default::default()
        };

        // 6) Uno por uno
        let total = contacts.len();
        for (idx, contact) in contacts.iter().enumerate() {
            let tracking_id = Uuid::new_v4();
            let rendered = self.render_for(contact, &subject_template, &parsed.body, tracking_id);

            let Some(transport) = transport.as_deref() else {
                match rendered {
                    Ok(message) => {
                        log::info!(
                            "(send_campaign) [Dry Run] {} -> {}",
                            contact.email,
                            message.subject
                        );
                        report.previews.push(MessagePreview {
                            recipient: contact.email.clone(),
                            subject: message.subject,
                            text_body: message.text_body,
                            html_body: message.html_body,
                        });
                    }
                    Err(e) => report.errors.push(format!("{}: {:#}", contact.email, e)),
                }
                continue;
            };

            // Sin registro del intento no se sigue enviando, pero el reporte
            // conserva lo ya enviado
            if let Err(e) = self
                .deliver(transport, &campaign, contact, &subject_template, rendered, tracking_id, &mut report)
                .await
            {
                let reason = format!("{}: {:#}", contact.email, e);
                log::error!("(send_campaign) Campaña detenida: {}", reason);
                report.errors.push(reason.clone());
                report.aborted = Some(reason);
                break;
            }

            if !self.send_delay.is_zero() && idx + 1 < total {
                log::info!("(send_campaign) Esperando {:?}...", self.send_delay);
                tokio::time::sleep(self.send_delay).await;
            }
        }

        log::info!(
            "(send_campaign) Finalizada '{}': {} enviados, {} errores, {} previews",
            campaign.name,
            report.sent,
            report.errors.len(),
            report.previews.len()
        );
        Ok(report)
    }

    fn render_for(
        &self,
        contact: &ContactRecord,
        subject_template: &str,
        body_template: &str,
        tracking_id: Uuid,
    ) -> Result<RenderedMessage> {
        let ctx = build_context(contact);
        let subject = self.resolver.resolve(subject_template, &ctx)?;
        let body = self.resolver.resolve(body_template, &ctx)?;
        self.renderer.render(subject.trim(), &body, tracking_id)
    }

    /// Un intento de envío = un registro en `email_logs`. El reporte se
    /// actualiza antes de escribir en la base; un `Err` es siempre de la base.
    #[allow(clippy::too_many_arguments)]
    async fn deliver(
        &self,
        transport: &dyn MailTransport,
        campaign: &CampaignDefinition,
        contact: &ContactRecord,
        subject_template: &str,
        rendered: Result<RenderedMessage>,
        tracking_id: Uuid,
        report: &mut CampaignReport,
    ) -> Result<()> {
        let (subject, result) = match rendered {
            Ok(message) => {
                let email = OutgoingEmail {
                    to: contact.email.clone(),
                    subject: message.subject.clone(),
                    text_body: message.text_body,
                    html_body: message.html_body,
                };
                let result = transport.send(&email).await;
                (message.subject, result)
            }
            Err(e) => (subject_template.to_string(), Err(e)),
        };

        match result {
            Ok(()) => {
                report.sent += 1;
                log::info!("(send_campaign) Enviado a {}", contact.email);
                self.log_service
                    .record_outcome(tracking_id, campaign.id, contact.id, &subject, DeliveryStatus::Sent, None)
                    .await?;

                let tracked = TrackedContact {
                    email: contact.email.clone(),
                    company: contact.company.clone(),
                    job_role: contact.extra.get("Job Role").cloned().unwrap_or_default(),
                };
                self.analytics
                    .track_sent(&tracked, &campaign.name, &subject, tracking_id)
                    .await;
            }
            Err(e) => {
                let error = format!("{e:#}");
                log::error!("(send_campaign) Falló el envío a {}: {}", contact.email, error);
                report.errors.push(format!("{}: {}", contact.email, error));
                self.log_service
                    .record_outcome(
                        tracking_id,
                        campaign.id,
                        contact.id,
                        &subject,
                        DeliveryStatus::Failed,
                        Some(&error),
                    )
                    .await?;
            }
        }
        Ok(())
    }
}
