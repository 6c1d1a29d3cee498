use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;

use crate::cli::{Cli, Command, SendArgs};
use crate::config::app_config::AppConfig;
use crate::db::setup_database;
use crate::logger::init_logger;
use crate::models::campaign_model::CampaignReport;
use crate::services::analytics_service::{AnalyticsRecorder, MixpanelRecorder, NoopRecorder};
use crate::services::campaign_sender_service::CampaignSenderService;
use crate::services::email_log_service::EmailLogService;
use crate::services::email_service::{MailTransport, SmtpTransport};
use crate::services::render_service::ContentRenderer;

mod app;
mod cli;
mod config;
mod db;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

fn build_analytics(config: &AppConfig) -> Arc<dyn AnalyticsRecorder> {
    match &config.mixpanel_token {
        Some(token) => Arc::new(MixpanelRecorder::new(token.clone())),
        None => {
            log::info!("MIXPANEL_TOKEN no definido; analytics deshabilitado");
            Arc::new(NoopRecorder)
        }
    }
}

async fn run_send(config: AppConfig, args: SendArgs) -> Result<()> {
    let db_pool = setup_database(&config.database_url).await?;

    let transport: Option<Arc<dyn MailTransport>> = match &config.smtp {
        Some(smtp) => Some(Arc::new(SmtpTransport::new(smtp)?)),
        None => None,
    };

    let send_delay = args
        .delay
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.send_delay());

    let sender = CampaignSenderService::new(
        db_pool,
        ContentRenderer::new(&config.site_url),
        transport,
        build_analytics(&config),
        send_delay,
    );

    let request = args.to_request();
    println!("Starting campaign '{}' (Dry Run: {})", request.name, request.dry_run);

    let report = sender.send_campaign(&request).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &CampaignReport) {
    for preview in &report.previews {
        println!("\n[Dry Run] Sending to {}...", preview.recipient);
        println!("Subject: {}", preview.subject);
        println!("--- Body (Full Preview) ---");
        println!("{}", preview.text_body);
        println!("--------------------------------");
    }

    let stats = &report.import_stats;
    println!(
        "Contacts Processed: {} created, {} updated, {} skipped (no email).",
        stats.created, stats.updated, stats.skipped
    );
    if !stats.errors.is_empty() {
        println!("Import Errors: {}", stats.errors.len());
        for err in &stats.errors {
            println!("  - {err}");
        }
    }

    println!("Emails Sent: {}", report.sent);
    if !report.errors.is_empty() {
        println!("Sending Errors: {}", report.errors.len());
        for err in &report.errors {
            println!("  - {err}");
        }
    }
    if let Some(reason) = &report.aborted {
        println!("Stopped early: {reason}");
    }
    println!("Done.");
}

async fn run_server(config: AppConfig, bind: Option<String>) -> Result<()> {
    let db_pool = setup_database(&config.database_url).await?;
    let log_service = EmailLogService::new(db_pool);
    let analytics = build_analytics(&config);
    let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());

    log::info!("Levantando servidor de tracking en {}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(log_service.clone()))
            .app_data(web::Data::new(analytics.clone()))
            .configure(app::init_app)
    })
    .bind(bind_addr.as_str())
    .with_context(|| format!("Failed to bind {bind_addr}"))?
    .run()
    .await
    .context("Tracking server failed")
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Command::Send(args) => run_send(config, args).await,
        Command::Serve { bind } => run_server(config, bind).await,
    }
}
