//! cli.rs
//! Argumentos de línea de comandos.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::models::campaign_model::{CampaignRequest, RecipientScope};
use crate::services::template_service::TemplateOptions;

#[derive(Debug, Parser)]
#[command(name = "campaign_mailer", version, about = "Send personalized email campaigns from a CSV and a Markdown template")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import contacts and send (or preview) a campaign
    Send(SendArgs),
    /// Run the open/click tracking server
    Serve {
        /// Address to bind, overrides BIND_ADDR
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Path to the CSV file with contacts
    #[arg(long)]
    pub csv: PathBuf,

    /// Path to the Markdown template
    #[arg(long)]
    pub template: PathBuf,

    /// Subject used when the template does not declare one
    #[arg(long, default_value = "Cold Outreach")]
    pub subject: String,

    /// Campaign name (defaults to the CSV file name without extension)
    #[arg(long)]
    pub name: Option<String>,

    /// Seconds to wait between emails, overrides SEND_DELAY_SECS
    #[arg(long)]
    pub delay: Option<u64>,

    /// Render everything but do not send
    #[arg(long)]
    pub dry_run: bool,

    /// Send to every stored contact, not only the ones in this CSV
    #[arg(long)]
    pub all_contacts: bool,

    /// Keep lines like "Email:" that appear before the greeting
    #[arg(long)]
    pub keep_metadata_lines: bool,
}

impl SendArgs {
    pub fn to_request(&self) -> CampaignRequest {
        CampaignRequest {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| campaign_name_from_csv(&self.csv)),
            default_subject: self.subject.clone(),
            template_path: self.template.clone(),
            csv_path: self.csv.clone(),
            dry_run: self.dry_run,
            recipients: if self.all_contacts {
                RecipientScope::AllContacts
            } else {
                RecipientScope::Imported
            },
            template_options: TemplateOptions {
                strip_metadata_headers: !self.keep_metadata_lines,
            },
        }
    }
}

pub fn campaign_name_from_csv(csv_path: &Path) -> String {
    csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "campaign".to_string())
}
