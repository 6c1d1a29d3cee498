//! config/app_config.rs
//! Configuración global leída del entorno (.env incluido).

use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    Starttls,
    Tls,
    None,
}

impl SmtpTls {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "starttls" => Ok(SmtpTls::Starttls),
            "tls" => Ok(SmtpTls::Tls),
            "none" => Ok(SmtpTls::None),
            other => Err(anyhow!("Invalid SMTP_TLS value: {other}")),
        }
    }

    /// Puerto cuando no hay SMTP_PORT: 465 para TLS implícito, 587 si no.
    pub fn default_port(self) -> u16 {
        match self {
            SmtpTls::Tls => 465,
            SmtpTls::Starttls | SmtpTls::None => 587,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub pass: Option<String>,
    pub from: String,
    pub tls: SmtpTls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Base para los links de tracking (pixel y redirect)
    pub site_url: String,
    pub send_delay_secs: u64,
    pub bind_addr: String,
    /// Solo hace falta para envíos reales
    pub smtp: Option<SmtpConfig>,
    #[serde(skip_serializing)]
    pub mixpanel_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: "sqlite:data/campaigns.db".to_string(),
            site_url: "http://localhost:8000".to_string(),
            send_delay_secs: 10,
            bind_addr: "0.0.0.0:8000".to_string(),
            smtp: None,
            mixpanel_token: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = AppConfig::default();

        let send_delay_secs = match non_empty_var("SEND_DELAY_SECS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("Invalid SEND_DELAY_SECS: {v}"))?,
            None => defaults.send_delay_secs,
        };

        let smtp = match non_empty_var("SMTP_HOST") {
            Some(host) => {
                let tls = SmtpTls::parse(&env::var("SMTP_TLS").unwrap_or_default())?;
                let port = match non_empty_var("SMTP_PORT") {
                    Some(p) => p.parse().with_context(|| format!("Invalid SMTP_PORT: {p}"))?,
                    None => tls.default_port(),
                };
                let user = non_empty_var("SMTP_USER");
                let from = non_empty_var("SMTP_FROM")
                    .or_else(|| user.clone())
                    .ok_or_else(|| anyhow!("SMTP_FROM (or SMTP_USER) is required when SMTP_HOST is set"))?;
                Some(SmtpConfig {
                    host,
                    port,
                    user,
                    pass: non_empty_var("SMTP_PASS"),
                    from,
                    tls,
                })
            }
            None => None,
        };

        Ok(AppConfig {
            database_url: non_empty_var("DATABASE_URL").unwrap_or(defaults.database_url),
            site_url: non_empty_var("SITE_URL").unwrap_or(defaults.site_url),
            send_delay_secs,
            bind_addr: non_empty_var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            smtp,
            mixpanel_token: non_empty_var("MIXPANEL_TOKEN"),
        })
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_secs(self.send_delay_secs)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
