//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod analytics_service;
pub mod campaign_sender_service;
pub mod campaign_service;
pub mod contact_service;
pub mod email_log_service;
pub mod email_service;
pub mod import_service;
pub mod placeholder_service;
pub mod render_service;
pub mod template_service;
