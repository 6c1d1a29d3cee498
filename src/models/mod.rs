//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod campaign_model;
pub mod contact_model;
pub mod email_log_model;
pub mod message_model;
