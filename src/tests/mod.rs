//! tests/mod.rs
//! Pruebas unitarias e integración de los servicios de campaña.

mod config_tests;
mod import_tests;
mod support;
mod tracking_handler_tests;
