//! tests/config_tests.rs

use crate::config::app_config::SmtpTls;

#[test]
fn test_smtp_tls_parse() {
    assert_eq!(SmtpTls::parse("").unwrap(), SmtpTls::Starttls);
    assert_eq!(SmtpTls::parse(" TLS ").unwrap(), SmtpTls::Tls);
    assert_eq!(SmtpTls::parse("none").unwrap(), SmtpTls::None);
    assert!(SmtpTls::parse("ssl3").is_err());
}

#[test]
fn test_default_port_follows_tls_mode() {
    assert_eq!(SmtpTls::Tls.default_port(), 465);
    assert_eq!(SmtpTls::Starttls.default_port(), 587);
    assert_eq!(SmtpTls::None.default_port(), 587);
}
