//! tests/import_tests.rs
//! Importación CSV contra SQLite en memoria.

use actix_rt::test;
use tempfile::tempdir;

use crate::db::memory_pool;
use crate::services::contact_service::ContactService;
use crate::services::import_service::ImportService;
use crate::tests::support::write_file;

async fn services() -> (ImportService, ContactService) {
    let contact_service = ContactService::new(memory_pool().await);
    (ImportService::new(contact_service.clone()), contact_service)
}

#[test]
async fn test_import_creates_contacts_and_skips_rows_without_email() {
    let (importer, contacts) = services().await;
    let dir = tempdir().unwrap();
    let csv = write_file(
        dir.path(),
        "leads.csv",
        " Name , Email ,Company,Job Role\n\
         Ada Lovelace,ada@example.com,Acme,Engineer\n\
         Grace Hopper,,Navy,Admiral\n\
         Alan Turing, alan@example.com ,Bletchley,\n",
    );

    let result = importer.import_contacts(&csv).await;

    assert_eq!(result.created, 2);
    assert_eq!(result.updated, 0);
    assert_eq!(result.skipped, 1);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.emails, vec!["ada@example.com", "alan@example.com"]);

    let ada = contacts.get_by_email("ada@example.com").await.unwrap().unwrap();
    assert_eq!(ada.first_name, "Ada");
    assert_eq!(ada.last_name, "Lovelace");
    assert_eq!(ada.company, "Acme");
    assert_eq!(ada.extra.get("Job Role").map(String::as_str), Some("Engineer"));
    assert_eq!(ada.extra.get("Name").map(String::as_str), Some("Ada Lovelace"));
}

#[test]
async fn test_extra_column_values_are_trimmed() {
    let (importer, contacts) = services().await;
    let dir = tempdir().unwrap();
    let csv = write_file(
        dir.path(),
        "padded.csv",
        "Name,Email,Location
  Alan Turing , alan@example.com , Manchester 
",
    );

    let result = importer.import_contacts(&csv).await;
    assert_eq!(result.created, 1);

    let alan = contacts.get_by_email("alan@example.com").await.unwrap().unwrap();
    assert_eq!(alan.extra.get("Email").map(String::as_str), Some("alan@example.com"));
    assert_eq!(alan.extra.get("Name").map(String::as_str), Some("Alan Turing"));
    assert_eq!(alan.extra.get("Location").map(String::as_str), Some("Manchester"));
}

#[test]
async fn test_header_aliases_are_case_insensitive() {
    let (importer, contacts) = services().await;
    let dir = tempdir().unwrap();
    let csv = write_file(
        dir.path(),
        "aliases.csv",
        "EMAIL,first_name,Last Name,COMPANY\nbob@example.com,Bob,Builder,Fix It\n",
    );

    let result = importer.import_contacts(&csv).await;
    assert_eq!(result.created, 1);

    let bob = contacts.get_by_email("bob@example.com").await.unwrap().unwrap();
    assert_eq!(bob.first_name, "Bob");
    assert_eq!(bob.last_name, "Builder");
    assert_eq!(bob.company, "Fix It");
}

#[test]
async fn test_reimport_counts_updates_and_keeps_latest_values() {
    let (importer, contacts) = services().await;
    let dir = tempdir().unwrap();
    let first = write_file(
        dir.path(),
        "first.csv",
        "Name,Email,Company\nAda Lovelace,ada@example.com,Acme\nAlan Turing,alan@example.com,Bletchley\n",
    );
    let second = write_file(
        dir.path(),
        "second.csv",
        "Name,Email,Company\nAda King,ada@example.com,Analytical\nAlan Turing,alan@example.com,Manchester\n",
    );

    let r1 = importer.import_contacts(&first).await;
    assert_eq!((r1.created, r1.updated), (2, 0));

    let r2 = importer.import_contacts(&second).await;
    assert_eq!((r2.created, r2.updated), (0, 2));

    let ada = contacts.get_by_email("ada@example.com").await.unwrap().unwrap();
    assert_eq!(ada.last_name, "King");
    assert_eq!(ada.company, "Analytical");
    assert_eq!(contacts.list_all().await.unwrap().len(), 2);
}

#[test]
async fn test_update_keeps_fields_missing_from_file() {
    let (importer, contacts) = services().await;
    let dir = tempdir().unwrap();
    let first = write_file(
        dir.path(),
        "first.csv",
        "Name,Email,Company,Location\nAda Lovelace,ada@example.com,Acme,London\n",
    );
    let second = write_file(dir.path(), "second.csv", "Email,Job Role\nada@example.com,CTO\n");

    importer.import_contacts(&first).await;
    let r2 = importer.import_contacts(&second).await;
    assert_eq!(r2.updated, 1);

    let ada = contacts.get_by_email("ada@example.com").await.unwrap().unwrap();
    assert_eq!(ada.first_name, "Ada");
    assert_eq!(ada.last_name, "Lovelace");
    assert_eq!(ada.company, "Acme");
    assert_eq!(ada.extra.get("Location").map(String::as_str), Some("London"));
    assert_eq!(ada.extra.get("Job Role").map(String::as_str), Some("CTO"));
}

#[test]
async fn test_malformed_row_is_reported_and_import_continues() {
    let (importer, _) = services().await;
    let dir = tempdir().unwrap();
    let csv = write_file(
        dir.path(),
        "broken.csv",
        "Name,Email\nAda,ada@example.com\nOnly one field plus,extra,columns\nAlan,alan@example.com\n",
    );

    let result = importer.import_contacts(&csv).await;
    assert_eq!(result.created, 2);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("row 3:"), "{:?}", result.errors);
}

#[test]
async fn test_missing_file_is_a_single_error() {
    let (importer, _) = services().await;
    let dir = tempdir().unwrap();

    let result = importer.import_contacts(&dir.path().join("nope.csv")).await;
    assert_eq!(result.created, 0);
    assert_eq!(result.updated, 0);
    assert_eq!(result.errors.len(), 1);
    assert!(result.emails.is_empty());
}

#[test]
async fn test_duplicate_email_in_same_file() {
    let (importer, _) = services().await;
    let dir = tempdir().unwrap();
    let csv = write_file(
        dir.path(),
        "dupes.csv",
        "Email,Name\nada@example.com,Ada\nada@example.com,Ada L\n",
    );

    let result = importer.import_contacts(&csv).await;
    assert_eq!(result.created + result.updated, 2);
    assert_eq!(result.emails, vec!["ada@example.com"]);
}
