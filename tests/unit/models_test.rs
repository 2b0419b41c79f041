// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use briefdesk::domain::models::account::{normalize_email, Account, Role};
use briefdesk::domain::models::task::{Task, TaskFieldUpdate, TaskStatus};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

#[test]
fn test_task_status_accepts_legacy_spellings() {
    assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::Started);
    assert_eq!("pending".parse::<TaskStatus>().unwrap(), TaskStatus::Draft);
    assert_eq!("archived".parse::<TaskStatus>().unwrap(), TaskStatus::Archive);
    assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
    assert!("shipped".parse::<TaskStatus>().is_err());
}

#[test]
fn test_field_update_only_fills_empty_slots() {
    let mut task = Task::new(Uuid::new_v4(), Uuid::new_v4(), "Launch".to_string());
    task.client_name = Some("Ada".to_string());

    let deadline = NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(17, 0, 0)
        .unwrap();
    let update = TaskFieldUpdate {
        client_name: Some("Grace".to_string()),
        deadline: Some(deadline),
        ..Default::default()
    };

    assert!(update.apply_to(&mut task));
    assert_eq!(task.client_name.as_deref(), Some("Ada"));
    assert_eq!(task.deadline, Some(deadline));

    // 第二次合并没有空位可填
    assert!(!update.apply_to(&mut task));
}

#[test]
fn test_field_names_use_wire_casing() {
    let update = TaskFieldUpdate {
        client_email: Some("a@b.co".to_string()),
        estimated_price: Some(300.0),
        ..Default::default()
    };
    assert_eq!(update.field_names(), vec!["clientEmail", "estimatedPrice"]);
    assert!(TaskFieldUpdate::default().is_empty());
}

#[test]
fn test_admin_flag_overrides_stored_role() {
    let mut account = Account::new_client("  Owner@Example.COM ", "Owner".to_string(), None, None);
    assert_eq!(account.email, "owner@example.com");
    assert_eq!(account.effective_role(), Role::Client);

    account.role = Role::ServiceProvider;
    assert_eq!(account.effective_role(), Role::ServiceProvider);

    account.is_master_admin = true;
    assert_eq!(account.effective_role(), Role::MasterAdmin);
}

#[test]
fn test_default_organization_name_prefers_company() {
    let mut account = Account::new_client("x@y.z", "Sam".to_string(), Some("  ".to_string()), None);
    assert_eq!(account.default_organization_name(), "Sam");

    account.company_name = Some("Acme Films".to_string());
    assert_eq!(account.default_organization_name(), "Acme Films");
    assert_eq!(normalize_email(" MIXED@Case.io"), "mixed@case.io");
    assert!(account.created_at <= Utc::now());
}
