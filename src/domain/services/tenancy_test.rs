// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::domain::models::account::Account;
use uuid::Uuid;

fn caller(role: Role, scope: OrgScope) -> CallerContext {
    let mut account = Account::new_client("someone@example.com", "Someone".into(), None, None);
    account.role = role;
    CallerContext {
        account,
        role,
        scope,
    }
}

#[test]
fn test_admin_is_unrestricted() {
    let admin = caller(Role::MasterAdmin, OrgScope::Unrestricted);
    let filter = TenancyFilter::for_caller(&admin);

    assert_eq!(filter, TenancyFilter::Unrestricted);
    assert!(filter.permits(Uuid::new_v4(), None));
}

#[test]
fn test_empty_scope_yields_empty_filter() {
    // 新客户还没有加入任何组织
    let client = caller(Role::Client, OrgScope::Organizations(vec![]));
    let filter = TenancyFilter::for_caller(&client);

    assert!(filter.is_empty());
    assert!(!filter.permits(client.account_id(), Some(Uuid::new_v4())));
}

#[test]
fn test_provider_sees_whole_organization() {
    let org = Uuid::new_v4();
    let provider = caller(Role::ServiceProvider, OrgScope::Organizations(vec![org]));
    let filter = TenancyFilter::for_caller(&provider);

    let client_a = Uuid::new_v4();
    let client_b = Uuid::new_v4();
    assert!(filter.permits(client_a, Some(org)));
    assert!(filter.permits(client_b, Some(org)));
    // 其他组织的任务不可见
    assert!(!filter.permits(client_a, Some(Uuid::new_v4())));
    assert!(!filter.permits(client_a, None));
}

#[test]
fn test_client_never_sees_peer_tasks_in_shared_org() {
    let org_x = Uuid::new_v4();
    let client_a = caller(Role::Client, OrgScope::Organizations(vec![org_x]));
    let client_b_id = Uuid::new_v4();

    let filter = TenancyFilter::for_caller(&client_a);

    assert!(filter.permits(client_a.account_id(), Some(org_x)));
    assert!(!filter.permits(client_b_id, Some(org_x)));
}

#[test]
fn test_client_own_task_outside_scope_is_hidden() {
    let org_x = Uuid::new_v4();
    let org_y = Uuid::new_v4();
    let client = caller(Role::Client, OrgScope::Organizations(vec![org_x]));
    let filter = TenancyFilter::for_caller(&client);

    assert!(!filter.permits(client.account_id(), Some(org_y)));
}

#[test]
fn test_roster_scope_by_role() {
    let org = Uuid::new_v4();
    let provider = caller(Role::ServiceProvider, OrgScope::Organizations(vec![org]));
    let unprovisioned = caller(Role::ServiceProvider, OrgScope::Organizations(vec![]));
    let admin = caller(Role::MasterAdmin, OrgScope::Unrestricted);
    let client = caller(Role::Client, OrgScope::Organizations(vec![org]));

    assert_eq!(roster_scope(&provider).unwrap(), RosterScope::Organization(org));
    assert_eq!(roster_scope(&unprovisioned).unwrap(), RosterScope::Empty);
    assert_eq!(roster_scope(&admin).unwrap(), RosterScope::All);
    assert!(matches!(
        roster_scope(&client),
        Err(ServiceError::Forbidden(_))
    ));
}

#[test]
fn test_primary_organization_is_earliest_link() {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let client = caller(Role::Client, OrgScope::Organizations(vec![first, second]));

    assert_eq!(client.primary_organization(), Some(first));
    assert!(client.can_access_organization(second));
    assert!(!client.can_access_organization(Uuid::new_v4()));
}
