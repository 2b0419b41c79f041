// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use briefdesk::config::settings::Settings;
use briefdesk::domain::models::account::{Account, Role};
use briefdesk::domain::models::organization::{Organization, PlanTier, Subscription};
use briefdesk::domain::repositories::account_repository::AccountRepository;
use briefdesk::domain::repositories::client_link_repository::{
    ClientLinkRepository, RedeemOutcome,
};
use briefdesk::domain::repositories::organization_repository::OrganizationRepository;
use briefdesk::infrastructure::database::connection;
use briefdesk::infrastructure::repositories::account_repo_impl::AccountRepositoryImpl;
use briefdesk::infrastructure::repositories::client_link_repo_impl::ClientLinkRepositoryImpl;
use briefdesk::infrastructure::repositories::organization_repo_impl::OrganizationRepositoryImpl;
use briefdesk::utils::tokens::{generate_invite_code, generate_service_id};
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

struct Fixture {
    links: ClientLinkRepositoryImpl,
    organizations: OrganizationRepositoryImpl,
    organization_id: Uuid,
    client_id: Uuid,
}

async fn memory_db() -> Arc<DatabaseConnection> {
    let mut settings = Settings::defaults().unwrap();
    settings.database.url = "sqlite::memory:".to_string();
    let db = connection::create_pool(&settings.database).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Arc::new(db)
}

async fn fixture() -> Fixture {
    let db = memory_db().await;
    let accounts = AccountRepositoryImpl::new(db.clone());
    let organizations = OrganizationRepositoryImpl::new(db.clone());

    let mut owner = Account::new_client("owner@studio.test", "Owner".to_string(), None, None);
    owner.role = Role::ServiceProvider;
    accounts.create(&owner).await.unwrap();
    let client = Account::new_client("client@studio.test", "Client".to_string(), None, None);
    accounts.create(&client).await.unwrap();

    let now = Utc::now();
    let organization = Organization {
        id: Uuid::new_v4(),
        owner_id: owner.id,
        name: "Studio".to_string(),
        slug: "studio".to_string(),
        service_id: generate_service_id(),
        invite_code: generate_invite_code(),
        created_at: now,
        updated_at: now,
    };
    let subscription = Subscription::start(organization.id, PlanTier::Monthly, None, now);
    organizations
        .create_with_subscription(&organization, &subscription)
        .await
        .unwrap();

    Fixture {
        links: ClientLinkRepositoryImpl::new(db),
        organizations,
        organization_id: organization.id,
        client_id: client.id,
    }
}

async fn client_count(fixture: &Fixture) -> i32 {
    fixture
        .organizations
        .find_subscription(fixture.organization_id)
        .await
        .unwrap()
        .unwrap()
        .client_count
}

#[tokio::test]
async fn test_redeem_links_once_and_counts_once() {
    let f = fixture().await;

    let first = f
        .links
        .redeem(f.client_id, f.organization_id, Utc::now())
        .await
        .unwrap();
    assert!(matches!(first, RedeemOutcome::Linked(ref link) if link.client_id == f.client_id));

    let second = f
        .links
        .redeem(f.client_id, f.organization_id, Utc::now())
        .await
        .unwrap();
    assert!(matches!(second, RedeemOutcome::AlreadyLinked));

    assert_eq!(client_count(&f).await, 1);
    assert!(f.links.exists(f.client_id, f.organization_id).await.unwrap());
    assert_eq!(f.links.list_for_client(f.client_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_remove_never_drives_count_negative() {
    let f = fixture().await;
    f.links
        .redeem(f.client_id, f.organization_id, Utc::now())
        .await
        .unwrap();

    assert!(f.links.remove(f.client_id, f.organization_id).await.unwrap());
    assert!(!f.links.remove(f.client_id, f.organization_id).await.unwrap());
    assert_eq!(client_count(&f).await, 0);
}

#[tokio::test]
async fn test_redeem_rejected_after_cancellation() {
    let f = fixture().await;
    let now = Utc::now();
    f.organizations
        .renew_subscription(f.organization_id, PlanTier::Monthly, Some("cus_1".to_string()), now)
        .await
        .unwrap();
    assert_eq!(f.organizations.cancel_by_customer("cus_1").await.unwrap(), 1);

    let outcome = f
        .links
        .redeem(f.client_id, f.organization_id, Utc::now())
        .await
        .unwrap();
    assert!(matches!(outcome, RedeemOutcome::SubscriptionInactive));
    assert_eq!(client_count(&f).await, 0);
}
