//! Integration test: organizations, members and credits end to end.

use attesta_core::{PlatformConfig, Role, Store};
use attesta_identity::NewMember;
use attesta_integration_tests::{app_key, platform};
use attesta_ledger::{LedgerError, Party, TransactionKind, LEDGER_KEY};
use attesta_platform::PlatformError;

#[tokio::test]
async fn test_acme_scenario() {
    let (p, _store) = platform(PlatformConfig::default());

    p.bootstrap(10_000).await.unwrap();

    let (acme, _) = p.register_organization("Acme", &app_key()).await.unwrap();
    let d1 = acme.identity.clone();

    p.fund(&d1, 500, "allocation").await.unwrap();
    assert_eq!(p.balance(&Party::Pool).await.unwrap(), 9_500);
    assert_eq!(p.balance(&Party::Identity(d1.clone())).await.unwrap(), 500);

    let (bob, _) = p
        .add_member(&d1, NewMember::named("Bob", Role::Operator), &app_key())
        .await
        .unwrap();
    let d2 = bob.identity.clone();
    assert_ne!(d1, d2);

    p.transfer(&d1, &d2, 100, "allocation").await.unwrap();
    assert_eq!(p.balance(&Party::Identity(d1.clone())).await.unwrap(), 400);
    assert_eq!(p.balance(&Party::Identity(d2.clone())).await.unwrap(), 100);

    p.consume(&d2, 1, "issue product").await.unwrap();
    assert_eq!(p.balance(&Party::Identity(d2.clone())).await.unwrap(), 99);

    let debits: Vec<_> = p
        .history(&Party::Identity(d2.clone()))
        .await
        .unwrap()
        .into_iter()
        .filter(|tx| tx.kind == TransactionKind::Debit)
        .collect();
    assert_eq!(debits.len(), 1);
    assert_eq!(debits[0].delta, -1);
    assert_eq!(debits[0].description, "issue product");

    assert_eq!(p.ledger().total_supply().await.unwrap(), 10_000);
}

#[tokio::test]
async fn test_failed_consume_changes_nothing() {
    let (p, store) = platform(PlatformConfig::default());
    p.bootstrap(100).await.unwrap();
    let (org, _) = p.register_organization("Acme", &app_key()).await.unwrap();
    p.fund(&org.identity, 3, "allocation").await.unwrap();

    let before = store.get(LEDGER_KEY).await.unwrap();
    let err = p.consume(&org.identity, 4, "too much").await.unwrap_err();
    assert!(matches!(
        err,
        PlatformError::Ledger(LedgerError::InsufficientFunds {
            available: 3,
            required: 4
        })
    ));
    assert_eq!(store.get(LEDGER_KEY).await.unwrap(), before);
}

#[tokio::test]
async fn test_conservation_through_org_lifecycle() {
    let (p, _) = platform(PlatformConfig {
        member_fee: 2,
        ..PlatformConfig::default()
    });
    p.bootstrap(1_000).await.unwrap();

    let mut orgs = Vec::new();
    for name in ["Acme", "Globex", "Initech"] {
        let (org, _) = p.register_organization(name, &app_key()).await.unwrap();
        p.fund(&org.identity, 100, "allocation").await.unwrap();
        for i in 0..3 {
            let (m, _) = p
                .add_member(&org.identity, NewMember::machine(format!("SN-{}", i)), &app_key())
                .await
                .unwrap();
            p.transfer(&org.identity, &m.identity, 10, "share").await.unwrap();
            p.consume(&m.identity, 3, "issue product").await.unwrap();
        }
        orgs.push(org);
    }
    assert_eq!(p.ledger().total_supply().await.unwrap(), 1_000);
    assert_eq!(
        p.balance(&Party::Identity(orgs[0].identity.clone())).await.unwrap(),
        100 - 3 * 2 - 3 * 10
    );

    p.remove_organization(&orgs[1].identity).await.unwrap();
    let member = p
        .directory()
        .organization(&orgs[2].identity)
        .await
        .unwrap()
        .members[0]
        .identity
        .clone();
    p.remove_member(&orgs[2].identity, &member).await.unwrap();

    assert_eq!(p.ledger().total_supply().await.unwrap(), 1_000);
    assert_eq!(p.directory().organizations().await.unwrap().len(), 2);
    assert!(p
        .balance(&Party::Identity(orgs[1].identity.clone()))
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_directory_and_ledger_share_store() {
    let (p, store) = platform(PlatformConfig::default());
    p.bootstrap(10).await.unwrap();
    p.register_organization("Acme", &app_key()).await.unwrap();

    assert!(store.get("directory").await.unwrap().is_some());
    assert!(store.get(LEDGER_KEY).await.unwrap().is_some());
    assert_eq!(store.len(), 2);
}
