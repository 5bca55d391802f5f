//! Integration test: seed phrases, sealing modes and secret lookup.

use attesta_core::{PlatformConfig, Role, Store};
use attesta_crypto::SecretSeed;
use attesta_identity::{EntityKind, IdentityError, NewMember};
use attesta_integration_tests::{app_key, password, platform};
use attesta_platform::PlatformError;

#[tokio::test]
async fn test_lookup_among_distractors() {
    let (p, _) = platform(PlatformConfig::default());

    let mut seeds = Vec::new();
    for i in 0..5 {
        let (org, seed) = p
            .register_organization(&format!("Org {}", i), &app_key())
            .await
            .unwrap();
        seeds.push((seed, org.identity.clone()));
        for j in 0..2 {
            let (m, seed) = p
                .add_member(
                    &org.identity,
                    NewMember::named(format!("Person {}-{}", i, j), Role::Creator),
                    &app_key(),
                )
                .await
                .unwrap();
            seeds.push((seed, m.identity.clone()));
        }
    }

    for (seed, did) in &seeds {
        let found = p.find_by_secret(seed, &app_key()).await.unwrap();
        assert_eq!(found.did(), did);
        match found.kind {
            EntityKind::Organization => assert!(found.member.is_none()),
            EntityKind::Member => assert!(found
                .organization
                .members
                .iter()
                .any(|m| &m.identity == did)),
        }
    }
}

#[tokio::test]
async fn test_seed_phrase_reentry_finds_identity() {
    let (p, _) = platform(PlatformConfig::default());
    let (org, seed) = p.register_organization("Acme", &app_key()).await.unwrap();

    // Users retype phrases with odd spacing and capitals.
    let retyped = format!("  {}  ", seed.expose().to_uppercase().replace(' ', "   "));
    let parsed = SecretSeed::parse(&retyped).unwrap();
    let found = p.find_by_secret(&parsed, &app_key()).await.unwrap();
    assert_eq!(found.did(), &org.identity);

    let derived = p.directory().identities().derive_identity(&parsed).unwrap();
    assert_eq!(derived.did, org.identity);
}

#[tokio::test]
async fn test_password_mode_and_migration() {
    let (p, store) = platform(PlatformConfig::default());
    let (org, seed) = p.register_organization("Acme", &app_key()).await.unwrap();
    let (_, member_seed) = p
        .add_member(&org.identity, NewMember::machine("SN-1"), &app_key())
        .await
        .unwrap();

    let migrated = p
        .directory()
        .rewrap_secrets(&app_key(), &password("correct horse"))
        .await
        .unwrap();
    assert_eq!(migrated, 2);

    let raw = store.get("directory").await.unwrap().unwrap().to_string();
    assert!(!raw.contains("app1$"));
    assert!(!raw.contains(seed.expose()));

    let found = p
        .find_by_secret(&member_seed, &password("correct horse"))
        .await
        .unwrap();
    assert_eq!(found.kind, EntityKind::Member);

    let wrong = p.find_by_secret(&seed, &password("battery staple")).await;
    assert!(matches!(
        wrong,
        Err(PlatformError::Identity(IdentityError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_wrong_key_is_detected_not_guessed() {
    let (p, _) = platform(PlatformConfig::default());
    let (org, _) = p
        .register_organization("Acme", &password("right"))
        .await
        .unwrap();
    let ids = p.directory().identities();

    let result = ids.decrypt_secret(&org.encrypted_secret, &password("wrong"));
    assert!(matches!(result, Err(IdentityError::Decryption(_))));
    let result = ids.decrypt_secret(&org.encrypted_secret, &app_key());
    assert!(matches!(result, Err(IdentityError::Decryption(_))));
}
