//! Integration test: paid credential issuance, verification and tampering.

use attesta_core::{CredentialState, PlatformConfig, Role};
use attesta_credentials::{
    append_event, classify, verify, verify_value, CredentialDocument, CredentialKind,
    CredentialSubject,
};
use attesta_identity::NewMember;
use attesta_integration_tests::{app_key, platform};
use attesta_ledger::Party;
use serde_json::json;

#[tokio::test]
async fn test_member_issues_product_passport() {
    let (p, _) = platform(PlatformConfig::default());
    p.bootstrap(1_000).await.unwrap();
    let (org, _) = p.register_organization("Acme", &app_key()).await.unwrap();
    let (creator, _) = p
        .add_member(&org.identity, NewMember::named("Dana", Role::Creator), &app_key())
        .await
        .unwrap();
    p.fund(&creator.identity, 5, "allocation").await.unwrap();

    let draft = CredentialDocument::new(
        CredentialKind::ProductPassport,
        &creator.identity,
        CredentialSubject::new("urn:product:widget-1")
            .with_claim("manufacturer", json!(org.name))
            .with_claim("materials", json!(["steel", "copper"])),
    );
    assert_eq!(classify(&draft.to_value().unwrap()), CredentialState::Draft);

    let mut issued = p.issue_credential(&creator.identity, &draft).await.unwrap();
    assert!(verify(&issued).valid);
    assert_eq!(
        p.balance(&Party::Identity(creator.identity.clone()))
            .await
            .unwrap(),
        4
    );

    append_event(&mut issued, json!({"event": "shipped", "to": "Globex"}));
    append_event(&mut issued, json!({"event": "received"}));
    assert!(verify(&issued).valid);

    issued
        .credential_subject
        .claims
        .insert("materials".into(), json!(["plastic"]));
    let result = verify(&issued);
    assert!(!result.valid);
    assert!(result.reason.is_some());
    assert_eq!(
        classify(&issued.to_value().unwrap()),
        CredentialState::Tampered
    );
}

#[tokio::test]
async fn test_unfunded_issuer_gets_no_proof() {
    let (p, _) = platform(PlatformConfig {
        issuance_fee: 3,
        ..PlatformConfig::default()
    });
    p.bootstrap(10).await.unwrap();
    let (org, _) = p.register_organization("Acme", &app_key()).await.unwrap();
    p.fund(&org.identity, 2, "allocation").await.unwrap();

    let raw = json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "type": ["VerifiableCredential", "MembershipCredential"],
        "issuer": org.identity.to_string(),
        "issuanceDate": "2026-01-01T00:00:00Z",
        "credentialSubject": {"id": "did:example:1", "level": "gold"}
    });
    assert!(p.issue_credential_value(&org.identity, &raw).await.is_err());
    assert_eq!(
        p.balance(&Party::Identity(org.identity.clone())).await.unwrap(),
        2
    );

    p.fund(&org.identity, 1, "top up").await.unwrap();
    let issued = p.issue_credential_value(&org.identity, &raw).await.unwrap();
    assert!(verify_value(&issued).valid);
    assert_eq!(issued["proof"]["verificationMethod"], org.identity.to_string());

    let history = p
        .history(&Party::Identity(org.identity.clone()))
        .await
        .unwrap();
    assert_eq!(
        history.last().unwrap().description,
        "issue MembershipCredential"
    );
}

#[tokio::test]
async fn test_reissue_repairs_tampered_document() {
    let (p, _) = platform(PlatformConfig {
        issuance_fee: 0,
        ..PlatformConfig::default()
    });
    let (org, _) = p.register_organization("Acme", &app_key()).await.unwrap();
    let doc = json!({
        "issuer": org.identity.to_string(),
        "credentialSubject": {"grade": "A"},
        "uid": "row-1"
    });

    let mut issued = p.issue_credential_value(&org.identity, &doc).await.unwrap();
    issued["credentialSubject"]["grade"] = json!("B");
    assert_eq!(classify(&issued), CredentialState::Tampered);

    let reissued = p.issue_credential_value(&org.identity, &issued).await.unwrap();
    assert_eq!(classify(&reissued), CredentialState::Issued);
}
