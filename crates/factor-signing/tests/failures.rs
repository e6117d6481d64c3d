//! Signer failures and forged replies abort the session

use assert_matches::assert_matches;
use factor_core::TransactionIntentHash;
use factor_signing::{LazySkip, PrudentSkip, SigningError, SigningSession};
use factor_testkit::{init_test_tracing, FailingSigner, Forgery, ForgingSigner, TestProfile};

fn intent() -> TransactionIntentHash {
    TransactionIntentHash::of_payload(b"stake 50 XRD")
}

#[tokio::test]
async fn test_signer_failure_aborts_and_keeps_earlier_signatures() {
    init_test_tracing();
    let profile = TestProfile::new();
    let signer = FailingSigner::new(profile.signer.clone(), profile.fs(0));
    let mut session =
        SigningSession::new(&profile.catalog, [profile.alice()], PrudentSkip).unwrap();

    let result = session.sign_transaction(&intent(), &signer).await;

    assert_matches!(
        result,
        Err(SigningError::SigningFailed { factor_source, reason })
            if factor_source == profile.fs(0) && reason.contains("cancelled")
    );
    // Ledger, arculus and yubikey signed before the device failed.
    assert_eq!(session.signatures().len(), 3);
    assert!(session.is_finished_signing());
    assert!(!session.signed_factor_sources().contains(&profile.fs(0)));
}

#[tokio::test]
async fn test_aborted_session_cannot_be_rerun() {
    init_test_tracing();
    let profile = TestProfile::new();
    let failing = FailingSigner::new(profile.signer.clone(), profile.fs(2));
    let mut session = SigningSession::new(&profile.catalog, [profile.alice()], LazySkip).unwrap();

    assert!(session.sign_transaction(&intent(), &failing).await.is_err());
    assert!(!session.is_finished_signing());

    let retry = session.sign_transaction(&intent(), &profile.signer).await;
    assert_matches!(retry, Err(SigningError::SessionAlreadyUsed));
}

#[tokio::test]
async fn test_signature_over_wrong_intent_rejected() {
    init_test_tracing();
    let profile = TestProfile::new();
    let signer = ForgingSigner::new(profile.signer.clone(), profile.fs(2), Forgery::WrongIntent);
    let mut session = SigningSession::new(&profile.catalog, [profile.alice()], LazySkip).unwrap();

    let result = session.sign_transaction(&intent(), &signer).await;

    assert_matches!(
        result,
        Err(SigningError::InvalidSignature { factor_source, entity })
            if factor_source == profile.fs(2) && entity.as_str() == "Alice"
    );
    assert!(session.signatures().is_empty());
}

#[tokio::test]
async fn test_unverified_session_accepts_wrong_intent() {
    init_test_tracing();
    let profile = TestProfile::new();
    let signer = ForgingSigner::new(profile.signer.clone(), profile.fs(2), Forgery::WrongIntent);
    let mut session = SigningSession::new(&profile.catalog, [profile.alice()], LazySkip)
        .unwrap()
        .with_signature_verification(false);

    let signatures = session.sign_transaction(&intent(), &signer).await.unwrap();

    assert_eq!(signatures.len(), 2);
    assert_eq!(signatures.iter().filter(|s| s.verify(&intent())).count(), 1);
}

#[tokio::test]
async fn test_incomplete_batch_rejected() {
    init_test_tracing();
    let profile = TestProfile::new();
    let signer = ForgingSigner::new(profile.signer.clone(), profile.fs(0), Forgery::Omit);
    let mut session =
        SigningSession::new(&profile.catalog, [profile.alice(), profile.carol()], LazySkip)
            .unwrap();

    let result = session.sign_transaction(&intent(), &signer).await;

    assert_matches!(
        result,
        Err(SigningError::SigningFailed { factor_source, reason })
            if factor_source == profile.fs(0) && reason.contains("Carol")
    );
    // Nothing from the incomplete device batch was recorded.
    assert!(session
        .signatures()
        .iter()
        .all(|s| s.factor_source_id() != profile.fs(0)));
}

#[tokio::test]
async fn test_misattributed_signature_rejected() {
    init_test_tracing();
    let profile = TestProfile::new();
    let signer = ForgingSigner::new(profile.signer.clone(), profile.fs(4), Forgery::Misattribute);
    let mut session = SigningSession::new(&profile.catalog, [profile.bob()], LazySkip).unwrap();

    let result = session.sign_transaction(&intent(), &signer).await;

    assert_matches!(
        result,
        Err(SigningError::InvalidSignature { entity, .. }) if entity.as_str() == "Mallory"
    );
    assert_eq!(session.is_entity_finished(&"Bob".into()), Some(false));
}
