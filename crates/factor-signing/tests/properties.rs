//! Property tests of skip policies over generated entity sets

use factor_core::{Entity, FactorSourceKind, TransactionIntentHash};
use factor_signing::{
    EntitySigningProcess, LazySkip, PrudentSkip, RandomSkip, SigningProcess, SigningSession,
};
use factor_testkit::{arb_disjoint_scenario, arb_shared_scenario, Scenario};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn run(scenario: &Scenario, mut session: SigningSession) -> SigningSession {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let intent = TransactionIntentHash::of_payload(b"property");
    runtime
        .block_on(session.sign_transaction(&intent, &scenario.signer))
        .unwrap();
    session
}

fn threshold_sum(entities: &[Entity]) -> usize {
    entities.iter().map(Entity::threshold).sum()
}

fn factor_count_sum(entities: &[Entity]) -> usize {
    entities.iter().map(Entity::factor_count).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lazy_signs_exactly_the_thresholds(shape in arb_disjoint_scenario(2)) {
        let scenario = shape.build();
        let session =
            SigningSession::new(&scenario.catalog, scenario.entities.clone(), LazySkip).unwrap();
        let session = run(&scenario, session);

        prop_assert!(session.is_finished_signing());
        prop_assert_eq!(session.signatures().len(), threshold_sum(&scenario.entities));
    }

    #[test]
    fn lazy_on_shared_sources_stays_within_bounds(shape in arb_shared_scenario()) {
        let scenario = shape.build();
        let session =
            SigningSession::new(&scenario.catalog, scenario.entities.clone(), LazySkip).unwrap();
        let session = run(&scenario, session);

        prop_assert!(session.is_finished_signing());
        let signed = session.signatures().len();
        prop_assert!(signed >= threshold_sum(&scenario.entities));
        prop_assert!(signed <= factor_count_sum(&scenario.entities));
    }

    #[test]
    fn prudent_signs_with_every_factor(shape in arb_shared_scenario()) {
        let scenario = shape.build();
        let session =
            SigningSession::new(&scenario.catalog, scenario.entities.clone(), PrudentSkip)
                .unwrap();
        let session = run(&scenario, session);

        prop_assert!(session.skipped_factor_sources().is_empty());
        prop_assert_eq!(session.signatures().len(), factor_count_sum(&scenario.entities));
    }

    #[test]
    fn random_signs_at_least_the_thresholds(
        shape in arb_disjoint_scenario(0),
        seed in any::<u64>(),
    ) {
        let scenario = shape.build();
        let session = SigningSession::new(
            &scenario.catalog,
            scenario.entities.clone(),
            RandomSkip::seeded(seed),
        )
        .unwrap();
        let session = run(&scenario, session);

        prop_assert!(session.is_finished_signing());
        prop_assert!(session.signatures().len() >= threshold_sum(&scenario.entities));
        prop_assert!(session.signatures().len() <= factor_count_sum(&scenario.entities));
    }

    #[test]
    fn random_sessions_always_finish(shape in arb_shared_scenario(), seed in any::<u64>()) {
        let scenario = shape.build();
        let session = SigningSession::new(
            &scenario.catalog,
            scenario.entities.clone(),
            RandomSkip::seeded(seed),
        )
        .unwrap();
        let session = run(&scenario, session);

        prop_assert!(session.is_finished_signing());

        // Every needed factor source is decided exactly once.
        let needed: BTreeSet<_> = session
            .factor_sources_of_kind()
            .iter()
            .map(|source| source.id())
            .collect();
        let skipped: BTreeSet<_> = session.skipped_factor_sources().iter().copied().collect();
        let signed: BTreeSet<_> = session.signed_factor_sources().iter().copied().collect();
        prop_assert!(skipped.is_disjoint(&signed));
        prop_assert_eq!(&skipped | &signed, needed);
    }

    #[test]
    fn signatures_follow_kind_priority(shape in arb_shared_scenario(), seed in any::<u64>()) {
        let scenario = shape.build();
        let session = SigningSession::new(
            &scenario.catalog,
            scenario.entities.clone(),
            RandomSkip::seeded(seed),
        )
        .unwrap();
        let session = run(&scenario, session);

        for entity in &scenario.entities {
            let process = session.process(entity.address()).unwrap();
            let kinds: Vec<FactorSourceKind> =
                process.signatures().iter().map(|s| s.kind()).collect();
            prop_assert!(kinds.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }

    #[test]
    fn skipped_factor_sources_stay_skipped(shape in arb_shared_scenario(), seed in any::<u64>()) {
        let scenario = shape.build();
        let session = SigningSession::new(
            &scenario.catalog,
            scenario.entities.clone(),
            RandomSkip::seeded(seed),
        )
        .unwrap();
        let session = run(&scenario, session);

        for entity in &scenario.entities {
            if let Some(EntitySigningProcess::Securified(process)) =
                session.process(entity.address())
            {
                for id in process.skipped_factor_sources() {
                    prop_assert!(!process.can_skip_factor_source(*id));
                }

                let sufficient = !process.signed_override_factors().is_empty()
                    || process.signed_threshold_factors().len() >= process.control().threshold();
                prop_assert_eq!(process.is_finished_signing(), sufficient);
            }
        }
    }
}
