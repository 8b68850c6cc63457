//! Property-based tests for the Twist state core
//!
//! Properties tested:
//! - Sync percentage stays within [0, 100]
//! - claimed <= vested after any sequence of grants and claims
//! - Rejected grants leave the ledger unchanged
//! - Registration and deregistration keep the counters consistent

use proptest::prelude::*;
use twist_common::{
    crypto::Identity,
    error::CoreError,
    node::{sync_percentage, ChainType, CloudProvider, NodeRegistration},
};
use twist_daemon::core::{CoreConfig, CoreState};

const ADMIN: Identity = Identity::new([1u8; 32]);
const WINDOW_START: u64 = 1_000;
const WINDOW_DURATION: u64 = 10_000;

fn new_state(max_supply: u64) -> CoreState {
    let config = CoreConfig::new(ADMIN, WINDOW_START, WINDOW_DURATION).with_max_supply(max_supply);
    match CoreState::new(&config) {
        Ok(state) => state,
        Err(e) => panic!("invalid test config: {}", e),
    }
}

fn beneficiary(index: u8) -> Identity {
    Identity::new([index + 10; 32])
}

fn chain_type() -> impl Strategy<Value = ChainType> {
    prop_oneof![
        Just(ChainType::Ethereum),
        Just(ChainType::Polygon),
        Just(ChainType::Arbitrum),
        Just(ChainType::Bsc),
        Just(ChainType::Custom),
    ]
}

#[derive(Clone, Debug)]
enum VestingOp {
    Grant { who: u8, amount: u64 },
    Claim { who: u8, now: u64 },
}

fn vesting_op() -> impl Strategy<Value = VestingOp> {
    prop_oneof![
        (0u8..4, 1u64..1_000_000).prop_map(|(who, amount)| VestingOp::Grant { who, amount }),
        (0u8..4, 0u64..15_000).prop_map(|(who, now)| VestingOp::Claim { who, now }),
    ]
}

// Property 1: sync percentage is bounded and full when nothing is known
proptest! {
    #[test]
    fn test_sync_percentage_bounded(current in any::<u64>(), highest in any::<u64>()) {
        let percent = sync_percentage(current, highest);
        prop_assert!(percent <= 100);

        if highest == 0 || current >= highest {
            prop_assert_eq!(percent, 100);
        } else {
            prop_assert!(percent < 100);
        }
    }
}

// Property 2: claimed never exceeds vested, whatever the call order
proptest! {
    #[test]
    fn test_claimed_never_exceeds_vested(ops in prop::collection::vec(vesting_op(), 1..60)) {
        let mut state = new_state(u64::MAX);
        let mut minted = [0u64; 4];

        // Claims use a non-decreasing logical clock
        let mut clock = 0;
        for op in ops {
            match op {
                VestingOp::Grant { who, amount } => {
                    prop_assert_eq!(state.add_vesting(&ADMIN, &beneficiary(who), amount, 0), Ok(()));
                }
                VestingOp::Claim { who, now } => {
                    clock = clock.max(now);
                    match state.claim(&beneficiary(who), clock) {
                        Ok(mint) => {
                            prop_assert!(mint.amount > 0);
                            minted[who as usize] += mint.amount;
                        }
                        Err(e) => prop_assert_eq!(e, CoreError::NothingToClaim),
                    }
                }
            }

            for who in 0..4u8 {
                let entry = state.vesting().vesting_of(&beneficiary(who));
                prop_assert!(entry.claimed <= entry.vested);
                prop_assert_eq!(entry.claimed, minted[who as usize]);
            }
        }
    }
}

// Property 3: claimable is zero at the window start and complete at its end
proptest! {
    #[test]
    fn test_claimable_window_edges(amount in 1u64..u64::MAX / 2, early in 0u64..=WINDOW_START, late in 0u64..1_000_000) {
        let mut state = new_state(u64::MAX);
        let who = beneficiary(0);
        prop_assert_eq!(state.add_vesting(&ADMIN, &who, amount, 0), Ok(()));

        let end = WINDOW_START + WINDOW_DURATION;
        prop_assert_eq!(state.vesting().claimable(&who, early), 0);
        prop_assert_eq!(state.vesting().claimable(&who, end + late), amount);
    }
}

// Property 4: a grant over the cap is rejected and changes nothing
proptest! {
    #[test]
    fn test_cap_rejection_is_side_effect_free(
        max_supply in 1u64..1_000_000,
        current_supply in 0u64..1_000_000,
        amounts in prop::collection::vec(1u64..500_000, 1..10),
    ) {
        let mut state = new_state(max_supply);
        for (i, amount) in amounts.into_iter().enumerate() {
            let who = beneficiary((i % 4) as u8);
            let total_before = state.vesting().total_vested();
            let entry_before = state.vesting().vesting_of(&who);
            let events_before = state.events().len();

            let fits = current_supply as u128 + total_before as u128 + amount as u128 <= max_supply as u128;
            match state.add_vesting(&ADMIN, &who, amount, current_supply) {
                Ok(()) => {
                    prop_assert!(fits);
                    prop_assert_eq!(state.vesting().total_vested(), total_before + amount);
                }
                Err(e) => {
                    prop_assert!(!fits);
                    prop_assert_eq!(e, CoreError::ExceedsMaxSupply);
                    prop_assert_eq!(state.vesting().total_vested(), total_before);
                    prop_assert_eq!(state.vesting().vesting_of(&who), entry_before);
                    prop_assert_eq!(state.events().len(), events_before);
                }
            }
        }
    }
}

// Property 5: counters follow registrations and deregistrations exactly
proptest! {
    #[test]
    fn test_counters_consistent(
        nodes in prop::collection::vec((chain_type(), any::<bool>()), 1..30),
    ) {
        let mut state = new_state(u64::MAX);
        let owner = Identity::new([2u8; 32]);

        for (i, (chain, deregister)) in nodes.iter().enumerate() {
            let before_total = state.registry().count();
            let before_chain = state.registry().count_by_chain(*chain);

            let registration = NodeRegistration {
                name: format!("node-{}", i),
                chain_type: *chain,
                endpoint_url: "https://rpc.example.org".to_string(),
                version: "1.0.0".to_string(),
                region: "eu-central-1".to_string(),
                provider: CloudProvider::OnPremise,
            };
            let id = state.register_node(&owner, registration, i as u64);
            prop_assert!(id.is_ok());
            prop_assert_eq!(state.registry().count(), before_total + 1);
            prop_assert_eq!(state.registry().count_by_chain(*chain), before_chain + 1);

            if *deregister {
                let id = id.map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(state.deregister_node(&owner, &id), Ok(()));
                prop_assert_eq!(state.deregister_node(&owner, &id), Err(CoreError::AlreadyInactive));
                prop_assert_eq!(state.registry().count_by_chain(*chain), before_chain);
            }
        }

        let active = nodes.iter().filter(|(_, deregister)| !deregister).count() as u64;
        prop_assert_eq!(state.registry().active_count(), active);
        prop_assert_eq!(state.registry().count(), nodes.len() as u64);
    }
}
