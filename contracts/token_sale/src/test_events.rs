extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, Ledger},
    token::{Client as TokenClient, StellarAssetClient},
    vec, Address, Env, IntoVal, TryIntoVal,
};

use crate::events::{CapReached, FundTransfer, GoalReached};
use crate::{TokenSale, TokenSaleClient};

const GOAL: i128 = 10_000;
const CAP: i128 = 20_000;
const MIN_CONTRIBUTION: i128 = 100;
const RATE: u32 = 5_000;
const START: u64 = 100_000;
const DURATION_MINUTES: u64 = 60;

struct Setup<'a> {
    env: Env,
    client: TokenSaleClient<'a>,
    owner: Address,
    beneficiary: Address,
    funding_admin: StellarAssetClient<'a>,
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);

    let contract_id = env.register(TokenSale, ());
    let client = TokenSaleClient::new(&env, &contract_id);

    let owner = Address::generate(&env);
    let beneficiary = Address::generate(&env);
    let supplier = Address::generate(&env);
    let token_admin = Address::generate(&env);

    let funding = env.register_stellar_asset_contract_v2(token_admin.clone());
    let reward = env.register_stellar_asset_contract_v2(token_admin.clone());
    let funding_admin = StellarAssetClient::new(&env, &funding.address());
    let reward_admin = StellarAssetClient::new(&env, &reward.address());

    reward_admin.mint(&supplier, &1_000_000_000_000);
    TokenClient::new(&env, &reward.address()).approve(
        &supplier,
        &contract_id,
        &1_000_000_000_000,
        &100_000,
    );

    client.init(
        &owner,
        &beneficiary,
        &funding.address(),
        &reward.address(),
        &supplier,
        &GOAL,
        &CAP,
        &MIN_CONTRIBUTION,
        &START,
        &DURATION_MINUTES,
        &RATE,
    );

    Setup {
        env,
        client,
        owner,
        beneficiary,
        funding_admin,
    }
}

fn contributor_with(s: &Setup, amount: i128) -> Address {
    let contributor = Address::generate(&s.env);
    s.funding_admin.mint(&contributor, &amount);
    contributor
}

#[test]
fn test_contribution_emits_fund_transfer() {
    let s = setup();
    let contributor = contributor_with(&s, 2_000);

    s.client.contribute(&contributor, &2_000);

    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: ("transfer", contributor)
    assert_eq!(last_event.0, s.client.address);
    let expected_topics = vec![
        &s.env,
        symbol_short!("transfer").into_val(&s.env),
        contributor.into_val(&s.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: FundTransfer = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        FundTransfer {
            account: contributor.clone(),
            amount: 2_000,
            is_contribution: true,
        }
    );
}

#[test]
fn test_goal_crossing_emits_goal_reached() {
    let s = setup();
    let contributor = contributor_with(&s, GOAL);

    s.client.contribute(&contributor, &GOAL);

    // The goal check runs after the transfer notification, so the goal
    // event is the last of the invocation.
    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, s.client.address);
    let expected_topics = vec![&s.env, symbol_short!("goal_hit").into_val(&s.env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: GoalReached = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        GoalReached {
            beneficiary: s.beneficiary.clone(),
            amount_raised: GOAL,
        }
    );
}

#[test]
fn test_goal_event_not_repeated() {
    let s = setup();
    let a = contributor_with(&s, GOAL);
    let b = contributor_with(&s, 1_000);

    s.client.contribute(&a, &GOAL);

    // With the latch already set, a further contribution ends on its own
    // transfer notification; no second goal event follows it.
    s.client.contribute(&b, &1_000);

    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");
    let expected_topics = vec![
        &s.env,
        symbol_short!("transfer").into_val(&s.env),
        b.into_val(&s.env),
    ];
    assert_eq!(last_event.1, expected_topics);
}

#[test]
fn test_cap_crossing_emits_cap_reached() {
    let s = setup();
    let a = contributor_with(&s, GOAL);
    let b = contributor_with(&s, CAP - GOAL);

    s.client.contribute(&a, &GOAL);
    s.client.contribute(&b, &(CAP - GOAL));

    // Goal latched in the first call, so the second call's tail event is
    // the cap notification alone.
    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    let expected_topics = vec![&s.env, symbol_short!("cap_hit").into_val(&s.env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: CapReached = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        CapReached {
            beneficiary: s.beneficiary.clone(),
            amount_raised: CAP,
        }
    );
}

#[test]
fn test_refund_emits_fund_transfer() {
    let s = setup();
    let contributor = contributor_with(&s, 2_000);
    s.client.contribute(&contributor, &2_000);

    s.env.ledger().set_timestamp(START + DURATION_MINUTES * 60);
    s.client.safe_withdrawal(&contributor);

    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    let expected_topics = vec![
        &s.env,
        symbol_short!("transfer").into_val(&s.env),
        contributor.into_val(&s.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: FundTransfer = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        FundTransfer {
            account: contributor.clone(),
            amount: 2_000,
            is_contribution: false,
        }
    );
}

#[test]
fn test_pause_events() {
    let s = setup();

    s.client.pause(&s.owner);
    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");
    let expected_topics = vec![&s.env, symbol_short!("paused").into_val(&s.env)];
    assert_eq!(last_event.1, expected_topics);

    s.client.unpause(&s.owner);
    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");
    let expected_topics = vec![&s.env, symbol_short!("unpaused").into_val(&s.env)];
    assert_eq!(last_event.1, expected_topics);

    let unpaused_by: Address = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(unpaused_by, s.owner);
}
