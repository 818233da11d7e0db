#![allow(dead_code)]

extern crate std;

use crate::types::Sale;

/// INV-1: Conservation of funds. Everything ever recorded as raised is
/// either still standing in a ledger balance (contributors plus the sale's
/// own allocation entry) or has been paid out as a refund.
pub fn assert_conservation(sale: &Sale, ledger_balance_sum: i128) {
    assert_eq!(
        sale.amount_raised,
        ledger_balance_sum + sale.refund_amount,
        "INV-1 violated: amount_raised {} != balances {} + refunds {}",
        sale.amount_raised,
        ledger_balance_sum,
        sale.refund_amount
    );
}

/// INV-2: `amount_raised` never decreases.
pub fn assert_raise_monotonic(raised_before: i128, raised_after: i128) {
    assert!(
        raised_after >= raised_before,
        "INV-2 violated: amount_raised decreased from {} to {}",
        raised_before,
        raised_after
    );
}

/// INV-3: `refund_amount` never decreases.
pub fn assert_refund_monotonic(refunded_before: i128, refunded_after: i128) {
    assert!(
        refunded_after >= refunded_before,
        "INV-3 violated: refund_amount decreased from {} to {}",
        refunded_before,
        refunded_after
    );
}

/// INV-4: Contribution invariant — after a contribution of `amount`, the
/// contributor's ledger balance increases by exactly `amount`.
pub fn assert_contribution_invariant(balance_before: i128, balance_after: i128, amount: i128) {
    assert_eq!(
        balance_after,
        balance_before + amount,
        "INV-4 violated: contribution invariant broken: {} + {} != {}",
        balance_before,
        amount,
        balance_after
    );
}

/// INV-5: Crossing the cap closes the sale.
pub fn assert_cap_closes_sale(sale: &Sale) {
    if sale.cap_reached {
        assert!(
            sale.sale_closed,
            "INV-5 violated: cap_reached without sale_closed"
        );
    }
}

/// INV-6: Latch monotonicity along the contribution path. Flags only move
/// `false → true`; clearing `goal_reached` is reserved to the explicit
/// owner unlock and must never be observed across contributions.
pub fn assert_latches_monotonic(before: &Sale, after: &Sale) {
    assert!(
        !(before.goal_reached && !after.goal_reached),
        "INV-6 violated: goal_reached latch cleared"
    );
    assert!(
        !(before.cap_reached && !after.cap_reached),
        "INV-6 violated: cap_reached latch cleared"
    );
    assert!(
        !(before.sale_closed && !after.sale_closed),
        "INV-6 violated: sale_closed latch cleared"
    );
}

/// INV-7: Refunds never exceed what was raised.
pub fn assert_refund_bounded(sale: &Sale) {
    assert!(
        sale.refund_amount <= sale.amount_raised,
        "INV-7 violated: refund_amount {} exceeds amount_raised {}",
        sale.refund_amount,
        sale.amount_raised
    );
}

/// Run all stateless sale invariants.
pub fn assert_all_sale_invariants(sale: &Sale) {
    assert_cap_closes_sale(sale);
    assert_refund_bounded(sale);
    assert!(
        sale.funding_goal <= sale.funding_cap,
        "construction invariant violated: goal {} > cap {}",
        sale.funding_goal,
        sale.funding_cap
    );
    assert!(
        sale.end_time > sale.start_time,
        "construction invariant violated: end_time {} <= start_time {}",
        sale.end_time,
        sale.start_time
    );
}
