use super::domain::{Fees, Jurisdiction};

/// Plan-check percentage applied to the base permit fee. Contractual:
/// downstream fee displays depend on these amounts bit-for-bit.
const PLAN_CHECK_NUMERATOR: u64 = 65;
const PLAN_CHECK_DENOMINATOR: u64 = 100;

/// Quote the fee breakdown for a permit type in a jurisdiction.
///
/// Unknown permit types quote at zero rather than erroring; the plan-check
/// fee is floor(permit_fee * 0.65), computed in integer dollars so the
/// contractual rounding is exact.
pub fn quote(jurisdiction: &Jurisdiction, permit_type: &str) -> Fees {
    let permit_fee = jurisdiction
        .requirements
        .fees
        .get(permit_type)
        .copied()
        .unwrap_or(0);
    let plan_check_fee = permit_fee * PLAN_CHECK_NUMERATOR / PLAN_CHECK_DENOMINATOR;

    Fees {
        permit_fee,
        plan_check_fee,
        school_fee: None,
        impact_fee: None,
        total: permit_fee + plan_check_fee,
        paid: false,
        paid_at: None,
    }
}
