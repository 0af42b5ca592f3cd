//! Static subscription plan catalog.
//!
//! Entitlement limits and commission rates live in one table loaded once,
//! so backend enforcement cannot drift from what each plan advertises.

use bigdecimal::BigDecimal;
use chrono::Duration;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::str::FromStr;

/// Length of one billing cycle; `current_period_end` is set this far ahead
/// on activation.
pub const BILLING_CYCLE_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct PlanLimits {
    pub staff_limit: i32,
    pub bookings_limit: i32,
    pub commission_rate: BigDecimal,
}

static PLAN_CATALOG: Lazy<HashMap<&'static str, PlanLimits>> = Lazy::new(|| {
    let mut catalog = HashMap::new();
    catalog.insert(
        "solo",
        PlanLimits {
            staff_limit: 1,
            bookings_limit: 50,
            commission_rate: rate("0.05"),
        },
    );
    catalog.insert(
        "business",
        PlanLimits {
            staff_limit: 10,
            bookings_limit: 500,
            commission_rate: rate("0.04"),
        },
    );
    catalog.insert(
        "enterprise",
        PlanLimits {
            staff_limit: 50,
            bookings_limit: 5000,
            commission_rate: rate("0.03"),
        },
    );
    catalog
});

fn rate(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).expect("catalog rates are literal decimals")
}

pub fn limits_for_plan(plan_id: &str) -> Option<&'static PlanLimits> {
    PLAN_CATALOG.get(plan_id)
}

pub fn billing_cycle() -> Duration {
    Duration::days(BILLING_CYCLE_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_plan_limits() {
        let limits = limits_for_plan("business").unwrap();
        assert_eq!(limits.staff_limit, 10);
        assert_eq!(limits.bookings_limit, 500);
    }

    #[test]
    fn unknown_plan_is_absent() {
        assert!(limits_for_plan("platinum").is_none());
        assert!(limits_for_plan("").is_none());
    }

    #[test]
    fn all_catalog_rates_are_valid_commissions() {
        let one = BigDecimal::from(1);
        let zero = BigDecimal::from(0);
        for (plan, limits) in PLAN_CATALOG.iter() {
            assert!(
                limits.commission_rate >= zero && limits.commission_rate < one,
                "plan {} carries an invalid commission rate",
                plan
            );
            assert!(limits.staff_limit > 0);
            assert!(limits.bookings_limit > 0);
        }
    }
}
