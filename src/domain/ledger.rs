//! Ledger splitter: divides a gross payment into platform fee and business
//! net amounts.

use bigdecimal::rounding::RoundingMode;
use bigdecimal::BigDecimal;

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSplit {
    pub fee: BigDecimal,
    pub net: BigDecimal,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("commission rate must satisfy 0 <= rate < 1, got {0}")]
    InvalidRate(BigDecimal),
    #[error("gross amount must be non-negative, got {0}")]
    NegativeGross(BigDecimal),
}

/// Pure split: `fee = round(gross * rate, 2)`, `net = gross - fee`.
///
/// Invariant: `fee + net == gross` for every accepted input. A rate at or
/// above 1 is a configuration error and is rejected loudly instead of
/// producing zero or negative earnings.
pub fn split(gross: &BigDecimal, commission_rate: &BigDecimal) -> Result<LedgerSplit, LedgerError> {
    let zero = BigDecimal::from(0);
    let one = BigDecimal::from(1);

    if commission_rate < &zero || commission_rate >= &one {
        return Err(LedgerError::InvalidRate(commission_rate.clone()));
    }
    if gross < &zero {
        return Err(LedgerError::NegativeGross(gross.clone()));
    }

    let fee = (gross * commission_rate).with_scale_round(2, RoundingMode::HalfUp);
    let net = gross - &fee;

    Ok(LedgerSplit { fee, net })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn splits_five_percent() {
        let result = split(&dec("5000.00"), &dec("0.05")).unwrap();
        assert_eq!(result.fee, dec("250.00"));
        assert_eq!(result.net, dec("4750.00"));
    }

    #[test]
    fn rounds_fee_half_up() {
        // 33.33 * 0.05 = 1.6665 -> 1.67
        let result = split(&dec("33.33"), &dec("0.05")).unwrap();
        assert_eq!(result.fee, dec("1.67"));
        assert_eq!(result.net, dec("31.66"));
    }

    #[test]
    fn zero_gross_splits_to_zero() {
        let result = split(&dec("0.00"), &dec("0.05")).unwrap();
        assert_eq!(result.fee, dec("0.00"));
        assert_eq!(result.net, dec("0.00"));
    }

    #[test]
    fn zero_rate_gives_full_net() {
        let result = split(&dec("100.00"), &dec("0")).unwrap();
        assert_eq!(result.fee, dec("0.00"));
        assert_eq!(result.net, dec("100.00"));
    }

    #[test]
    fn rejects_rate_of_one_or_more() {
        assert!(matches!(
            split(&dec("100.00"), &dec("1")),
            Err(LedgerError::InvalidRate(_))
        ));
        assert!(matches!(
            split(&dec("100.00"), &dec("1.5")),
            Err(LedgerError::InvalidRate(_))
        ));
    }

    #[test]
    fn rejects_negative_inputs() {
        assert!(matches!(
            split(&dec("100.00"), &dec("-0.05")),
            Err(LedgerError::InvalidRate(_))
        ));
        assert!(matches!(
            split(&dec("-1.00"), &dec("0.05")),
            Err(LedgerError::NegativeGross(_))
        ));
    }

    proptest! {
        // Conservation: fee + net == gross for all gross >= 0 and 0 <= rate < 1.
        #[test]
        fn conservation(minor in 0i64..1_000_000_000, rate_pct in 0i64..100) {
            let gross = BigDecimal::new(minor.into(), 2);
            let rate = BigDecimal::new(rate_pct.into(), 2);
            let result = split(&gross, &rate).unwrap();
            prop_assert_eq!(&result.fee + &result.net, gross.clone());
            prop_assert!(result.fee >= BigDecimal::from(0));
            prop_assert!(result.net >= BigDecimal::from(0));
            prop_assert_eq!(result.fee, (&gross * &rate).with_scale_round(2, RoundingMode::HalfUp));
        }
    }
}
