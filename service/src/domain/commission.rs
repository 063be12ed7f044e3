//! [`Commission`] split computation.

use common::{Money, Percent};
use derive_more::{Display, Error};
use rust_decimal::{Decimal, RoundingStrategy};

#[cfg(doc)]
use crate::domain::{Incorporation, Sale};

/// Split of a [`Sale`]'s commission among broker, brokerage company and
/// referral partner.
///
/// Invariant: the three shares always sum exactly to [`value`].
///
/// [`value`]: Commission::value
#[derive(Clone, Copy, Debug)]
pub struct Commission {
    /// [`Incorporation`]-level commission percentage the split was computed
    /// from.
    pub percent: Percent,

    /// Total commission value.
    pub value: Money,

    /// Share of the broker who closed the sale.
    pub broker_value: Money,

    /// Share of the brokerage company.
    pub company_value: Money,

    /// Share of the referral partner.
    pub partner_value: Money,
}

impl Commission {
    /// Computes the [`Commission`] of a sale.
    ///
    /// All monetary values are rounded to the cent. The broker and company
    /// shares are rounded down, and the partner share absorbs the rounding
    /// remainder: the three shares sum exactly to the total and none of
    /// them is negative.
    ///
    /// # Errors
    ///
    /// [`SplitError::NonPositiveValue`] when the sale value is not positive.
    pub fn split(
        sale_value: Money,
        percent: Percent,
        policy: &SplitPolicy,
    ) -> Result<Self, SplitError> {
        if !sale_value.is_positive() {
            return Err(SplitError::NonPositiveValue);
        }

        let value = percent.of(sale_value.amount).round_dp(2);
        let broker = policy
            .broker
            .of(value)
            .round_dp_with_strategy(2, RoundingStrategy::ToZero);
        let company = policy
            .company
            .of(value)
            .round_dp_with_strategy(2, RoundingStrategy::ToZero);
        let partner = value - broker - company;

        Ok(Self {
            percent,
            value: sale_value.with_amount(value),
            broker_value: sale_value.with_amount(broker),
            company_value: sale_value.with_amount(company),
            partner_value: sale_value.with_amount(partner),
        })
    }
}

/// Error of computing a [`Commission`] split.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum SplitError {
    /// Sale value is zero or negative.
    #[display("sale value must be positive")]
    NonPositiveValue,
}

/// Policy dividing a commission among broker, brokerage company and
/// referral partner.
#[derive(Clone, Copy, Debug)]
pub struct SplitPolicy {
    /// Share of the broker.
    pub broker: Percent,

    /// Share of the brokerage company.
    pub company: Percent,

    /// Share of the referral partner.
    pub partner: Percent,
}

impl SplitPolicy {
    /// Creates a new [`SplitPolicy`] if the three shares sum to 100%.
    #[must_use]
    pub fn new(
        broker: Percent,
        company: Percent,
        partner: Percent,
    ) -> Option<Self> {
        (broker.value() + company.value() + partner.value()
            == Decimal::ONE_HUNDRED)
            .then_some(Self {
                broker,
                company,
                partner,
            })
    }
}

impl Default for SplitPolicy {
    /// 50% broker, 30% company, 20% partner.
    fn default() -> Self {
        #[expect(unsafe_code, reason = "values are in range and sum to 100")]
        unsafe {
            Self {
                broker: Percent::new_unchecked(Decimal::from(50)),
                company: Percent::new_unchecked(Decimal::from(30)),
                partner: Percent::new_unchecked(Decimal::from(20)),
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{money::Currency, Money, Percent};
    use rust_decimal::Decimal;

    use super::{Commission, SplitError, SplitPolicy};

    fn brl(s: &str) -> Money {
        Money {
            amount: Decimal::from_str(s).unwrap(),
            currency: Currency::Brl,
        }
    }

    fn percent(s: &str) -> Percent {
        Percent::from_str(s).unwrap()
    }

    #[test]
    fn splits_per_policy() {
        let split = Commission::split(
            brl("500000"),
            percent("5"),
            &SplitPolicy::default(),
        )
        .unwrap();

        assert_eq!(split.value, brl("25000"));
        assert_eq!(split.broker_value, brl("12500"));
        assert_eq!(split.company_value, brl("7500"));
        assert_eq!(split.partner_value, brl("5000"));
    }

    #[test]
    fn shares_always_sum_to_the_total() {
        let policy = SplitPolicy::new(
            percent("33.33"),
            percent("33.33"),
            percent("33.34"),
        )
        .unwrap();

        for value in ["100", "333.33", "0.01", "999999.99", "1234567.89"] {
            let split =
                Commission::split(brl(value), percent("5"), &policy).unwrap();
            assert_eq!(
                split.broker_value.amount
                    + split.company_value.amount
                    + split.partner_value.amount,
                split.value.amount,
                "shares of {value} must sum to the total",
            );
        }
    }

    #[test]
    fn partner_share_never_goes_negative() {
        let policy =
            SplitPolicy::new(percent("50"), percent("50"), percent("0"))
                .unwrap();

        let split =
            Commission::split(brl("0.03"), percent("100"), &policy).unwrap();

        assert_eq!(split.value, brl("0.03"));
        assert_eq!(split.broker_value, brl("0.01"));
        assert_eq!(split.company_value, brl("0.01"));
        assert_eq!(split.partner_value, brl("0.01"));

        for value in ["0.01", "0.05", "1.99", "333.33"] {
            let split =
                Commission::split(brl(value), percent("5"), &policy).unwrap();
            assert!(
                !split.partner_value.amount.is_sign_negative(),
                "partner share of {value} must not be negative",
            );
        }
    }

    #[test]
    fn commission_never_exceeds_sale_value() {
        let split = Commission::split(
            brl("100"),
            percent("100"),
            &SplitPolicy::default(),
        )
        .unwrap();

        assert_eq!(split.value, brl("100"));
    }

    #[test]
    fn rejects_non_positive_sale_value() {
        let policy = SplitPolicy::default();

        assert!(matches!(
            Commission::split(brl("0"), percent("5"), &policy),
            Err(SplitError::NonPositiveValue),
        ));
        assert!(matches!(
            Commission::split(brl("-1"), percent("5"), &policy),
            Err(SplitError::NonPositiveValue),
        ));
    }

    #[test]
    fn policy_shares_must_sum_to_one_hundred() {
        assert!(
            SplitPolicy::new(percent("50"), percent("30"), percent("10"))
                .is_none()
        );
        assert!(
            SplitPolicy::new(percent("50"), percent("30"), percent("20"))
                .is_some()
        );
    }
}
