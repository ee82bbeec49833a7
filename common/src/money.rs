//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a new [`Money`] amount in Brazilian reais.
    #[must_use]
    pub const fn brl(amount: Decimal) -> Self {
        Self {
            amount,
            currency: Currency::Brl,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        write!(f, "{}{currency}", amount.normalize())
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 || !s.is_char_boundary(s.len() - 3) {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        if amount.is_sign_negative() {
            return Err("negative amount");
        }
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Brazilian Real."]
        #[str = "BRL"]
        Brl = 1,
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money in `{major}.{minor}{currency}` format, where:
    /// - `major` is an integer;
    /// - `minor` is an optional integer;
    /// - `currency` is a three-letter currency code (only `BRL` for now).
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn parses_reais() {
        assert_eq!(
            Money::from_str("85BRL").unwrap(),
            Money::brl(decimal("85")),
        );
        assert_eq!(
            Money::from_str("49.90BRL").unwrap(),
            Money {
                amount: decimal("49.90"),
                currency: Currency::Brl,
            },
        );

        assert!(Money::from_str("85").is_err());
        assert!(Money::from_str("85USD").is_err());
        assert!(Money::from_str("-85BRL").is_err());
        assert!(Money::from_str("BRL").is_err());
    }

    #[test]
    fn drops_trailing_zeros_when_formatting() {
        assert_eq!(Money::brl(decimal("85.00")).to_string(), "85BRL");
        assert_eq!(Money::brl(decimal("49.9")).to_string(), "49.9BRL");
        assert_eq!(Money::brl(decimal("380")).to_string(), "380BRL");
    }
}
