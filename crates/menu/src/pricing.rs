//! Pricing rule: a pizza costs the sum of its ingredient costs times a margin.

use core::str::FromStr;

use rust_decimal::Decimal;

use pizzeria_core::{DomainError, DomainResult, ValueObject};

use crate::ingredient::Ingredient;

/// Multiplier applied to the ingredient cost sum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Margin(Decimal);

impl ValueObject for Margin {}

impl Margin {
    /// 1.2, the house margin.
    pub const DEFAULT: Margin = Margin(Decimal::from_parts(12, 0, 0, false, 1));

    /// Build a margin; the factor must be strictly positive.
    pub fn new(factor: Decimal) -> DomainResult<Self> {
        if factor <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "margin must be positive (got {factor})"
            )));
        }
        Ok(Self(factor))
    }

    pub fn factor(&self) -> Decimal {
        self.0
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl core::fmt::Display for Margin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Margin {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let factor = Decimal::from_str(s.trim())
            .map_err(|e| DomainError::validation(format!("margin: {e}")))?;
        Self::new(factor)
    }
}

/// Sum of ingredient costs multiplied by `margin`. No rounding is applied.
///
/// A total or product outside the `Decimal` range is a validation error.
pub fn price_of<'a>(
    ingredients: impl IntoIterator<Item = &'a Ingredient>,
    margin: Margin,
) -> DomainResult<Decimal> {
    let total = ingredients
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, i| acc.checked_add(i.cost()))
        .ok_or_else(|| DomainError::validation("ingredient costs add up beyond the supported range"))?;
    total
        .checked_mul(margin.factor())
        .ok_or_else(|| DomainError::validation("price exceeds the supported range"))
}
