//! Checked arithmetic for fee and exchange-rate computations.
//!
//! All money math goes through this module: u128 multiply-before-divide,
//! explicit overflow errors, floor rounding everywhere a user receives value.
//! Oracle prices carry a signed power-of-ten exponent; the helpers here fold
//! that exponent into integer numerator/denominator factors so two assets can
//! be compared in a common unit without fractions.

use crate::error::{Error, Result};
use crate::utils::constants::{BPS_DIVISOR, MAX_PRICE_EXPONENT_MAGNITUDE};

// ═══════════════════════════════════════════════════════════════════════════════
// SAFE ARITHMETIC OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Safe addition with overflow check
pub fn safe_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(Error::Overflow {
        operation: format!("{} + {}", a, b),
    })
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> Result<u64> {
    a.checked_sub(b).ok_or(Error::Overflow {
        operation: format!("{} - {}", a, b),
    })
}

/// Safe multiplication then division with u128 intermediate, floor rounding
pub fn safe_mul_div(a: u64, b: u64, c: u64) -> Result<u64> {
    if c == 0 {
        return Err(Error::InvalidParameter {
            name: "divisor".into(),
            reason: "division by zero".into(),
        });
    }
    let result = (a as u128) * (b as u128) / (c as u128);
    if result > u64::MAX as u128 {
        return Err(Error::Overflow {
            operation: format!("({} * {}) / {}", a, b, c),
        });
    }
    Ok(result as u64)
}

// ═══════════════════════════════════════════════════════════════════════════════
// FEE CALCULATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fee charged on `amount` at `fee_bps` basis points, floored.
/// The floor guarantees `fee <= amount` for any `fee_bps < 10_000`.
pub fn fee_amount(amount: u64, fee_bps: u64) -> Result<u64> {
    safe_mul_div(amount, fee_bps, BPS_DIVISOR)
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPONENT-AWARE PRICE CONVERSION
// ═══════════════════════════════════════════════════════════════════════════════

/// 10^exp as u128; `exp` must be within the sanity cap
fn pow10(exp: u32) -> Result<u128> {
    if exp > MAX_PRICE_EXPONENT_MAGNITUDE as u32 {
        return Err(Error::InvalidParameter {
            name: "exponent".into(),
            reason: format!("magnitude {} exceeds cap", exp),
        });
    }
    10u128.checked_pow(exp).ok_or(Error::Overflow {
        operation: format!("10^{}", exp),
    })
}

/// Convert `amount` minor units priced at `num_price * 10^num_exp` into minor
/// units of an asset priced at `den_price * 10^den_exp`, floored.
///
/// The two exponents are folded into one integer factor on whichever side of
/// the ratio keeps all intermediates integral:
///
/// ```text
/// result = amount * num_price * 10^num_exp / (den_price * 10^den_exp)
///        = amount * num_price * 10^(num_exp - den_exp) / den_price
/// ```
pub fn convert_amount(
    amount: u64,
    num_price: u64,
    num_exp: i32,
    den_price: u64,
    den_exp: i32,
) -> Result<u64> {
    if den_price == 0 {
        return Err(Error::InvalidParameter {
            name: "price".into(),
            reason: "denominator price is zero".into(),
        });
    }

    let shift = num_exp - den_exp;
    let (num_scale, den_scale) = if shift >= 0 {
        (pow10(shift as u32)?, 1u128)
    } else {
        (1u128, pow10(shift.unsigned_abs())?)
    };

    let numerator = (amount as u128)
        .checked_mul(num_price as u128)
        .and_then(|v| v.checked_mul(num_scale))
        .ok_or(Error::Overflow {
            operation: "convert_amount numerator".into(),
        })?;
    let denominator = (den_price as u128)
        .checked_mul(den_scale)
        .ok_or(Error::Overflow {
            operation: "convert_amount denominator".into(),
        })?;

    let result = numerator / denominator;
    if result > u64::MAX as u128 {
        return Err(Error::Overflow {
            operation: "convert_amount result".into(),
        });
    }
    Ok(result as u64)
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERALIZATION CALCULATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Reserve-value and outstanding-value sides of the collateralization
/// comparison, brought to a common power-of-ten scale.
///
/// Returns `(reserve_side, debt_side)` such that the floor holds iff
/// `reserve_side * 10_000 >= debt_side * min_collateral_bps`.
pub fn collateral_sides(
    reserve_units: u64,
    reserve_price: u64,
    reserve_exp: i32,
    outstanding: u128,
    synthetic_price: u64,
    synthetic_exp: i32,
) -> Result<(u128, u128)> {
    let shift = reserve_exp - synthetic_exp;
    let (reserve_scale, debt_scale) = if shift >= 0 {
        (pow10(shift as u32)?, 1u128)
    } else {
        (1u128, pow10(shift.unsigned_abs())?)
    };

    let reserve_side = (reserve_units as u128)
        .checked_mul(reserve_price as u128)
        .and_then(|v| v.checked_mul(reserve_scale))
        .ok_or(Error::Overflow {
            operation: "collateral reserve side".into(),
        })?;
    let debt_side = outstanding
        .checked_mul(synthetic_price as u128)
        .and_then(|v| v.checked_mul(debt_scale))
        .ok_or(Error::Overflow {
            operation: "collateral debt side".into(),
        })?;

    Ok((reserve_side, debt_side))
}

/// Collateralization ratio in basis points, or `None` when there is no
/// outstanding synthetic value (infinite ratio). Saturates at `u64::MAX`.
pub fn collateralization_bps(
    reserve_units: u64,
    reserve_price: u64,
    reserve_exp: i32,
    outstanding: u128,
    synthetic_price: u64,
    synthetic_exp: i32,
) -> Result<Option<u64>> {
    let (reserve_side, debt_side) = collateral_sides(
        reserve_units,
        reserve_price,
        reserve_exp,
        outstanding,
        synthetic_price,
        synthetic_exp,
    )?;

    if debt_side == 0 {
        return Ok(None);
    }

    let ratio = reserve_side
        .checked_mul(BPS_DIVISOR as u128)
        .ok_or(Error::Overflow {
            operation: "collateralization ratio".into(),
        })?
        / debt_side;

    Ok(Some(ratio.min(u64::MAX as u128) as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_arithmetic() {
        assert_eq!(safe_add(1, 2).unwrap(), 3);
        assert!(safe_add(u64::MAX, 1).is_err());

        assert_eq!(safe_sub(5, 3).unwrap(), 2);
        assert!(safe_sub(3, 5).is_err());

        assert!(safe_mul_div(u64::MAX, u64::MAX, 1).is_err());
        assert!(safe_mul_div(1, 1, 0).is_err());
    }

    #[test]
    fn test_fee_amount() {
        // 5% of 100_000_000
        assert_eq!(fee_amount(100_000_000, 500).unwrap(), 5_000_000);
        // floor rounding: 0.5% of 199 = 0.995 -> 0
        assert_eq!(fee_amount(199, 50).unwrap(), 0);
        assert_eq!(fee_amount(0, 9999).unwrap(), 0);
    }

    #[test]
    fn test_fee_never_exceeds_amount() {
        for amount in [1u64, 999, 100_000_000, u64::MAX] {
            for bps in [0u64, 1, 500, 9_999] {
                let fee = fee_amount(amount, bps).unwrap();
                assert!(fee <= amount, "fee {} > amount {}", fee, amount);
            }
        }
    }

    #[test]
    fn test_convert_amount_equal_prices() {
        // Same price and exponent: identity
        let out = convert_amount(95_000_000, 100, -2, 100, -2).unwrap();
        assert_eq!(out, 95_000_000);
    }

    #[test]
    fn test_convert_amount_exponent_difference() {
        // 1.00 (100 * 10^-2) over 1.000 (1000 * 10^-3): still 1:1
        let out = convert_amount(1_000, 100, -2, 1_000, -3).unwrap();
        assert_eq!(out, 1_000);

        // Reserve at 2.0, synthetic at 0.5: 4x output
        let out = convert_amount(1_000, 200, -2, 50, -2).unwrap();
        assert_eq!(out, 4_000);
    }

    #[test]
    fn test_convert_amount_floors() {
        // 10 units at price 1 over price 3: 3.33.. -> 3
        let out = convert_amount(10, 1, 0, 3, 0).unwrap();
        assert_eq!(out, 3);
    }

    #[test]
    fn test_convert_amount_rejects_wild_exponent() {
        assert!(convert_amount(1, 1, 60, 1, 0).is_err());
        assert!(convert_amount(1, 1, 0, 1, 60).is_err());
    }

    #[test]
    fn test_collateralization_bps() {
        // 200 reserve units at 1.0 backing 100 synthetic at 1.0 = 200%
        let ratio = collateralization_bps(200, 100, -2, 100, 100, -2)
            .unwrap()
            .unwrap();
        assert_eq!(ratio, 20_000);

        // No outstanding: infinite
        assert!(collateralization_bps(200, 100, -2, 0, 100, -2)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_collateral_sides_comparison() {
        // 150 reserve at 1.0 vs 100 outstanding at 1.0 with 150% floor: exactly at floor
        let (reserve_side, debt_side) =
            collateral_sides(150, 100, -2, 100, 100, -2).unwrap();
        assert!(reserve_side * 10_000 >= debt_side * 15_000);
        assert!(reserve_side * 10_000 < debt_side * 15_001);
    }
}
