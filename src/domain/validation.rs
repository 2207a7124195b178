//! Validation Rules
//!
//! Pure business-rule checks for a credit card application. No side
//! effects: each rule takes primitive inputs and returns a result that
//! accumulates every violated rule instead of short-circuiting.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::enums::CardTier;

const MIN_AGE: i32 = 18;
const MAX_LIMIT_INCOME_RATIO: u32 = 3;

fn minimum_income() -> Decimal {
    Decimal::from(1_500_000u64)
}

/// Income floor and requestable-limit ceiling per card tier.
/// Black has no limit ceiling.
pub struct TierLimits {
    pub min_income: Decimal,
    pub max_limit: Option<Decimal>,
}

pub fn limits_for(tier: CardTier) -> TierLimits {
    match tier {
        CardTier::Clasica => TierLimits {
            min_income: Decimal::from(1_500_000u64),
            max_limit: Some(Decimal::from(5_000_000u64)),
        },
        CardTier::Oro => TierLimits {
            min_income: Decimal::from(3_000_000u64),
            max_limit: Some(Decimal::from(15_000_000u64)),
        },
        CardTier::Platinum => TierLimits {
            min_income: Decimal::from(8_000_000u64),
            max_limit: Some(Decimal::from(40_000_000u64)),
        },
        CardTier::Black => TierLimits {
            min_income: Decimal::from(15_000_000u64),
            max_limit: None,
        },
    }
}

/// Outcome of a validation run, accumulating all violated rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate all business rules for an application.
///
/// Tier and limit checks only run when the corresponding inputs are
/// present; the result is the union of every violated rule.
pub fn validate_all(
    birth_date: NaiveDate,
    monthly_income: Option<Decimal>,
    card_tier: Option<CardTier>,
    requested_limit: Option<Decimal>,
) -> ValidationResult {
    let mut errors = Vec::new();

    errors.extend(validate_age(birth_date).errors);

    if let Some(income) = monthly_income {
        errors.extend(validate_minimum_income(income).errors);

        if let Some(tier) = card_tier {
            errors.extend(validate_card_tier_income(tier, income).errors);

            if let Some(limit) = requested_limit {
                errors.extend(validate_limit_caps(tier, limit, income).errors);
            }
        }
    }

    ValidationResult::failed(errors)
}

/// Minimum age of 18, computed against today's date
pub fn validate_age(birth_date: NaiveDate) -> ValidationResult {
    if age_in_years(birth_date, Utc::now().date_naive()) < MIN_AGE {
        return ValidationResult::failed(vec![format!(
            "applicant must be at least {MIN_AGE} years old"
        )]);
    }
    ValidationResult::ok()
}

/// Minimum monthly income, inclusive boundary
pub fn validate_minimum_income(monthly_income: Decimal) -> ValidationResult {
    let min = minimum_income();
    if monthly_income < min {
        return ValidationResult::failed(vec![format!("minimum monthly income is ${min}")]);
    }
    ValidationResult::ok()
}

/// Income floor of the requested card tier
pub fn validate_card_tier_income(tier: CardTier, monthly_income: Decimal) -> ValidationResult {
    let limits = limits_for(tier);
    if monthly_income < limits.min_income {
        return ValidationResult::failed(vec![format!(
            "card tier {tier} requires a monthly income of at least ${}",
            limits.min_income
        )]);
    }
    ValidationResult::ok()
}

/// Requested-limit ceilings: the tier cap and the 3x-income ratio.
/// Both violations are reported when both apply.
pub fn validate_limit_caps(
    tier: CardTier,
    requested_limit: Decimal,
    monthly_income: Decimal,
) -> ValidationResult {
    let mut errors = Vec::new();
    let limits = limits_for(tier);

    if let Some(max_limit) = limits.max_limit {
        if requested_limit > max_limit {
            errors.push(format!(
                "maximum requestable limit for card tier {tier} is ${max_limit}"
            ));
        }
    }

    let max_by_income = monthly_income * Decimal::from(MAX_LIMIT_INCOME_RATIO);
    if requested_limit > max_by_income {
        errors.push(format!(
            "requested limit cannot exceed {MAX_LIMIT_INCOME_RATIO} times the monthly income (${max_by_income})"
        ));
    }

    ValidationResult::failed(errors)
}

/// Age in whole years at `today`, with day/month correction: an applicant
/// whose birthday is today has already turned that age.
fn age_in_years(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_age_correction_before_birthday() {
        let birth = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        assert_eq!(age_in_years(birth, NaiveDate::from_ymd_opt(2026, 6, 14).unwrap()), 25);
        assert_eq!(age_in_years(birth, NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()), 26);
        assert_eq!(age_in_years(birth, NaiveDate::from_ymd_opt(2026, 6, 16).unwrap()), 26);
    }

    #[test]
    fn test_eighteenth_birthday_today_is_valid() {
        let today = Utc::now().date_naive();
        let birth = NaiveDate::from_ymd_opt(today.year() - 18, today.month(), today.day())
            .unwrap_or_else(|| today - Duration::days(18 * 366));

        assert!(validate_age(birth).valid);
    }

    #[test]
    fn test_underage_applicant_rejected() {
        let today = Utc::now().date_naive();
        let birth = today - Duration::days(17 * 365);

        let result = validate_age(birth);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_minimum_income_boundary_is_inclusive() {
        assert!(validate_minimum_income(dec!(1_500_000)).valid);
        assert!(!validate_minimum_income(dec!(1_499_999)).valid);
    }

    #[test]
    fn test_tier_income_floors() {
        assert!(validate_card_tier_income(CardTier::Clasica, dec!(1_500_000)).valid);
        assert!(!validate_card_tier_income(CardTier::Oro, dec!(2_999_999)).valid);
        assert!(validate_card_tier_income(CardTier::Platinum, dec!(8_000_000)).valid);
        assert!(!validate_card_tier_income(CardTier::Black, dec!(14_000_000)).valid);
    }

    #[test]
    fn test_limit_ratio_applies_even_under_tier_cap() {
        // 10M is under Oro's 15M cap, but 5x a 2M income
        let result = validate_limit_caps(CardTier::Oro, dec!(10_000_000), dec!(2_000_000));

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("3 times"));
    }

    #[test]
    fn test_limit_caps_accumulate_both_violations() {
        let result = validate_limit_caps(CardTier::Clasica, dec!(20_000_000), dec!(2_000_000));

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_black_tier_has_no_limit_cap() {
        let result = validate_limit_caps(CardTier::Black, dec!(45_000_000), dec!(20_000_000));
        assert!(result.valid);
    }

    #[test]
    fn test_validate_all_accumulates_errors() {
        let today = Utc::now().date_naive();
        let underage_birth = today - Duration::days(17 * 365);

        let result = validate_all(
            underage_birth,
            Some(dec!(1_000_000)),
            Some(CardTier::Clasica),
            Some(dec!(3_000_000)),
        );

        assert!(!result.valid);
        // Underage, income below the 1.5M minimum and below the Clasica
        // floor. The 3M limit equals exactly 3x income, so the ratio
        // rule does not fire.
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn test_validate_all_skips_absent_sections() {
        let birth = NaiveDate::from_ymd_opt(1985, 3, 2).unwrap();

        let result = validate_all(birth, None, Some(CardTier::Black), Some(dec!(50_000_000)));

        // Without an income, tier and limit checks cannot run.
        assert!(result.valid);
    }
}
