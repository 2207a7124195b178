//! Decision Rules
//!
//! Score-based automatic decision for an application, evaluated in strict
//! priority order. Pure: never mutates anything, the caller applies the
//! resulting action to the aggregate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Automatic outcome computed from the bureau result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionAction {
    Approve,
    Reject,
    ManualReview,
}

/// Decision plus the reason recorded in the status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: DecisionAction,
    pub reason: String,
}

impl Decision {
    fn new(action: DecisionAction, reason: &str) -> Self {
        Self {
            action,
            reason: reason.to_string(),
        }
    }
}

/// Apply the automatic decision rules, first match wins:
///
/// 1. score < 500: reject
/// 2. 500 <= score < 600 and debt ratio > 50%: manual review
/// 3. score > 750 and debt ratio < 30%: approve
/// 4. score > 600 and debt ratio < 50%: manual review (pre-approved)
/// 5. otherwise: manual review
///
/// A zero income is treated as a 100% debt ratio, which falls through to
/// the default rule.
pub fn decide(
    score: i32,
    current_debt: Decimal,
    monthly_income: Decimal,
    _requested_limit: Decimal,
) -> Decision {
    let debt_pct = if monthly_income.is_zero() {
        Decimal::ONE_HUNDRED
    } else {
        current_debt / monthly_income * Decimal::ONE_HUNDRED
    };

    let fifty = Decimal::from(50u32);

    if score < 500 {
        return Decision::new(DecisionAction::Reject, "insufficient credit score (< 500)");
    }

    if (500..600).contains(&score) && debt_pct > fifty {
        return Decision::new(
            DecisionAction::ManualReview,
            "medium score with high debt level (> 50%)",
        );
    }

    if score > 750 && debt_pct < Decimal::from(30u32) {
        return Decision::new(
            DecisionAction::Approve,
            "excellent score with low debt level (< 30%)",
        );
    }

    if score > 600 && debt_pct < fifty {
        return Decision::new(
            DecisionAction::ManualReview,
            "pre-approved, requires document review",
        );
    }

    Decision::new(
        DecisionAction::ManualReview,
        "requires detailed analysis by the credit area",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_low_score_rejects_regardless_of_debt() {
        let decision = decide(400, dec!(0), dec!(10_000_000), dec!(5_000_000));
        assert_eq!(decision.action, DecisionAction::Reject);

        let decision = decide(499, dec!(100_000_000), dec!(1), dec!(5_000_000));
        assert_eq!(decision.action, DecisionAction::Reject);
    }

    #[test]
    fn test_medium_score_high_debt_goes_to_review() {
        // ratio 60%
        let decision = decide(550, dec!(3_000_000), dec!(5_000_000), dec!(5_000_000));
        assert_eq!(decision.action, DecisionAction::ManualReview);
        assert!(decision.reason.contains("high debt"));
    }

    #[test]
    fn test_excellent_score_low_debt_approves() {
        // ratio 20%
        let decision = decide(800, dec!(1_000_000), dec!(5_000_000), dec!(5_000_000));
        assert_eq!(decision.action, DecisionAction::Approve);
    }

    #[test]
    fn test_pre_approved_band_goes_to_review() {
        // score in (600, 750], ratio 40%
        let decision = decide(650, dec!(2_000_000), dec!(5_000_000), dec!(5_000_000));
        assert_eq!(decision.action, DecisionAction::ManualReview);
        assert!(decision.reason.contains("pre-approved"));
    }

    #[test]
    fn test_priority_order_first_match_wins() {
        // Score 780 but ratio 45%: rule 3 misses (debt not < 30%),
        // rule 4 catches it.
        let decision = decide(780, dec!(4_500_000), dec!(10_000_000), dec!(5_000_000));
        assert_eq!(decision.action, DecisionAction::ManualReview);
        assert!(decision.reason.contains("pre-approved"));
    }

    #[test]
    fn test_default_rule_catches_the_rest() {
        // score 600, ratio 40%: rules 1-4 all miss
        let decision = decide(600, dec!(2_000_000), dec!(5_000_000), dec!(5_000_000));
        assert_eq!(decision.action, DecisionAction::ManualReview);
        assert!(decision.reason.contains("detailed analysis"));
    }

    #[test]
    fn test_zero_income_falls_to_default_review() {
        let decision = decide(800, dec!(1_000_000), dec!(0), dec!(5_000_000));
        assert_eq!(decision.action, DecisionAction::ManualReview);
        assert!(decision.reason.contains("detailed analysis"));
    }

    #[test]
    fn test_boundary_score_500_is_not_rejected() {
        let decision = decide(500, dec!(0), dec!(5_000_000), dec!(5_000_000));
        assert_ne!(decision.action, DecisionAction::Reject);
    }
}
