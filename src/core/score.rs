//! FinCA score: a 0-100 composite of five stepped sub-scores.
//!
//! None of these functions fail. A non-positive denominator (income, expenses)
//! yields 0 for the affected sub-score rather than an error, and an empty goal
//! list scores a neutral 50.

use super::types::{FinancialSnapshot, FincaScore, Goal, GoalStatus, ScoreComponents};

const SAVINGS_WEIGHT: u32 = 30;
const EMERGENCY_WEIGHT: u32 = 25;
const GOAL_WEIGHT: u32 = 20;
const DEBT_WEIGHT: u32 = 15;
const BEHAVIORAL_WEIGHT: u32 = 10;

const NEUTRAL_GOAL_SCORE: u8 = 50;

pub fn compute_score(snapshot: &FinancialSnapshot) -> FincaScore {
    let components = ScoreComponents {
        savings_rate: savings_rate_score(snapshot.monthly_income, snapshot.monthly_savings),
        emergency_fund: emergency_fund_score(snapshot.monthly_expenses, snapshot.emergency_fund),
        goal_progress: goal_progress_score(&snapshot.goals),
        debt_health: debt_health_score(snapshot.monthly_income, snapshot.monthly_emi),
        behavioral: behavioral_score(
            snapshot.days_active,
            snapshot.budgets_logged,
            snapshot.goals_set,
        ),
    };
    FincaScore {
        total: weighted_total(&components),
        components,
    }
}

/// Integer weights keep the result exactly `floor` of the weighted sum.
pub fn weighted_total(components: &ScoreComponents) -> u8 {
    let weighted = SAVINGS_WEIGHT * components.savings_rate as u32
        + EMERGENCY_WEIGHT * components.emergency_fund as u32
        + GOAL_WEIGHT * components.goal_progress as u32
        + DEBT_WEIGHT * components.debt_health as u32
        + BEHAVIORAL_WEIGHT * components.behavioral as u32;
    (weighted / 100).min(100) as u8
}

pub fn savings_rate_score(income: f64, savings: f64) -> u8 {
    if !is_positive(income) {
        return 0;
    }
    let rate = savings / income * 100.0;
    if rate >= 50.0 {
        100
    } else if rate >= 40.0 {
        90
    } else if rate >= 30.0 {
        75
    } else if rate >= 20.0 {
        60
    } else if rate >= 10.0 {
        40
    } else {
        to_score(rate * 2.0)
    }
}

pub fn emergency_fund_score(monthly_expenses: f64, emergency_fund: f64) -> u8 {
    if !is_positive(monthly_expenses) {
        return 0;
    }
    let months = emergency_fund / monthly_expenses;
    if months >= 6.0 {
        100
    } else if months >= 5.0 {
        90
    } else if months >= 4.0 {
        75
    } else if months >= 3.0 {
        60
    } else if months >= 2.0 {
        40
    } else if months >= 1.0 {
        25
    } else {
        to_score(months * 15.0)
    }
}

/// Mean progress over active goals, each capped at 100%.
pub fn goal_progress_score(goals: &[Goal]) -> u8 {
    if goals.is_empty() {
        return NEUTRAL_GOAL_SCORE;
    }

    let (total, count) = goals
        .iter()
        .filter(|goal| goal.status == GoalStatus::Active)
        .fold((0.0, 0u32), |(total, count), goal| {
            (total + goal_progress_pct(goal), count + 1)
        });

    if count == 0 {
        return 0;
    }
    to_score(total / count as f64)
}

pub fn debt_health_score(monthly_income: f64, monthly_emi: f64) -> u8 {
    if !is_positive(monthly_income) {
        return 0;
    }
    if !is_positive(monthly_emi) {
        return 100;
    }
    let ratio = monthly_emi / monthly_income * 100.0;
    if ratio <= 10.0 {
        100
    } else if ratio <= 20.0 {
        90
    } else if ratio <= 30.0 {
        75
    } else if ratio <= 40.0 {
        60
    } else if ratio <= 50.0 {
        40
    } else {
        to_score(40.0 - (ratio - 50.0).trunc())
    }
}

pub fn behavioral_score(days_active: u32, budgets_logged: u32, goals_set: u32) -> u8 {
    let activity = capped_points(days_active, 30, 40);
    let budgeting = capped_points(budgets_logged, 6, 30);
    let goal_setting = capped_points(goals_set, 3, 30);
    (activity + budgeting + goal_setting).min(100) as u8
}

fn goal_progress_pct(goal: &Goal) -> f64 {
    if !is_positive(goal.target_amount) {
        return 0.0;
    }
    let pct = goal.current_amount / goal.target_amount * 100.0;
    if pct.is_nan() { 0.0 } else { pct.min(100.0) }
}

/// `min(count / full, 1) * max_points`, truncated.
fn capped_points(count: u32, full: u32, max_points: u32) -> u32 {
    let count = count.min(full) as u64;
    (count * max_points as u64 / full as u64) as u32
}

fn is_positive(value: f64) -> bool {
    value > 0.0
}

fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn goal(target_amount: f64, current_amount: f64, status: GoalStatus) -> Goal {
        Goal {
            target_amount,
            current_amount,
            status,
        }
    }

    fn strong_snapshot() -> FinancialSnapshot {
        FinancialSnapshot {
            monthly_income: 80_000.0,
            monthly_expenses: 30_000.0,
            monthly_savings: 50_000.0,
            emergency_fund: 180_000.0,
            monthly_emi: 0.0,
            goals: Vec::new(),
            days_active: 30,
            budgets_logged: 6,
            goals_set: 3,
        }
    }

    #[test]
    fn strong_profile_without_goals_scores_ninety() {
        let score = compute_score(&strong_snapshot());
        assert_eq!(
            score.components,
            ScoreComponents {
                savings_rate: 100,
                emergency_fund: 100,
                goal_progress: 50,
                debt_health: 100,
                behavioral: 100,
            }
        );
        assert_eq!(score.total, 90);
    }

    #[test]
    fn savings_rate_steps() {
        assert_eq!(savings_rate_score(100.0, 50.0), 100);
        assert_eq!(savings_rate_score(100.0, 45.0), 90);
        assert_eq!(savings_rate_score(100.0, 30.0), 75);
        assert_eq!(savings_rate_score(100.0, 25.0), 60);
        assert_eq!(savings_rate_score(100.0, 10.0), 40);
        assert_eq!(savings_rate_score(400.0, 25.0), 12);
        assert_eq!(savings_rate_score(100.0, -20.0), 0);
        assert_eq!(savings_rate_score(0.0, 5_000.0), 0);
        assert_eq!(savings_rate_score(-10.0, 5_000.0), 0);
    }

    #[test]
    fn emergency_fund_steps() {
        assert_eq!(emergency_fund_score(10_000.0, 60_000.0), 100);
        assert_eq!(emergency_fund_score(10_000.0, 50_000.0), 90);
        assert_eq!(emergency_fund_score(10_000.0, 40_000.0), 75);
        assert_eq!(emergency_fund_score(10_000.0, 30_000.0), 60);
        assert_eq!(emergency_fund_score(10_000.0, 20_000.0), 40);
        assert_eq!(emergency_fund_score(10_000.0, 10_000.0), 25);
        assert_eq!(emergency_fund_score(10_000.0, 5_000.0), 7);
        assert_eq!(emergency_fund_score(0.0, 5_000.0), 0);
    }

    #[test]
    fn goal_progress_averages_active_goals_only() {
        assert_eq!(goal_progress_score(&[]), 50);

        let goals = [
            goal(100_000.0, 50_000.0, GoalStatus::Active),
            goal(10_000.0, 25_000.0, GoalStatus::Active),
            goal(10_000.0, 0.0, GoalStatus::Completed),
        ];
        // (50 + 100) / 2 active goals.
        assert_eq!(goal_progress_score(&goals), 75);

        let inactive = [goal(10_000.0, 10_000.0, GoalStatus::Paused)];
        assert_eq!(goal_progress_score(&inactive), 0);

        let zero_target = [goal(0.0, 500.0, GoalStatus::Active)];
        assert_eq!(goal_progress_score(&zero_target), 0);
    }

    #[test]
    fn debt_health_steps() {
        assert_eq!(debt_health_score(100_000.0, 0.0), 100);
        assert_eq!(debt_health_score(100_000.0, 10_000.0), 100);
        assert_eq!(debt_health_score(100_000.0, 20_000.0), 90);
        assert_eq!(debt_health_score(100_000.0, 30_000.0), 75);
        assert_eq!(debt_health_score(100_000.0, 40_000.0), 60);
        assert_eq!(debt_health_score(100_000.0, 50_000.0), 40);
        assert_eq!(debt_health_score(100_000.0, 65_500.0), 25);
        assert_eq!(debt_health_score(100_000.0, 120_000.0), 0);
        assert_eq!(debt_health_score(0.0, 10_000.0), 0);
    }

    #[test]
    fn behavioral_contributions_are_capped() {
        assert_eq!(behavioral_score(0, 0, 0), 0);
        assert_eq!(behavioral_score(15, 3, 1), 20 + 15 + 10);
        assert_eq!(behavioral_score(29, 0, 0), 38);
        assert_eq!(behavioral_score(365, 40, 12), 100);
    }

    #[test]
    fn weighted_total_floors() {
        let components = ScoreComponents {
            savings_rate: 41,
            emergency_fund: 7,
            goal_progress: 33,
            debt_health: 75,
            behavioral: 1,
        };
        // 12.3 + 1.75 + 6.6 + 11.25 + 0.1 = 32.0
        assert_eq!(weighted_total(&components), 32);

        let components = ScoreComponents {
            savings_rate: 1,
            emergency_fund: 1,
            goal_progress: 1,
            debt_health: 1,
            behavioral: 1,
        };
        assert_eq!(weighted_total(&components), 1);

        let components = ScoreComponents {
            savings_rate: 1,
            emergency_fund: 0,
            goal_progress: 0,
            debt_health: 0,
            behavioral: 0,
        };
        assert_eq!(weighted_total(&components), 0);
    }

    #[test]
    fn zero_denominators_do_not_fail() {
        let snapshot = FinancialSnapshot::default();
        let score = compute_score(&snapshot);
        assert_eq!(score.components.savings_rate, 0);
        assert_eq!(score.components.emergency_fund, 0);
        assert_eq!(score.components.goal_progress, 50);
        assert_eq!(score.components.debt_health, 0);
        assert_eq!(score.total, 10);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(96))]

        #[test]
        fn prop_score_stays_in_range(
            income in -10_000i64..500_000,
            expenses in -10_000i64..400_000,
            savings in -100_000i64..500_000,
            fund in 0u32..5_000_000,
            emi in 0u32..600_000,
            days in 0u32..1_000,
            budgets in 0u32..50,
            goals_set in 0u32..20,
            progress in proptest::collection::vec((1u32..1_000_000, 0u32..2_000_000, proptest::bool::ANY), 0..6),
        ) {
            let goals = progress
                .into_iter()
                .map(|(target, current, active)| goal(
                    target as f64,
                    current as f64,
                    if active { GoalStatus::Active } else { GoalStatus::Completed },
                ))
                .collect();
            let snapshot = FinancialSnapshot {
                monthly_income: income as f64,
                monthly_expenses: expenses as f64,
                monthly_savings: savings as f64,
                emergency_fund: fund as f64,
                monthly_emi: emi as f64,
                goals,
                days_active: days,
                budgets_logged: budgets,
                goals_set,
            };
            let score = compute_score(&snapshot);
            prop_assert!(score.total <= 100);
            let c = score.components;
            for sub in [c.savings_rate, c.emergency_fund, c.goal_progress, c.debt_health, c.behavioral] {
                prop_assert!(sub <= 100);
            }
        }
    }
}
