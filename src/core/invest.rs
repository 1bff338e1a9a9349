use super::error::{EngineError, EngineResult, require_finite, require_non_negative};
use super::types::{AllocationRecommendation, InvestmentPlan, ProjectionResult, RiskProfile};

const AGE_ADJUSTMENT_START: u32 = 40;
const EQUITY_CUT_PER_YEAR: u32 = 2;
const MAX_EQUITY_CUT: u32 = 20;
const EQUITY_FLOOR: u32 = 20;

pub fn project(plan: &InvestmentPlan) -> EngineResult<ProjectionResult> {
    match *plan {
        InvestmentPlan::Sip {
            monthly_contribution,
            years,
            expected_annual_return_pct,
        } => project_sip(monthly_contribution, years, expected_annual_return_pct),
        InvestmentPlan::LumpSum {
            principal,
            years,
            expected_annual_return_pct,
        } => project_lump_sum(principal, years, expected_annual_return_pct),
    }
}

/// Future value of a monthly SIP. Contributions are posted at the start of each
/// month (annuity-due).
pub fn project_sip(
    monthly_amount: f64,
    years: u32,
    annual_return_pct: f64,
) -> EngineResult<ProjectionResult> {
    let monthly_amount = require_non_negative("monthlyAmount", monthly_amount)?;
    let annual_return_pct = validate_return("annualReturnPct", annual_return_pct)?;

    let months = years as f64 * 12.0;
    let monthly_rate = annual_return_pct / 12.0 / 100.0;
    let maturity = if monthly_rate == 0.0 {
        monthly_amount * months
    } else {
        monthly_amount * (annuity_factor(monthly_rate, months) * (1.0 + monthly_rate))
    };

    Ok(projection(monthly_amount * months, maturity))
}

pub fn project_lump_sum(
    principal: f64,
    years: u32,
    annual_return_pct: f64,
) -> EngineResult<ProjectionResult> {
    let principal = require_non_negative("principal", principal)?;
    let annual_return_pct = validate_return("annualReturnPct", annual_return_pct)?;

    let maturity = principal * (1.0 + annual_return_pct / 100.0).powf(years as f64);
    Ok(projection(principal, maturity))
}

/// Monthly SIP that grows to `target_amount`, under the same annuity-due
/// convention as [`project_sip`].
pub fn required_monthly_sip(
    target_amount: f64,
    years: u32,
    annual_return_pct: f64,
) -> EngineResult<f64> {
    let target_amount = require_non_negative("targetAmount", target_amount)?;
    let annual_return_pct = validate_return("annualReturnPct", annual_return_pct)?;
    if years == 0 {
        return Err(EngineError::invalid("years", "must be > 0"));
    }

    let months = years as f64 * 12.0;
    let monthly_rate = annual_return_pct / 12.0 / 100.0;
    if monthly_rate == 0.0 {
        return Ok(target_amount / months);
    }
    let factor = annuity_factor(monthly_rate, months) * (1.0 + monthly_rate);
    Ok(target_amount / factor)
}

pub fn recommend_allocation(risk_profile: RiskProfile, age: u32) -> AllocationRecommendation {
    let mut allocation = base_allocation(risk_profile);

    if age > AGE_ADJUSTMENT_START {
        let cut = (age - AGE_ADJUSTMENT_START)
            .saturating_mul(EQUITY_CUT_PER_YEAR)
            .min(MAX_EQUITY_CUT);
        let equity = allocation.equity.saturating_sub(cut).max(EQUITY_FLOOR);
        let moved = allocation.equity.saturating_sub(equity);
        allocation.equity -= moved;
        allocation.debt += moved;
    }

    allocation
}

fn base_allocation(risk_profile: RiskProfile) -> AllocationRecommendation {
    let (equity, debt, gold, cash) = match risk_profile {
        RiskProfile::Conservative => (20, 60, 10, 10),
        RiskProfile::Moderate => (50, 35, 10, 5),
        RiskProfile::Aggressive => (75, 15, 5, 5),
    };
    AllocationRecommendation {
        equity,
        debt,
        gold,
        cash,
    }
}

fn annuity_factor(rate: f64, periods: f64) -> f64 {
    ((1.0 + rate).powf(periods) - 1.0) / rate
}

fn validate_return(field: &'static str, pct: f64) -> EngineResult<f64> {
    require_finite(field, pct)?;
    if pct <= -100.0 {
        return Err(EngineError::invalid(field, "must be > -100"));
    }
    Ok(pct)
}

fn projection(total_contributed: f64, maturity_value: f64) -> ProjectionResult {
    let gain = maturity_value - total_contributed;
    let gain_pct = if total_contributed > 0.0 {
        gain / total_contributed * 100.0
    } else {
        0.0
    };
    ProjectionResult {
        total_contributed,
        maturity_value,
        gain,
        gain_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn sip_uses_annuity_due_formula() {
        let result = project_sip(10_000.0, 10, 12.0).expect("valid plan");
        let r: f64 = 0.01;
        let expected = 10_000.0 * ((1.0 + r).powf(120.0) - 1.0) / r * (1.0 + r);

        assert_approx(result.total_contributed, 1_200_000.0);
        assert!((result.maturity_value - expected).abs() / expected <= 1e-12);
        // Start-of-month posting earns one extra month over an ordinary annuity.
        let ordinary = 10_000.0 * ((1.0 + r).powf(120.0) - 1.0) / r;
        assert!(result.maturity_value > ordinary);
        assert_approx(result.gain, result.maturity_value - result.total_contributed);
    }

    #[test]
    fn sip_with_zero_return_is_plain_sum() {
        let result = project_sip(2_500.0, 3, 0.0).expect("valid plan");
        assert_eq!(result.maturity_value, 2_500.0 * 36.0);
        assert_eq!(result.gain, 0.0);
        assert_eq!(result.gain_pct, 0.0);
    }

    #[test]
    fn zero_contribution_has_zero_gain_pct() {
        let result = project_sip(0.0, 5, 10.0).expect("valid plan");
        assert_eq!(result.total_contributed, 0.0);
        assert_eq!(result.gain_pct, 0.0);
    }

    #[test]
    fn lump_sum_compounds_annually() {
        let result = project_lump_sum(100_000.0, 2, 10.0).expect("valid plan");
        assert_approx(result.maturity_value, 121_000.0);
        assert_approx(result.gain, 21_000.0);
        assert_approx(result.gain_pct, 21.0);
    }

    #[test]
    fn plan_dispatch_matches_direct_calls() {
        let sip = project(&InvestmentPlan::Sip {
            monthly_contribution: 5_000.0,
            years: 15,
            expected_annual_return_pct: 11.0,
        })
        .expect("valid plan");
        assert_eq!(sip, project_sip(5_000.0, 15, 11.0).expect("valid plan"));

        let lump = project(&InvestmentPlan::LumpSum {
            principal: 50_000.0,
            years: 7,
            expected_annual_return_pct: 8.0,
        })
        .expect("valid plan");
        assert_eq!(lump, project_lump_sum(50_000.0, 7, 8.0).expect("valid plan"));
    }

    #[test]
    fn rejects_invalid_projection_inputs() {
        assert_eq!(
            project_sip(-1.0, 5, 10.0).expect_err("negative amount").field(),
            "monthlyAmount"
        );
        assert_eq!(
            project_lump_sum(1_000.0, 5, -100.0).expect_err("total loss rate").field(),
            "annualReturnPct"
        );
        assert_eq!(
            project_sip(1_000.0, 5, f64::NAN).expect_err("nan rate").field(),
            "annualReturnPct"
        );
    }

    #[test]
    fn required_sip_inverts_projection() {
        let monthly = required_monthly_sip(2_000_000.0, 10, 12.0).expect("valid goal");
        let projected = project_sip(monthly, 10, 12.0).expect("valid plan");
        assert!((projected.maturity_value - 2_000_000.0).abs() < 1e-4);

        assert_approx(required_monthly_sip(120_000.0, 1, 0.0).expect("valid"), 10_000.0);
        assert!(required_monthly_sip(1_000.0, 0, 5.0).is_err());
    }

    #[test]
    fn allocation_base_tables_before_forty() {
        let moderate = recommend_allocation(RiskProfile::Moderate, 30);
        assert_eq!(
            moderate,
            AllocationRecommendation {
                equity: 50,
                debt: 35,
                gold: 10,
                cash: 5
            }
        );
        assert_eq!(recommend_allocation(RiskProfile::Aggressive, 40).equity, 75);
    }

    #[test]
    fn allocation_shifts_equity_to_debt_with_age() {
        let at_45 = recommend_allocation(RiskProfile::Aggressive, 45);
        assert_eq!(at_45.equity, 65);
        assert_eq!(at_45.debt, 25);

        let at_70 = recommend_allocation(RiskProfile::Moderate, 70);
        assert_eq!(at_70.equity, 30);
        assert_eq!(at_70.debt, 55);
        assert_eq!(at_70.gold, 10);
        assert_eq!(at_70.cash, 5);
    }

    #[test]
    fn conservative_equity_never_drops_below_floor() {
        let allocation = recommend_allocation(RiskProfile::Conservative, 65);
        assert_eq!(allocation.equity, 20);
        assert_eq!(allocation.debt, 60);
        assert_eq!(allocation.total(), 100);
    }

    #[test]
    fn extreme_ages_saturate_the_equity_cut() {
        for age in [u32::MAX, 3_000_000_000, (1 << 31) + 40] {
            let allocation = recommend_allocation(RiskProfile::Aggressive, age);
            assert_eq!(allocation.equity, 55, "age {age}");
            assert_eq!(allocation.debt, 35, "age {age}");
            assert_eq!(allocation.total(), 100);
        }
    }

    #[test]
    fn risk_profile_parses_case_insensitively() {
        assert_eq!(
            "Aggressive".parse::<RiskProfile>().expect("parse"),
            RiskProfile::Aggressive
        );
        let err = "yolo".parse::<RiskProfile>().expect_err("unknown profile");
        assert_eq!(err.field(), "riskProfile");
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_allocation_always_sums_to_hundred(age in proptest::num::u32::ANY, profile_idx in 0usize..3) {
            let profile = [
                RiskProfile::Conservative,
                RiskProfile::Moderate,
                RiskProfile::Aggressive,
            ][profile_idx];
            let allocation = recommend_allocation(profile, age);
            prop_assert_eq!(allocation.total(), 100);
            prop_assert!(allocation.equity >= EQUITY_FLOOR);
        }

        #[test]
        fn prop_sip_gain_is_maturity_minus_invested(
            monthly in 0u32..200_000,
            years in 0u32..40,
            rate_bp in -500i32..2_500,
        ) {
            let result = project_sip(monthly as f64, years, rate_bp as f64 / 100.0)
                .expect("valid plan");
            prop_assert!(result.gain == result.maturity_value - result.total_contributed);
            if rate_bp == 0 {
                prop_assert!(result.maturity_value == monthly as f64 * (years as f64 * 12.0));
            }
        }
    }
}
