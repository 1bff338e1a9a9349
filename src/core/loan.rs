use super::error::{EngineError, EngineResult, require_finite, require_non_negative, require_positive};
use super::types::{AffordableLoan, AmortizationResult, DebtBand, DebtToIncomeAssessment, LoanTerms};

const HEALTHY_LIMIT_PCT: f64 = 30.0;
const MODERATE_LIMIT_PCT: f64 = 40.0;
const HIGH_LIMIT_PCT: f64 = 50.0;

/// EMI share of income that keeps a borrower in the healthy band.
pub const HEALTHY_EMI_SHARE_PCT: f64 = HEALTHY_LIMIT_PCT;

pub fn amortize(terms: &LoanTerms) -> EngineResult<AmortizationResult> {
    let principal = require_positive("principal", terms.principal)?;
    let annual_rate_pct = require_non_negative("annualRate", terms.annual_rate_pct)?;
    if terms.tenure_months == 0 {
        return Err(EngineError::invalid("tenureMonths", "must be > 0"));
    }

    let n = terms.tenure_months as f64;
    let monthly_rate = monthly_rate(annual_rate_pct);
    let emi = if monthly_rate == 0.0 {
        principal / n
    } else {
        let growth = (1.0 + monthly_rate).powf(n);
        principal * monthly_rate * growth / (growth - 1.0)
    };

    let total_payment = emi * n;
    let total_interest = total_payment - principal;

    Ok(AmortizationResult {
        principal,
        annual_rate_pct,
        tenure_months: terms.tenure_months,
        tenure_years: n / 12.0,
        emi,
        total_payment,
        total_interest,
        interest_pct: total_interest / principal * 100.0,
    })
}

pub fn classify_debt_burden(
    total_monthly_emi: f64,
    monthly_income: f64,
) -> EngineResult<DebtToIncomeAssessment> {
    let total_monthly_emi = require_non_negative("totalMonthlyEmi", total_monthly_emi)?;
    let monthly_income = require_positive("monthlyIncome", monthly_income)?;

    let ratio = total_monthly_emi / monthly_income * 100.0;
    let band = band_for_ratio(ratio);

    Ok(DebtToIncomeAssessment {
        total_monthly_emi,
        monthly_income,
        ratio,
        band,
        advisory: band.advisory(),
    })
}

/// Upper bounds are exclusive; anything at or above 50% is critical.
pub fn band_for_ratio(ratio_pct: f64) -> DebtBand {
    if ratio_pct < HEALTHY_LIMIT_PCT {
        DebtBand::Healthy
    } else if ratio_pct < MODERATE_LIMIT_PCT {
        DebtBand::Moderate
    } else if ratio_pct < HIGH_LIMIT_PCT {
        DebtBand::High
    } else {
        DebtBand::Critical
    }
}

/// Largest principal whose EMI stays within `emi_share_pct` of monthly income.
pub fn affordable_principal(
    monthly_income: f64,
    emi_share_pct: f64,
    annual_rate_pct: f64,
    tenure_months: u32,
) -> EngineResult<AffordableLoan> {
    let monthly_income = require_positive("monthlyIncome", monthly_income)?;
    let emi_share_pct = require_finite("emiSharePct", emi_share_pct)?;
    if !(0.0..=100.0).contains(&emi_share_pct) {
        return Err(EngineError::invalid("emiSharePct", "must be between 0 and 100"));
    }
    let annual_rate_pct = require_non_negative("annualRate", annual_rate_pct)?;
    if tenure_months == 0 {
        return Err(EngineError::invalid("tenureMonths", "must be > 0"));
    }

    let max_emi = monthly_income * emi_share_pct / 100.0;
    let n = tenure_months as f64;
    let monthly_rate = monthly_rate(annual_rate_pct);
    let max_principal = if monthly_rate == 0.0 {
        max_emi * n
    } else {
        let growth = (1.0 + monthly_rate).powf(n);
        max_emi * (growth - 1.0) / (monthly_rate * growth)
    };

    Ok(AffordableLoan {
        max_emi,
        max_principal,
        annual_rate_pct,
        tenure_months,
    })
}

fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 12.0 / 100.0
}
