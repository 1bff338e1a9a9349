//! Fiscal-year policy numbers: slab tables, rebates, caps and the capital-gains
//! assumptions used by the comparison tools.
//!
//! These change every budget, so they live in data rather than in the
//! calculators. [`FiscalPolicy::FY2024_25`] is the built-in table; other years
//! can be loaded from JSON with [`FiscalPolicy::from_json_file`].

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::{EngineError, EngineResult};
use super::types::TaxRegime;

/// One income band. `upper_bound: None` is the open top slab.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slab {
    pub upper_bound: Option<f64>,
    pub rate: f64,
}

impl Slab {
    const fn capped(upper_bound: f64, rate: f64) -> Self {
        Slab {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    const fn open(rate: f64) -> Self {
        Slab {
            upper_bound: None,
            rate,
        }
    }

    pub fn upper(&self) -> f64 {
        self.upper_bound.unwrap_or(f64::INFINITY)
    }
}

const OLD_REGIME_SLABS_FY2024_25: &[Slab] = &[
    Slab::capped(250_000.0, 0.0),
    Slab::capped(500_000.0, 0.05),
    Slab::capped(1_000_000.0, 0.20),
    Slab::open(0.30),
];

const NEW_REGIME_SLABS_FY2024_25: &[Slab] = &[
    Slab::capped(300_000.0, 0.0),
    Slab::capped(600_000.0, 0.05),
    Slab::capped(900_000.0, 0.10),
    Slab::capped(1_200_000.0, 0.15),
    Slab::capped(1_500_000.0, 0.20),
    Slab::open(0.30),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimePolicy {
    pub slabs: Cow<'static, [Slab]>,
    pub rebate_income_limit: f64,
    pub rebate_cap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeductionCaps {
    #[serde(rename = "section80C")]
    pub section_80c: f64,
    #[serde(rename = "section80D")]
    pub section_80d: f64,
    #[serde(rename = "homeLoanInterest")]
    pub home_loan_interest: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtFundPolicy {
    pub indexation_rate_pct: f64,
    pub long_term_rate: f64,
    pub long_term_min_months: u32,
}

/// Payroll assumptions behind the CTC to in-hand breakup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryPolicy {
    /// Employee provident fund share of basic pay, as a fraction.
    pub pf_rate: f64,
    pub professional_tax: f64,
    pub standard_deduction: f64,
    /// Flat investment deduction assumed on top of PF.
    pub assumed_investment_deduction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalPolicy {
    pub fiscal_year: Cow<'static, str>,
    pub old_regime: RegimePolicy,
    pub new_regime: RegimePolicy,
    pub cess_rate: f64,
    pub deduction_caps: DeductionCaps,
    pub debt_fund: DebtFundPolicy,
    pub personal_loan_rate_pct: f64,
    pub salary: SalaryPolicy,
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse policy JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] EngineError),
}

impl FiscalPolicy {
    pub const FY2024_25: FiscalPolicy = FiscalPolicy {
        fiscal_year: Cow::Borrowed("2024-25"),
        old_regime: RegimePolicy {
            slabs: Cow::Borrowed(OLD_REGIME_SLABS_FY2024_25),
            rebate_income_limit: 700_000.0,
            rebate_cap: 12_500.0,
        },
        new_regime: RegimePolicy {
            slabs: Cow::Borrowed(NEW_REGIME_SLABS_FY2024_25),
            rebate_income_limit: 700_000.0,
            rebate_cap: 25_000.0,
        },
        cess_rate: 0.04,
        deduction_caps: DeductionCaps {
            section_80c: 150_000.0,
            section_80d: 50_000.0,
            home_loan_interest: 200_000.0,
        },
        debt_fund: DebtFundPolicy {
            indexation_rate_pct: 5.0,
            long_term_rate: 0.20,
            long_term_min_months: 36,
        },
        personal_loan_rate_pct: 14.0,
        salary: SalaryPolicy {
            pf_rate: 0.12,
            professional_tax: 2_400.0,
            standard_deduction: 50_000.0,
            assumed_investment_deduction: 75_000.0,
        },
    };

    pub fn regime(&self, regime: TaxRegime) -> &RegimePolicy {
        match regime {
            TaxRegime::Old => &self.old_regime,
            TaxRegime::New => &self.new_regime,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        let policy: FiscalPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> EngineResult<()> {
        for regime in TaxRegime::ALL {
            let (slabs_field, rebate_field) = match regime {
                TaxRegime::Old => ("oldRegime.slabs", "oldRegime.rebate"),
                TaxRegime::New => ("newRegime.slabs", "newRegime.rebate"),
            };
            let table = self.regime(regime);
            validate_slabs(slabs_field, &table.slabs)?;
            if !table.rebate_income_limit.is_finite() || table.rebate_income_limit < 0.0 {
                return Err(EngineError::invalid(
                    rebate_field,
                    "rebateIncomeLimit must be >= 0",
                ));
            }
            if !table.rebate_cap.is_finite() || table.rebate_cap < 0.0 {
                return Err(EngineError::invalid(rebate_field, "rebateCap must be >= 0"));
            }
        }

        if !(0.0..=1.0).contains(&self.cess_rate) {
            return Err(EngineError::invalid(
                "cessRate",
                "must be between 0 and 1",
            ));
        }

        let caps = &self.deduction_caps;
        for cap in [caps.section_80c, caps.section_80d, caps.home_loan_interest] {
            if !cap.is_finite() || cap < 0.0 {
                return Err(EngineError::invalid("deductionCaps", "caps must be >= 0"));
            }
        }

        if !self.debt_fund.indexation_rate_pct.is_finite()
            || self.debt_fund.indexation_rate_pct <= -100.0
        {
            return Err(EngineError::invalid(
                "debtFund.indexationRatePct",
                "must be > -100",
            ));
        }
        if !(0.0..=1.0).contains(&self.debt_fund.long_term_rate) {
            return Err(EngineError::invalid(
                "debtFund.longTermRate",
                "must be between 0 and 1",
            ));
        }
        if !self.personal_loan_rate_pct.is_finite() || self.personal_loan_rate_pct < 0.0 {
            return Err(EngineError::invalid("personalLoanRatePct", "must be >= 0"));
        }

        let salary = &self.salary;
        if !(0.0..=1.0).contains(&salary.pf_rate) {
            return Err(EngineError::invalid("salary.pfRate", "must be between 0 and 1"));
        }
        for amount in [
            salary.professional_tax,
            salary.standard_deduction,
            salary.assumed_investment_deduction,
        ] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(EngineError::invalid("salary", "amounts must be >= 0"));
            }
        }
        Ok(())
    }
}

impl Default for FiscalPolicy {
    fn default() -> Self {
        Self::FY2024_25
    }
}

fn validate_slabs(field: &'static str, slabs: &[Slab]) -> EngineResult<()> {
    let Some((last, capped)) = slabs.split_last() else {
        return Err(EngineError::invalid(field, "table must not be empty"));
    };
    if last.upper_bound.is_some() {
        return Err(EngineError::invalid(
            field,
            "last slab must be open-ended (upperBound null)",
        ));
    }

    let mut previous = 0.0;
    for slab in capped {
        let Some(bound) = slab.upper_bound else {
            return Err(EngineError::invalid(
                field,
                "only the last slab may be open-ended",
            ));
        };
        if !bound.is_finite() || bound <= previous {
            return Err(EngineError::invalid(
                field,
                "upper bounds must be finite and strictly increasing",
            ));
        }
        previous = bound;
    }

    if slabs.iter().any(|s| !(0.0..=1.0).contains(&s.rate)) {
        return Err(EngineError::invalid(field, "rates must be between 0 and 1"));
    }
    Ok(())
}
