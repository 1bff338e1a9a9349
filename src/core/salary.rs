//! CTC to in-hand salary breakup.
//!
//! Income tax goes through the same slab, cess and rebate path as
//! [`compute_tax`](super::tax::compute_tax); only the taxable income is
//! derived differently, from the payroll assumptions in
//! [`SalaryPolicy`](super::policy::SalaryPolicy).

use super::error::{EngineError, EngineResult, require_finite, require_non_negative};
use super::policy::FiscalPolicy;
use super::tax::levy;
use super::types::{SalaryBreakup, SalaryStructure};

const MONTHS_PER_YEAR: f64 = 12.0;

pub fn salary_breakup(
    structure: &SalaryStructure,
    policy: &FiscalPolicy,
) -> EngineResult<SalaryBreakup> {
    let ctc = require_non_negative("ctc", structure.ctc)?;
    let basic_pct = percent("basicPct", structure.basic_pct)?;
    let hra_pct = percent("hraPct", structure.hra_pct)?;
    let other_deductions = require_non_negative("otherDeductions", structure.other_deductions)?;

    let basic_salary = ctc * basic_pct / 100.0;
    let hra = basic_salary * hra_pct / 100.0;
    if basic_salary + hra > ctc {
        return Err(EngineError::invalid(
            "hraPct",
            "basic plus HRA cannot exceed CTC",
        ));
    }
    let special_allowance = ctc - basic_salary - hra;

    let rules = &policy.salary;
    let pf_contribution = basic_salary * rules.pf_rate;
    let professional_tax = rules.professional_tax;
    let taxable_income = (ctc
        - rules.standard_deduction
        - pf_contribution
        - rules.assumed_investment_deduction)
        .max(0.0);
    let income_tax = levy(taxable_income, structure.regime, policy).final_tax;

    let total_deductions = pf_contribution + professional_tax + income_tax + other_deductions;
    let annual_in_hand = ctc - total_deductions;

    Ok(SalaryBreakup {
        ctc,
        regime: structure.regime,
        basic_salary,
        hra,
        special_allowance,
        pf_contribution,
        professional_tax,
        taxable_income,
        income_tax,
        other_deductions,
        total_deductions,
        annual_in_hand,
        monthly_in_hand: annual_in_hand / MONTHS_PER_YEAR,
    })
}

fn percent(field: &'static str, pct: f64) -> EngineResult<f64> {
    require_finite(field, pct)?;
    if !(0.0..=100.0).contains(&pct) {
        return Err(EngineError::invalid(field, "must be between 0 and 100"));
    }
    Ok(pct)
}
