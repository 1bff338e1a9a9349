use super::error::{
    EngineError, EngineResult, require_finite, require_non_negative, require_positive,
};
use super::loan::amortize;
use super::policy::FiscalPolicy;
use super::tax::marginal_rate;
use super::types::{
    DebtFundOutcome, EmiTrapInput, EmiTrapResult, FdVsDebtFundComparison, FdVsDebtFundInput,
    FixedDepositOutcome, Instrument, LoanTerms, TaxRegime,
};

/// Post-tax head-to-head of a quarterly-compounding FD against a debt fund.
/// Ties go to the fixed deposit.
pub fn compare_fd_vs_debt_fund(
    input: &FdVsDebtFundInput,
    policy: &FiscalPolicy,
) -> EngineResult<FdVsDebtFundComparison> {
    let principal = require_positive("principal", input.principal)?;
    if input.months == 0 {
        return Err(EngineError::invalid("months", "must be > 0"));
    }
    let slab_rate = percent_in_range("slabRatePct", input.slab_rate_pct)? / 100.0;
    let fd_rate_pct = rate_above_total_loss("fdRatePct", input.fd_rate_pct)?;
    let debt_return_pct = rate_above_total_loss("debtFundReturnPct", input.debt_fund_return_pct)?;

    let years = input.months as f64 / 12.0;

    let fd_maturity = principal * (1.0 + fd_rate_pct / 400.0).powf(4.0 * years);
    let fd_interest = fd_maturity - principal;
    let fd_tax = fd_interest * slab_rate;
    let fd_post_tax = fd_maturity - fd_tax;
    let fixed_deposit = FixedDepositOutcome {
        maturity: fd_maturity,
        interest: fd_interest,
        tax: fd_tax,
        post_tax: fd_post_tax,
        post_tax_return_pct: post_tax_return_pct(fd_post_tax, principal),
    };

    let rules = &policy.debt_fund;
    let debt_maturity = principal * (1.0 + debt_return_pct / 100.0).powf(years);
    let debt_gains = debt_maturity - principal;
    let long_term = input.months >= rules.long_term_min_months;
    let (indexed_cost, taxable_gains, debt_tax) = if long_term {
        let indexed = principal * (1.0 + rules.indexation_rate_pct / 100.0).powf(years);
        let taxable = (debt_maturity - indexed).max(0.0);
        (Some(indexed), taxable, taxable * rules.long_term_rate)
    } else {
        (None, debt_gains, debt_gains * slab_rate)
    };
    let debt_post_tax = debt_maturity - debt_tax;
    let debt_fund = DebtFundOutcome {
        maturity: debt_maturity,
        gains: debt_gains,
        long_term,
        indexed_cost,
        taxable_gains,
        tax: debt_tax,
        post_tax: debt_post_tax,
        post_tax_return_pct: post_tax_return_pct(debt_post_tax, principal),
    };

    let winner = if debt_post_tax > fd_post_tax {
        Instrument::DebtFund
    } else {
        Instrument::FixedDeposit
    };

    Ok(FdVsDebtFundComparison {
        fixed_deposit,
        debt_fund,
        winner,
        difference: (debt_post_tax - fd_post_tax).abs(),
    })
}

/// Same comparison with the slab rate looked up from the investor's income.
pub fn compare_fd_vs_debt_fund_for_income(
    principal: f64,
    months: u32,
    regime: TaxRegime,
    annual_income: f64,
    fd_rate_pct: f64,
    debt_fund_return_pct: f64,
    policy: &FiscalPolicy,
) -> EngineResult<FdVsDebtFundComparison> {
    let annual_income = require_non_negative("annualIncome", annual_income)?;
    let slab_rate_pct = marginal_rate(regime, annual_income, policy)? * 100.0;
    compare_fd_vs_debt_fund(
        &FdVsDebtFundInput {
            principal,
            months,
            slab_rate_pct,
            fd_rate_pct,
            debt_fund_return_pct,
        },
        policy,
    )
}

/// Extra cost of converting a card purchase to EMI instead of paying in full,
/// with a personal loan at the policy rate as the cheaper reference point.
pub fn emi_trap_cost(input: &EmiTrapInput, policy: &FiscalPolicy) -> EngineResult<EmiTrapResult> {
    let amortization = amortize(&LoanTerms {
        principal: input.purchase_amount,
        annual_rate_pct: input.annual_rate_pct,
        tenure_months: input.tenure_months,
    })?;

    let extra_cost = amortization.total_interest;
    let personal_loan_rate_pct = policy.personal_loan_rate_pct;
    let personal_loan_interest = amortization.principal * personal_loan_rate_pct / 100.0
        * input.tenure_months as f64
        / 12.0;

    Ok(EmiTrapResult {
        pay_in_full: amortization.principal,
        extra_cost,
        extra_cost_pct: amortization.interest_pct,
        personal_loan_rate_pct,
        personal_loan_interest,
        savings_vs_personal_loan: extra_cost - personal_loan_interest,
        amortization,
    })
}

fn percent_in_range(field: &'static str, pct: f64) -> EngineResult<f64> {
    require_finite(field, pct)?;
    if !(0.0..=100.0).contains(&pct) {
        return Err(EngineError::invalid(field, "must be between 0 and 100"));
    }
    Ok(pct)
}

fn rate_above_total_loss(field: &'static str, pct: f64) -> EngineResult<f64> {
    require_finite(field, pct)?;
    if pct <= -100.0 {
        return Err(EngineError::invalid(field, "must be > -100"));
    }
    Ok(pct)
}

fn post_tax_return_pct(post_tax: f64, principal: f64) -> f64 {
    (post_tax / principal - 1.0) * 100.0
}
