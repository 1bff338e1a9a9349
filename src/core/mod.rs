mod cards;
mod compare;
mod error;
mod invest;
mod loan;
mod policy;
mod salary;
mod score;
mod tax;
mod types;

pub use cards::card_portfolio_benefit;
pub use compare::{compare_fd_vs_debt_fund, compare_fd_vs_debt_fund_for_income, emi_trap_cost};
pub use error::{EngineError, EngineResult};
pub use invest::{
    project, project_lump_sum, project_sip, recommend_allocation, required_monthly_sip,
};
pub use loan::{
    HEALTHY_EMI_SHARE_PCT, affordable_principal, amortize, band_for_ratio, classify_debt_burden,
};
pub use policy::{
    DebtFundPolicy, DeductionCaps, FiscalPolicy, PolicyError, RegimePolicy, SalaryPolicy, Slab,
};
pub use salary::salary_breakup;
pub use score::{
    behavioral_score, compute_score, debt_health_score, emergency_fund_score,
    goal_progress_score, savings_rate_score, weighted_total,
};
pub use tax::{compare_regimes, compute_tax, marginal_rate};
pub use types::{
    AffordableLoan, AllocationRecommendation, AmortizationResult, CardPortfolioSummary,
    CreditCard, DebtBand, DebtFundOutcome, DebtToIncomeAssessment, Deductions, EmiTrapInput,
    EmiTrapResult, FdVsDebtFundComparison, FdVsDebtFundInput, FinancialSnapshot, FincaScore,
    FixedDepositOutcome, Goal, GoalStatus, Instrument, InvestmentPlan, LoanTerms,
    ProjectionResult, RegimeComparison, RiskProfile, SalaryBreakup, SalaryStructure,
    ScoreComponents, TaxProfile, TaxRegime, TaxResult,
};
