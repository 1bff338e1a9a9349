use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::EngineError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxRegime {
    Old,
    New,
}

impl TaxRegime {
    pub const ALL: [TaxRegime; 2] = [TaxRegime::Old, TaxRegime::New];

    pub fn as_str(self) -> &'static str {
        match self {
            TaxRegime::Old => "old",
            TaxRegime::New => "new",
        }
    }

    /// Only the old regime honours Chapter VI-A style deductions.
    pub fn allows_deductions(self) -> bool {
        matches!(self, TaxRegime::Old)
    }
}

impl fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaxRegime {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" => Ok(TaxRegime::Old),
            "new" => Ok(TaxRegime::New),
            other => Err(EngineError::invalid(
                "regime",
                format!("unknown regime '{other}', expected 'old' or 'new'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deductions {
    pub section_80c: f64,
    pub section_80d: f64,
    pub hra_exemption: f64,
    pub home_loan_interest: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxProfile {
    pub gross_income: f64,
    pub regime: TaxRegime,
    pub deductions: Deductions,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub regime: TaxRegime,
    pub gross_income: f64,
    pub total_deductions: f64,
    pub taxable_income: f64,
    pub tax_before_cess: f64,
    pub cess: f64,
    pub rebate: f64,
    pub final_tax: f64,
    pub effective_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeComparison {
    pub old_regime: TaxResult,
    pub new_regime: TaxResult,
    pub recommended: TaxRegime,
    pub savings: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub principal: f64,
    pub annual_rate_pct: f64,
    pub tenure_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationResult {
    pub principal: f64,
    pub annual_rate_pct: f64,
    pub tenure_months: u32,
    pub tenure_years: f64,
    pub emi: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub interest_pct: f64,
}

/// Debt-to-income risk bands, ordered from least to most severe.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtBand {
    Healthy,
    Moderate,
    High,
    Critical,
}

impl DebtBand {
    pub fn advisory(self) -> &'static str {
        match self {
            DebtBand::Healthy => "Your debt level is manageable. Good financial health!",
            DebtBand::Moderate => "Consider reducing debt. Avoid taking new loans.",
            DebtBand::High => "High debt burden. Focus on debt repayment urgently.",
            DebtBand::Critical => "Critical! Seek debt counseling immediately.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtToIncomeAssessment {
    pub total_monthly_emi: f64,
    pub monthly_income: f64,
    pub ratio: f64,
    pub band: DebtBand,
    pub advisory: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordableLoan {
    pub max_emi: f64,
    pub max_principal: f64,
    pub annual_rate_pct: f64,
    pub tenure_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvestmentPlan {
    Sip {
        monthly_contribution: f64,
        years: u32,
        expected_annual_return_pct: f64,
    },
    LumpSum {
        principal: f64,
        years: u32,
        expected_annual_return_pct: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub total_contributed: f64,
    pub maturity_value: f64,
    pub gain: f64,
    pub gain_pct: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl FromStr for RiskProfile {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(RiskProfile::Conservative),
            "moderate" => Ok(RiskProfile::Moderate),
            "aggressive" => Ok(RiskProfile::Aggressive),
            other => Err(EngineError::invalid(
                "riskProfile",
                format!("unknown risk profile '{other}'"),
            )),
        }
    }
}

/// Whole-number percentages; the four fields always sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecommendation {
    pub equity: u32,
    pub debt: u32,
    pub gold: u32,
    pub cash: u32,
}

impl AllocationRecommendation {
    pub fn total(&self) -> u32 {
        self.equity + self.debt + self.gold + self.cash
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub target_amount: f64,
    pub current_amount: f64,
    pub status: GoalStatus,
}

/// Aggregated monthly facts about one user, supplied by the persistence layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialSnapshot {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_savings: f64,
    pub emergency_fund: f64,
    pub monthly_emi: f64,
    pub goals: Vec<Goal>,
    pub days_active: u32,
    pub budgets_logged: u32,
    pub goals_set: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    pub savings_rate: u8,
    pub emergency_fund: u8,
    pub goal_progress: u8,
    pub debt_health: u8,
    pub behavioral: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FincaScore {
    pub total: u8,
    pub components: ScoreComponents,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FdVsDebtFundInput {
    pub principal: f64,
    pub months: u32,
    pub slab_rate_pct: f64,
    pub fd_rate_pct: f64,
    pub debt_fund_return_pct: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Instrument {
    FixedDeposit,
    DebtFund,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedDepositOutcome {
    pub maturity: f64,
    pub interest: f64,
    pub tax: f64,
    pub post_tax: f64,
    pub post_tax_return_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtFundOutcome {
    pub maturity: f64,
    pub gains: f64,
    pub long_term: bool,
    pub indexed_cost: Option<f64>,
    pub taxable_gains: f64,
    pub tax: f64,
    pub post_tax: f64,
    pub post_tax_return_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FdVsDebtFundComparison {
    pub fixed_deposit: FixedDepositOutcome,
    pub debt_fund: DebtFundOutcome,
    pub winner: Instrument,
    pub difference: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmiTrapInput {
    pub purchase_amount: f64,
    pub annual_rate_pct: f64,
    pub tenure_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiTrapResult {
    pub amortization: AmortizationResult,
    pub pay_in_full: f64,
    pub extra_cost: f64,
    pub extra_cost_pct: f64,
    pub personal_loan_rate_pct: f64,
    pub personal_loan_interest: f64,
    pub savings_vs_personal_loan: f64,
}

/// Annual CTC and how the employer splits it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryStructure {
    pub ctc: f64,
    /// Basic pay as a percentage of CTC.
    pub basic_pct: f64,
    /// HRA as a percentage of basic pay.
    pub hra_pct: f64,
    pub other_deductions: f64,
    pub regime: TaxRegime,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryBreakup {
    pub ctc: f64,
    pub regime: TaxRegime,
    pub basic_salary: f64,
    pub hra: f64,
    pub special_allowance: f64,
    pub pf_contribution: f64,
    pub professional_tax: f64,
    pub taxable_income: f64,
    pub income_tax: f64,
    pub other_deductions: f64,
    pub total_deductions: f64,
    pub annual_in_hand: f64,
    pub monthly_in_hand: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditCard {
    pub monthly_spend: f64,
    pub cashback_rate_pct: f64,
    pub annual_fee: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPortfolioSummary {
    pub card_count: usize,
    pub monthly_spend: f64,
    pub monthly_cashback: f64,
    pub annual_cashback: f64,
    pub annual_fees: f64,
    pub net_annual_benefit: f64,
}
