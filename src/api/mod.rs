use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    CreditCard, Deductions, EmiTrapInput, EngineError, EngineResult, FdVsDebtFundComparison,
    FdVsDebtFundInput, FinancialSnapshot, FiscalPolicy, Goal, HEALTHY_EMI_SHARE_PCT,
    InvestmentPlan, LoanTerms, RiskProfile, SalaryStructure, TaxProfile, TaxRegime,
    affordable_principal, amortize, card_portfolio_benefit, classify_debt_burden,
    compare_fd_vs_debt_fund, compare_fd_vs_debt_fund_for_income, compare_regimes, compute_score,
    compute_tax, emi_trap_cost, project, recommend_allocation, required_monthly_sip,
    salary_breakup,
};

type SharedPolicy = Arc<FiscalPolicy>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeductionsPayload {
    #[serde(rename = "section80C")]
    section_80c: Option<f64>,
    #[serde(rename = "section80D")]
    section_80d: Option<f64>,
    #[serde(rename = "hraExemption")]
    hra_exemption: Option<f64>,
    #[serde(rename = "homeLoanInterest")]
    home_loan_interest: Option<f64>,
}

impl From<DeductionsPayload> for Deductions {
    fn from(value: DeductionsPayload) -> Self {
        Deductions {
            section_80c: value.section_80c.unwrap_or(0.0),
            section_80d: value.section_80d.unwrap_or(0.0),
            hra_exemption: value.hra_exemption.unwrap_or(0.0),
            home_loan_interest: value.home_loan_interest.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxPayload {
    gross_income: Option<f64>,
    regime: Option<String>,
    deductions: Option<DeductionsPayload>,
}

impl TaxPayload {
    fn into_profile(self) -> EngineResult<TaxProfile> {
        let gross_income = required(self.gross_income, "grossIncome")?;
        let regime = required(self.regime, "regime")?;
        TaxProfile::parse(
            gross_income,
            &regime,
            self.deductions.map(Deductions::from).unwrap_or_default(),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RegimeComparePayload {
    gross_income: Option<f64>,
    deductions: Option<DeductionsPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AmortizePayload {
    principal: Option<f64>,
    #[serde(alias = "annualRatePct")]
    annual_rate: Option<f64>,
    tenure_months: Option<u32>,
}

impl AmortizePayload {
    fn into_terms(self) -> EngineResult<LoanTerms> {
        Ok(LoanTerms {
            principal: required(self.principal, "principal")?,
            annual_rate_pct: required(self.annual_rate, "annualRate")?,
            tenure_months: required(self.tenure_months, "tenureMonths")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DebtBurdenPayload {
    total_monthly_emi: Option<f64>,
    monthly_income: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AffordablePayload {
    monthly_income: Option<f64>,
    emi_share_pct: Option<f64>,
    #[serde(alias = "annualRatePct")]
    annual_rate: Option<f64>,
    tenure_months: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SipPayload {
    monthly_amount: Option<f64>,
    years: Option<u32>,
    annual_return_pct: Option<f64>,
}

impl SipPayload {
    fn into_plan(self) -> EngineResult<InvestmentPlan> {
        Ok(InvestmentPlan::Sip {
            monthly_contribution: required(self.monthly_amount, "monthlyAmount")?,
            years: required(self.years, "years")?,
            expected_annual_return_pct: required(self.annual_return_pct, "annualReturnPct")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LumpSumPayload {
    principal: Option<f64>,
    years: Option<u32>,
    annual_return_pct: Option<f64>,
}

impl LumpSumPayload {
    fn into_plan(self) -> EngineResult<InvestmentPlan> {
        Ok(InvestmentPlan::LumpSum {
            principal: required(self.principal, "principal")?,
            years: required(self.years, "years")?,
            expected_annual_return_pct: required(self.annual_return_pct, "annualReturnPct")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RequiredSipPayload {
    target_amount: Option<f64>,
    years: Option<u32>,
    annual_return_pct: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AllocationPayload {
    risk_profile: Option<String>,
    age: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScorePayload {
    monthly_income: Option<f64>,
    monthly_expenses: Option<f64>,
    monthly_savings: Option<f64>,
    emergency_fund: Option<f64>,
    monthly_emi: Option<f64>,
    goals: Option<Vec<Goal>>,
    days_active: Option<u32>,
    budgets_logged: Option<u32>,
    goals_set: Option<u32>,
}

impl ScorePayload {
    fn into_snapshot(self) -> EngineResult<FinancialSnapshot> {
        Ok(FinancialSnapshot {
            monthly_income: required(self.monthly_income, "monthlyIncome")?,
            monthly_expenses: required(self.monthly_expenses, "monthlyExpenses")?,
            monthly_savings: required(self.monthly_savings, "monthlySavings")?,
            emergency_fund: required(self.emergency_fund, "emergencyFund")?,
            monthly_emi: self.monthly_emi.unwrap_or(0.0),
            goals: self.goals.unwrap_or_default(),
            days_active: self.days_active.unwrap_or(0),
            budgets_logged: self.budgets_logged.unwrap_or(0),
            goals_set: self.goals_set.unwrap_or(0),
        })
    }
}

/// The slab rate comes either directly as `taxBracketPct` or from
/// `annualIncome` + `regime` through the active slab table.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FdVsDebtFundPayload {
    principal: Option<f64>,
    months: Option<u32>,
    #[serde(alias = "slabRatePct")]
    tax_bracket_pct: Option<f64>,
    annual_income: Option<f64>,
    regime: Option<String>,
    fd_rate_pct: Option<f64>,
    debt_fund_return_pct: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EmiTrapPayload {
    purchase_amount: Option<f64>,
    #[serde(alias = "annualRatePct")]
    annual_rate: Option<f64>,
    tenure_months: Option<u32>,
}

impl EmiTrapPayload {
    fn into_input(self) -> EngineResult<EmiTrapInput> {
        Ok(EmiTrapInput {
            purchase_amount: required(self.purchase_amount, "purchaseAmount")?,
            annual_rate_pct: required(self.annual_rate, "annualRate")?,
            tenure_months: required(self.tenure_months, "tenureMonths")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SalaryPayload {
    ctc: Option<f64>,
    basic_pct: Option<f64>,
    hra_pct: Option<f64>,
    other_deductions: Option<f64>,
    regime: Option<String>,
}

impl SalaryPayload {
    fn into_structure(self) -> EngineResult<SalaryStructure> {
        Ok(SalaryStructure {
            ctc: required(self.ctc, "ctc")?,
            basic_pct: required(self.basic_pct, "basicPct")?,
            hra_pct: required(self.hra_pct, "hraPct")?,
            other_deductions: self.other_deductions.unwrap_or(0.0),
            regime: required(self.regime, "regime")?.parse()?,
        })
    }
}

/// Cards without a cashback rate or fee earn and cost nothing.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CardPayload {
    monthly_spend: Option<f64>,
    cashback_rate_pct: Option<f64>,
    annual_fee: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CardPortfolioPayload {
    cards: Option<Vec<CardPayload>>,
}

impl CardPortfolioPayload {
    fn into_cards(self) -> EngineResult<Vec<CreditCard>> {
        required(self.cards, "cards")?
            .into_iter()
            .map(|card| -> EngineResult<CreditCard> {
                Ok(CreditCard {
                    monthly_spend: required(card.monthly_spend, "cards.monthlySpend")?,
                    cashback_rate_pct: card.cashback_rate_pct.unwrap_or(0.0),
                    annual_fee: card.annual_fee.unwrap_or(0.0),
                })
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequiredSipResponse {
    monthly_amount: f64,
    target_amount: f64,
    years: u32,
    annual_return_pct: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse<'a> {
    status: &'static str,
    fiscal_year: &'a str,
}

pub fn router(policy: SharedPolicy) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/policy", get(policy_handler))
        .route("/api/tax", post(tax_handler))
        .route("/api/tax/compare", post(tax_compare_handler))
        .route("/api/loan/amortize", post(amortize_handler))
        .route("/api/loan/debt-burden", post(debt_burden_handler))
        .route("/api/loan/affordable", post(affordable_handler))
        .route("/api/invest/sip", post(sip_handler))
        .route("/api/invest/lump-sum", post(lump_sum_handler))
        .route("/api/invest/required-sip", post(required_sip_handler))
        .route("/api/invest/allocation", post(allocation_handler))
        .route("/api/score", post(score_handler))
        .route("/api/compare/fd-vs-debt-fund", post(fd_vs_debt_fund_handler))
        .route("/api/compare/emi-trap", post(emi_trap_handler))
        .route("/api/salary/breakup", post(salary_handler))
        .route("/api/cards/benefit", post(card_benefit_handler))
        .fallback(not_found_handler)
        .with_state(policy)
}

pub async fn run_http_server(port: u16, policy: FiscalPolicy) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let policy = Arc::new(policy);
    let fiscal_year = policy.fiscal_year.clone();
    let app = router(policy);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, %fiscal_year, "finca HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/health");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn health_handler(State(policy): State<SharedPolicy>) -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            fiscal_year: &policy.fiscal_year,
        },
    )
}

async fn policy_handler(State(policy): State<SharedPolicy>) -> Response {
    json_response(StatusCode::OK, policy.as_ref())
}

async fn tax_handler(
    State(policy): State<SharedPolicy>,
    payload: Result<Json<TaxPayload>, JsonRejection>,
) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = payload.into_profile().and_then(|profile| {
        debug!(
            gross_income = profile.gross_income,
            regime = %profile.regime,
            "computing income tax"
        );
        compute_tax(&profile, &policy)
    });
    respond("tax", result)
}

async fn tax_compare_handler(
    State(policy): State<SharedPolicy>,
    payload: Result<Json<RegimeComparePayload>, JsonRejection>,
) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = required(payload.gross_income, "grossIncome").and_then(|gross_income| {
        let deductions = payload.deductions.map(Deductions::from).unwrap_or_default();
        debug!(gross_income, "comparing tax regimes");
        compare_regimes(gross_income, &deductions, &policy)
    });
    respond("tax/compare", result)
}

async fn amortize_handler(payload: Result<Json<AmortizePayload>, JsonRejection>) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = payload.into_terms().and_then(|terms| {
        debug!(
            principal = terms.principal,
            annual_rate_pct = terms.annual_rate_pct,
            tenure_months = terms.tenure_months,
            "amortizing loan"
        );
        amortize(&terms)
    });
    respond("loan/amortize", result)
}

async fn debt_burden_handler(payload: Result<Json<DebtBurdenPayload>, JsonRejection>) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = required(payload.total_monthly_emi, "totalMonthlyEmi").and_then(|emi| {
        let income = required(payload.monthly_income, "monthlyIncome")?;
        debug!(total_monthly_emi = emi, monthly_income = income, "classifying debt burden");
        classify_debt_burden(emi, income)
    });
    respond("loan/debt-burden", result)
}

async fn affordable_handler(payload: Result<Json<AffordablePayload>, JsonRejection>) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = required(payload.monthly_income, "monthlyIncome").and_then(|income| {
        let annual_rate_pct = required(payload.annual_rate, "annualRate")?;
        let tenure_months = required(payload.tenure_months, "tenureMonths")?;
        let emi_share_pct = payload.emi_share_pct.unwrap_or(HEALTHY_EMI_SHARE_PCT);
        debug!(
            monthly_income = income,
            emi_share_pct, annual_rate_pct, tenure_months, "sizing affordable loan"
        );
        affordable_principal(income, emi_share_pct, annual_rate_pct, tenure_months)
    });
    respond("loan/affordable", result)
}

async fn sip_handler(payload: Result<Json<SipPayload>, JsonRejection>) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = payload.into_plan().and_then(|plan| {
        debug!(?plan, "projecting SIP");
        project(&plan)
    });
    respond("invest/sip", result)
}

async fn lump_sum_handler(payload: Result<Json<LumpSumPayload>, JsonRejection>) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = payload.into_plan().and_then(|plan| {
        debug!(?plan, "projecting lump sum");
        project(&plan)
    });
    respond("invest/lump-sum", result)
}

async fn required_sip_handler(
    payload: Result<Json<RequiredSipPayload>, JsonRejection>,
) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = required(payload.target_amount, "targetAmount").and_then(|target_amount| {
        let years = required(payload.years, "years")?;
        let annual_return_pct = required(payload.annual_return_pct, "annualReturnPct")?;
        debug!(target_amount, years, annual_return_pct, "solving required SIP");
        let monthly_amount = required_monthly_sip(target_amount, years, annual_return_pct)?;
        Ok(RequiredSipResponse {
            monthly_amount,
            target_amount,
            years,
            annual_return_pct,
        })
    });
    respond("invest/required-sip", result)
}

async fn allocation_handler(payload: Result<Json<AllocationPayload>, JsonRejection>) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = required(payload.risk_profile, "riskProfile").and_then(|profile| {
        let risk_profile = profile.parse::<RiskProfile>()?;
        let age = required(payload.age, "age")?;
        debug!(?risk_profile, age, "recommending allocation");
        Ok(recommend_allocation(risk_profile, age))
    });
    respond("invest/allocation", result)
}

async fn score_handler(payload: Result<Json<ScorePayload>, JsonRejection>) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = payload.into_snapshot().map(|snapshot| {
        debug!(
            monthly_income = snapshot.monthly_income,
            goals = snapshot.goals.len(),
            "computing FinCA score"
        );
        compute_score(&snapshot)
    });
    respond("score", result)
}

async fn fd_vs_debt_fund_handler(
    State(policy): State<SharedPolicy>,
    payload: Result<Json<FdVsDebtFundPayload>, JsonRejection>,
) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = fd_vs_debt_fund_from_payload(payload, &policy);
    respond("compare/fd-vs-debt-fund", result)
}

fn fd_vs_debt_fund_from_payload(
    payload: FdVsDebtFundPayload,
    policy: &FiscalPolicy,
) -> EngineResult<FdVsDebtFundComparison> {
    let principal = required(payload.principal, "principal")?;
    let months = required(payload.months, "months")?;
    let fd_rate_pct = required(payload.fd_rate_pct, "fdRatePct")?;
    let debt_fund_return_pct = required(payload.debt_fund_return_pct, "debtFundReturnPct")?;

    match (payload.tax_bracket_pct, payload.annual_income) {
        (Some(slab_rate_pct), _) => {
            debug!(principal, months, slab_rate_pct, "comparing FD against debt fund");
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
        (None, Some(annual_income)) => {
            let regime = required(payload.regime, "regime")?.parse::<TaxRegime>()?;
            debug!(
                principal,
                months,
                annual_income,
                %regime,
                "comparing FD against debt fund"
            );
            compare_fd_vs_debt_fund_for_income(
                principal,
                months,
                regime,
                annual_income,
                fd_rate_pct,
                debt_fund_return_pct,
                policy,
            )
        }
        (None, None) => Err(EngineError::invalid("taxBracketPct", "is required")),
    }
}

async fn emi_trap_handler(
    State(policy): State<SharedPolicy>,
    payload: Result<Json<EmiTrapPayload>, JsonRejection>,
) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = payload.into_input().and_then(|input| {
        debug!(
            purchase_amount = input.purchase_amount,
            annual_rate_pct = input.annual_rate_pct,
            tenure_months = input.tenure_months,
            "pricing card EMI conversion"
        );
        emi_trap_cost(&input, &policy)
    });
    respond("compare/emi-trap", result)
}

async fn salary_handler(
    State(policy): State<SharedPolicy>,
    payload: Result<Json<SalaryPayload>, JsonRejection>,
) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = payload.into_structure().and_then(|structure| {
        debug!(
            ctc = structure.ctc,
            basic_pct = structure.basic_pct,
            regime = %structure.regime,
            "breaking up salary"
        );
        salary_breakup(&structure, &policy)
    });
    respond("salary/breakup", result)
}

async fn card_benefit_handler(
    payload: Result<Json<CardPortfolioPayload>, JsonRejection>,
) -> Response {
    let payload = match accept(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let result = payload.into_cards().and_then(|cards| {
        debug!(cards = cards.len(), "summarising card cashback");
        card_portfolio_benefit(&cards)
    });
    respond("cards/benefit", result)
}

fn required<T>(value: Option<T>, field: &'static str) -> EngineResult<T> {
    value.ok_or_else(|| EngineError::invalid(field, "is required"))
}

fn accept<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match payload {
        Ok(Json(payload)) => Ok(payload),
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "rejected request body");
            Err(error_response(rejection.status(), &rejection.body_text()))
        }
    }
}

fn respond<T: Serialize>(operation: &'static str, result: EngineResult<T>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => {
            warn!(operation, field = err.field(), %err, "rejected input");
            json_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: err.to_string(),
                    field: Some(err.field()),
                },
            )
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            field: None,
        },
    )
}
