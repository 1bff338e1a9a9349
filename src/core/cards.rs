use super::error::{EngineError, EngineResult, require_finite, require_non_negative};
use super::types::{CardPortfolioSummary, CreditCard};

/// Cashback earned across a card portfolio against the annual fees it costs.
/// The net benefit goes negative when fees outweigh cashback.
pub fn card_portfolio_benefit(cards: &[CreditCard]) -> EngineResult<CardPortfolioSummary> {
    let mut monthly_spend = 0.0;
    let mut monthly_cashback = 0.0;
    let mut annual_fees = 0.0;

    for card in cards {
        let spend = require_non_negative("cards.monthlySpend", card.monthly_spend)?;
        let rate = require_finite("cards.cashbackRatePct", card.cashback_rate_pct)?;
        if !(0.0..=100.0).contains(&rate) {
            return Err(EngineError::invalid(
                "cards.cashbackRatePct",
                "must be between 0 and 100",
            ));
        }
        let fee = require_non_negative("cards.annualFee", card.annual_fee)?;

        monthly_spend += spend;
        monthly_cashback += spend * rate / 100.0;
        annual_fees += fee;
    }

    let annual_cashback = monthly_cashback * 12.0;
    Ok(CardPortfolioSummary {
        card_count: cards.len(),
        monthly_spend,
        monthly_cashback,
        annual_cashback,
        annual_fees,
        net_annual_benefit: annual_cashback - annual_fees,
    })
}
