use super::error::{EngineResult, require_non_negative};
use super::policy::{FiscalPolicy, Slab};
use super::types::{Deductions, RegimeComparison, TaxProfile, TaxRegime, TaxResult};

/// Progressive slab tax with cess and the Section 87A style rebate.
pub fn compute_tax(profile: &TaxProfile, policy: &FiscalPolicy) -> EngineResult<TaxResult> {
    let gross = require_non_negative("grossIncome", profile.gross_income)?;
    validate_deductions(&profile.deductions)?;

    let total_deductions = if profile.regime.allows_deductions() {
        capped_deductions(&profile.deductions, policy)
    } else {
        0.0
    };
    let taxable_income = (gross - total_deductions).max(0.0);

    let Levy {
        tax_before_cess,
        cess,
        rebate,
        final_tax,
    } = levy(taxable_income, profile.regime, policy);
    let effective_rate = if gross > 0.0 { final_tax / gross } else { 0.0 };

    Ok(TaxResult {
        regime: profile.regime,
        gross_income: gross,
        total_deductions,
        taxable_income,
        tax_before_cess,
        cess,
        rebate,
        final_tax,
        effective_rate,
    })
}

/// Slab tax, cess and rebate on an already-reduced taxable income.
pub(crate) struct Levy {
    pub tax_before_cess: f64,
    pub cess: f64,
    pub rebate: f64,
    pub final_tax: f64,
}

pub(crate) fn levy(taxable_income: f64, regime: TaxRegime, policy: &FiscalPolicy) -> Levy {
    let table = policy.regime(regime);
    let tax_before_cess = slab_tax(taxable_income, &table.slabs);
    let cess = tax_before_cess * policy.cess_rate;

    let rebate = if taxable_income <= table.rebate_income_limit {
        (tax_before_cess + cess).min(table.rebate_cap)
    } else {
        0.0
    };

    Levy {
        tax_before_cess,
        cess,
        rebate,
        final_tax: (tax_before_cess + cess - rebate).max(0.0),
    }
}

/// Tax under both regimes; ties go to the new (default) regime.
pub fn compare_regimes(
    gross_income: f64,
    deductions: &Deductions,
    policy: &FiscalPolicy,
) -> EngineResult<RegimeComparison> {
    let old_regime = compute_tax(
        &TaxProfile {
            gross_income,
            regime: TaxRegime::Old,
            deductions: *deductions,
        },
        policy,
    )?;
    let new_regime = compute_tax(
        &TaxProfile {
            gross_income,
            regime: TaxRegime::New,
            deductions: *deductions,
        },
        policy,
    )?;

    let recommended = if old_regime.final_tax < new_regime.final_tax {
        TaxRegime::Old
    } else {
        TaxRegime::New
    };

    Ok(RegimeComparison {
        savings: (old_regime.final_tax - new_regime.final_tax).abs(),
        old_regime,
        new_regime,
        recommended,
    })
}

/// Rate of the slab that `taxable_income` falls in. A value sitting exactly on
/// a bound belongs to the lower slab.
pub fn marginal_rate(
    regime: TaxRegime,
    taxable_income: f64,
    policy: &FiscalPolicy,
) -> EngineResult<f64> {
    let income = require_non_negative("taxableIncome", taxable_income)?;
    let slabs = &policy.regime(regime).slabs;
    let rate = slabs
        .iter()
        .find(|slab| income <= slab.upper())
        .or(slabs.last())
        .map(|slab| slab.rate)
        .unwrap_or(0.0);
    Ok(rate)
}

fn validate_deductions(deductions: &Deductions) -> EngineResult<()> {
    require_non_negative("section80C", deductions.section_80c)?;
    require_non_negative("section80D", deductions.section_80d)?;
    require_non_negative("hraExemption", deductions.hra_exemption)?;
    require_non_negative("homeLoanInterest", deductions.home_loan_interest)?;
    Ok(())
}

fn capped_deductions(deductions: &Deductions, policy: &FiscalPolicy) -> f64 {
    let caps = &policy.deduction_caps;
    deductions.section_80c.min(caps.section_80c)
        + deductions.section_80d.min(caps.section_80d)
        + deductions.hra_exemption
        + deductions.home_loan_interest.min(caps.home_loan_interest)
}

fn slab_tax(taxable_income: f64, slabs: &[Slab]) -> f64 {
    let mut tax = 0.0;
    let mut previous_bound = 0.0;
    for slab in slabs {
        if taxable_income <= previous_bound {
            break;
        }
        let upper = slab.upper();
        tax += (taxable_income.min(upper) - previous_bound) * slab.rate;
        previous_bound = upper;
    }
    tax
}

impl TaxProfile {
    /// Convenience constructor for a regime given as text, e.g. from a form.
    pub fn parse(gross_income: f64, regime: &str, deductions: Deductions) -> EngineResult<Self> {
        let regime = regime.parse::<TaxRegime>()?;
        Ok(TaxProfile {
            gross_income,
            regime,
            deductions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn profile(gross_income: f64, regime: TaxRegime, deductions: Deductions) -> TaxProfile {
        TaxProfile {
            gross_income,
            regime,
            deductions,
        }
    }

    fn policy() -> FiscalPolicy {
        FiscalPolicy::FY2024_25
    }

    #[test]
    fn new_regime_above_rebate_limit_pays_full_slab_tax() {
        let result = compute_tax(
            &profile(960_000.0, TaxRegime::New, Deductions::default()),
            &policy(),
        )
        .expect("valid profile");

        assert_approx(result.total_deductions, 0.0);
        assert_approx(result.taxable_income, 960_000.0);
        assert_approx(result.tax_before_cess, 54_000.0);
        assert_approx(result.cess, 2_160.0);
        assert_approx(result.rebate, 0.0);
        assert_approx(result.final_tax, 56_160.0);
        assert_approx(result.effective_rate, 56_160.0 / 960_000.0);
    }

    #[test]
    fn old_regime_applies_capped_deductions() {
        let deductions = Deductions {
            section_80c: 150_000.0,
            section_80d: 25_000.0,
            ..Deductions::default()
        };
        let result = compute_tax(&profile(960_000.0, TaxRegime::Old, deductions), &policy())
            .expect("valid profile");

        assert_approx(result.total_deductions, 175_000.0);
        assert_approx(result.taxable_income, 785_000.0);
        assert_approx(result.tax_before_cess, 69_500.0);
        assert_approx(result.cess, 2_780.0);
        assert_approx(result.final_tax, 72_280.0);
    }

    #[test]
    fn deductions_above_caps_are_clipped() {
        let deductions = Deductions {
            section_80c: 400_000.0,
            section_80d: 90_000.0,
            hra_exemption: 60_000.0,
            home_loan_interest: 350_000.0,
        };
        let result = compute_tax(
            &profile(2_000_000.0, TaxRegime::Old, deductions),
            &policy(),
        )
        .expect("valid profile");
        assert_approx(result.total_deductions, 150_000.0 + 50_000.0 + 60_000.0 + 200_000.0);
    }

    #[test]
    fn new_regime_ignores_deductions() {
        let deductions = Deductions {
            section_80c: 150_000.0,
            ..Deductions::default()
        };
        let result = compute_tax(&profile(1_000_000.0, TaxRegime::New, deductions), &policy())
            .expect("valid profile");
        assert_approx(result.total_deductions, 0.0);
        assert_approx(result.taxable_income, 1_000_000.0);
    }

    #[test]
    fn deductions_exceeding_income_floor_taxable_at_zero() {
        let deductions = Deductions {
            section_80c: 150_000.0,
            hra_exemption: 200_000.0,
            ..Deductions::default()
        };
        let result = compute_tax(&profile(300_000.0, TaxRegime::Old, deductions), &policy())
            .expect("valid profile");
        assert_approx(result.taxable_income, 0.0);
        assert_approx(result.final_tax, 0.0);
    }

    #[test]
    fn rebate_wipes_out_tax_at_limit() {
        let result = compute_tax(
            &profile(700_000.0, TaxRegime::New, Deductions::default()),
            &policy(),
        )
        .expect("valid profile");
        // 5% of 300k + 10% of 100k = 25_000, plus cess 1_000.
        assert_approx(result.tax_before_cess, 25_000.0);
        assert_approx(result.rebate, 25_000.0);
        assert_approx(result.final_tax, 1_000.0);
    }

    #[test]
    fn old_regime_rebate_is_capped_lower() {
        let result = compute_tax(
            &profile(600_000.0, TaxRegime::Old, Deductions::default()),
            &policy(),
        )
        .expect("valid profile");
        // 12_500 + 20_000 = 32_500 before cess; cess 1_300.
        assert_approx(result.tax_before_cess, 32_500.0);
        assert_approx(result.rebate, 12_500.0);
        assert_approx(result.final_tax, 33_800.0 - 12_500.0);
    }

    #[test]
    fn zero_income_has_zero_rate() {
        let result = compute_tax(&profile(0.0, TaxRegime::Old, Deductions::default()), &policy())
            .expect("valid profile");
        assert_approx(result.final_tax, 0.0);
        assert_approx(result.effective_rate, 0.0);
    }

    #[test]
    fn negative_income_is_rejected() {
        let err = compute_tax(
            &profile(-1.0, TaxRegime::New, Deductions::default()),
            &policy(),
        )
        .expect_err("must reject negative income");
        assert_eq!(err.field(), "grossIncome");
    }

    #[test]
    fn negative_deduction_is_rejected() {
        let deductions = Deductions {
            section_80d: -5.0,
            ..Deductions::default()
        };
        let err = compute_tax(&profile(500_000.0, TaxRegime::Old, deductions), &policy())
            .expect_err("must reject negative deduction");
        assert_eq!(err.field(), "section80D");
    }

    #[test]
    fn unknown_regime_string_is_rejected() {
        let err = TaxProfile::parse(500_000.0, "flat", Deductions::default())
            .expect_err("must reject unknown regime");
        assert_eq!(err.field(), "regime");
        let ok = TaxProfile::parse(500_000.0, " OLD ", Deductions::default()).expect("parse");
        assert_eq!(ok.regime, TaxRegime::Old);
    }

    #[test]
    fn compare_regimes_prefers_cheaper_regime() {
        let deductions = Deductions {
            section_80c: 150_000.0,
            section_80d: 25_000.0,
            ..Deductions::default()
        };
        let comparison = compare_regimes(960_000.0, &deductions, &policy()).expect("valid");
        assert_eq!(comparison.recommended, TaxRegime::New);
        assert_approx(comparison.savings, 72_280.0 - 56_160.0);

        let heavy = Deductions {
            section_80c: 150_000.0,
            section_80d: 50_000.0,
            hra_exemption: 300_000.0,
            home_loan_interest: 200_000.0,
        };
        let comparison = compare_regimes(1_500_000.0, &heavy, &policy()).expect("valid");
        assert_eq!(comparison.recommended, TaxRegime::Old);
        assert!(comparison.old_regime.final_tax < comparison.new_regime.final_tax);
    }

    #[test]
    fn marginal_rate_uses_lower_slab_on_boundary() {
        let p = policy();
        assert_approx(marginal_rate(TaxRegime::New, 600_000.0, &p).expect("rate"), 0.05);
        assert_approx(marginal_rate(TaxRegime::New, 600_001.0, &p).expect("rate"), 0.10);
        assert_approx(marginal_rate(TaxRegime::Old, 5_000_000.0, &p).expect("rate"), 0.30);
        assert_approx(marginal_rate(TaxRegime::Old, 0.0, &p).expect("rate"), 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_tax_is_monotone_in_income(
            income in 0u32..5_000_000,
            bump in 0u32..500_000,
            old in proptest::bool::ANY,
            section_80c in 0u32..200_000,
            section_80d in 0u32..80_000,
        ) {
            let regime = if old { TaxRegime::Old } else { TaxRegime::New };
            let deductions = Deductions {
                section_80c: section_80c as f64,
                section_80d: section_80d as f64,
                ..Deductions::default()
            };
            let low = compute_tax(&profile(income as f64, regime, deductions), &policy())
                .expect("valid");
            let high = compute_tax(&profile((income + bump) as f64, regime, deductions), &policy())
                .expect("valid");

            prop_assert!(low.final_tax >= 0.0);
            prop_assert!(high.final_tax + EPS >= low.final_tax);
            if low.taxable_income == 0.0 {
                prop_assert!(low.final_tax == 0.0);
            }
            let expected = (low.tax_before_cess + low.cess - low.rebate).max(0.0);
            prop_assert!((low.final_tax - expected).abs() <= EPS);
        }
    }
}
