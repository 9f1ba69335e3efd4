use super::types::{PlanInputs, PlanSummary, YearlyRecord};

/// Flat capital-gains withholding applied to the growth-driven gap
/// (25% base rate plus 5.5% solidarity surcharge on it).
pub const TAX_RATE: f64 = 0.26375;

pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Element at `index`, or the last element once `index` runs past the end.
///
/// `values` must not be empty.
pub fn resolve(values: &[f64], index: usize) -> f64 {
    values[index.min(values.len() - 1)]
}

/// Projects a plan over `years` steps after the starting year.
///
/// Returns `years + 1` records: the starting position (contributions of the
/// first year already added, no growth yet) followed by one record per year.
/// Contributions are monthly amounts; growth rates are fractions and may go
/// down to `-1.0`. The gap between the invested and the uninvested balance is
/// taxed at [`TAX_RATE`] without clamping, so an underperforming year yields a
/// negative tax figure.
///
/// `start_year + years` must fit in an `i32`; [`PlanInputs::new`] enforces it.
pub fn compute_plan(
    years: u32,
    start_year: i32,
    start_capital: f64,
    contributions: &[f64],
    growth_rates: &[f64],
) -> Vec<YearlyRecord> {
    let first_contribution = resolve(contributions, 0);
    let opening = start_capital + MONTHS_PER_YEAR * first_contribution;

    let mut records = Vec::with_capacity(years as usize + 1);
    records.push(YearlyRecord {
        year: start_year,
        investment_per_month: first_contribution,
        gains: resolve(growth_rates, 0),
        with_investment: opening,
        without_investment: opening,
        tax: 0.0,
    });

    let mut with_investment = opening;
    let mut without_investment = opening;
    for step in 0..years {
        let index = step as usize;
        let contribution = resolve(contributions, index);
        let growth_rate = resolve(growth_rates, index);
        let yearly_contribution = MONTHS_PER_YEAR * contribution;

        without_investment += yearly_contribution;
        with_investment = (with_investment + yearly_contribution) * (1.0 + growth_rate);

        records.push(YearlyRecord {
            year: start_year + step as i32 + 1,
            investment_per_month: contribution,
            gains: growth_rate,
            with_investment,
            without_investment,
            tax: (with_investment - without_investment) * TAX_RATE,
        });
    }

    records
}

pub fn summarize(records: &[YearlyRecord]) -> Option<PlanSummary> {
    let last = records.last()?;
    Some(PlanSummary {
        final_year: last.year,
        final_value: last.with_investment,
        total_profit: last.with_investment - last.without_investment,
        total_tax: last.tax,
    })
}

impl PlanInputs {
    pub fn project(&self) -> Vec<YearlyRecord> {
        compute_plan(
            self.years(),
            self.start_year(),
            self.start_capital(),
            self.contributions(),
            self.growth_rates(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn resolve_returns_in_range_element() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(resolve(&values, 0), 1.0);
        assert_eq!(resolve(&values, 1), 2.0);
        assert_eq!(resolve(&values, 2), 3.0);
    }

    #[test]
    fn resolve_reuses_last_element_past_the_end() {
        let values = [1.0, 2.0];
        assert_eq!(resolve(&values, 2), 2.0);
        assert_eq!(resolve(&values, 50), 2.0);
        assert_eq!(resolve(&[7.5], usize::MAX), 7.5);
    }

    #[test]
    fn single_year_plan_matches_hand_computed_values() {
        let plan = compute_plan(1, 2024, 0.0, &[100.0], &[0.05]);
        assert_eq!(plan.len(), 2);

        let first = plan[0];
        assert_eq!(first.year, 2024);
        assert_approx(first.investment_per_month, 100.0);
        assert_approx(first.gains, 0.05);
        assert_approx(first.with_investment, 1_200.0);
        assert_approx(first.without_investment, 1_200.0);
        assert_eq!(first.tax, 0.0);

        let second = plan[1];
        assert_eq!(second.year, 2025);
        assert_approx(second.investment_per_month, 100.0);
        assert_approx(second.gains, 0.05);
        assert_approx(second.with_investment, 2_520.0);
        assert_approx(second.without_investment, 2_400.0);
        assert_approx(second.tax, 31.65);
    }

    #[test]
    fn last_contribution_and_rate_persist_beyond_their_rows() {
        let plan = compute_plan(3, 2024, 1_000.0, &[50.0, 100.0], &[0.1]);
        assert_eq!(plan.len(), 4);

        let per_month: Vec<f64> = plan.iter().map(|r| r.investment_per_month).collect();
        assert_eq!(per_month, vec![50.0, 50.0, 100.0, 100.0]);
        assert!(plan.iter().all(|r| r.gains == 0.1));

        assert_approx(plan[0].with_investment, 1_600.0);
        assert_approx(plan[1].with_investment, 2_420.0);
        assert_approx(plan[1].without_investment, 2_200.0);
        assert_approx(plan[2].with_investment, 3_982.0);
        assert_approx(plan[2].without_investment, 3_400.0);
        assert_approx(plan[3].with_investment, 5_700.2);
        assert_approx(plan[3].without_investment, 4_600.0);
        assert_approx(plan[3].tax, (5_700.2 - 4_600.0) * TAX_RATE);
    }

    #[test]
    fn total_loss_rate_wipes_invested_balance_and_taxes_negative() {
        let plan = compute_plan(3, 2030, 1_000.0, &[100.0], &[-1.0]);

        assert_approx(plan[0].with_investment, 2_200.0);
        for record in &plan[1..] {
            assert_eq!(record.with_investment, 0.0);
            assert!(record.tax < 0.0);
            assert_approx(record.tax, -record.without_investment * TAX_RATE);
        }
        assert_approx(plan[1].without_investment, 3_400.0);
        assert_approx(plan[1].tax, -896.75);
        assert_approx(plan[3].without_investment, 5_800.0);
    }

    #[test]
    fn zero_contributions_keep_baseline_flat_and_compound_capital() {
        let plan = compute_plan(2, 2024, 1_000.0, &[0.0], &[0.08]);

        for record in &plan {
            assert_approx(record.without_investment, 1_000.0);
        }
        assert_approx(plan[0].with_investment, 1_000.0);
        assert_approx(plan[1].with_investment, 1_080.0);
        assert_approx(plan[2].with_investment, 1_166.4);
        assert_approx(plan[2].tax, 166.4 * TAX_RATE);
    }

    #[test]
    fn zero_growth_keeps_both_balances_equal() {
        let plan = compute_plan(5, 2024, 500.0, &[10.0, 20.0], &[0.0]);
        for record in &plan {
            assert_approx(record.with_investment, record.without_investment);
            assert_approx(record.tax, 0.0);
        }
    }

    #[test]
    fn compute_plan_leaves_inputs_untouched() {
        let contributions = vec![100.0, 200.0];
        let rates = vec![0.05, -0.02, 0.07];
        let _ = compute_plan(10, 2024, 0.0, &contributions, &rates);
        assert_eq!(contributions, vec![100.0, 200.0]);
        assert_eq!(rates, vec![0.05, -0.02, 0.07]);
    }

    #[test]
    fn summarize_reads_final_record() {
        let plan = compute_plan(1, 2024, 0.0, &[100.0], &[0.05]);
        let summary = summarize(&plan).expect("non-empty plan");

        assert_eq!(summary.final_year, 2025);
        assert_approx(summary.final_value, 2_520.0);
        assert_approx(summary.total_profit, 120.0);
        assert_approx(summary.total_tax, 31.65);
    }

    #[test]
    fn summarize_empty_slice_is_none() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn validated_inputs_project_like_raw_call() {
        let inputs = PlanInputs::new(4, 2024, 250.0, vec![25.0, 75.0], vec![0.03, 0.06])
            .expect("valid inputs");
        assert_eq!(
            inputs.project(),
            compute_plan(4, 2024, 250.0, &[25.0, 75.0], &[0.03, 0.06])
        );
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_plan_shape_and_identities_hold(
            years in 1u32..60,
            start_year in 1900i32..2200,
            start_capital in 0u32..2_000_000,
            contributions in vec(0u32..10_000, 1..8),
            rate_bp in vec(-10_000i32..3_000, 1..8)
        ) {
            let contributions: Vec<f64> = contributions.into_iter().map(f64::from).collect();
            let rates: Vec<f64> = rate_bp.into_iter().map(|bp| f64::from(bp) / 10_000.0).collect();
            let start_capital = f64::from(start_capital);

            let plan = compute_plan(years, start_year, start_capital, &contributions, &rates);
            prop_assert_eq!(plan.len(), years as usize + 1);

            let opening = start_capital + 12.0 * contributions[0];
            prop_assert_eq!(plan[0].with_investment, opening);
            prop_assert_eq!(plan[0].without_investment, opening);
            prop_assert_eq!(plan[0].tax, 0.0);

            for (i, record) in plan.iter().enumerate() {
                prop_assert_eq!(record.year, start_year + i as i32);
            }

            for i in 1..plan.len() {
                let record = plan[i];
                let previous = plan[i - 1];
                let contribution = contributions[(i - 1).min(contributions.len() - 1)];
                let rate = rates[(i - 1).min(rates.len() - 1)];

                prop_assert_eq!(record.investment_per_month, contribution);
                prop_assert_eq!(record.gains, rate);
                prop_assert!(record.without_investment >= previous.without_investment);

                let expected_tax = (record.with_investment - record.without_investment) * TAX_RATE;
                let tol = 1e-9 * expected_tax.abs().max(1.0);
                assert_approx_tol(record.tax, expected_tax, tol);
            }
        }

        #[test]
        fn prop_repeated_runs_are_identical(
            years in 1u32..40,
            start_capital in 0u32..500_000,
            contributions in vec(0u32..5_000, 1..6),
            rate_bp in vec(-10_000i32..2_500, 1..6)
        ) {
            let contributions: Vec<f64> = contributions.into_iter().map(f64::from).collect();
            let rates: Vec<f64> = rate_bp.into_iter().map(|bp| f64::from(bp) / 10_000.0).collect();

            let first = compute_plan(years, 2024, f64::from(start_capital), &contributions, &rates);
            let second = compute_plan(
                years,
                2024,
                f64::from(start_capital),
                &contributions.clone(),
                &rates.clone(),
            );
            prop_assert_eq!(first, second);
        }
    }
}
