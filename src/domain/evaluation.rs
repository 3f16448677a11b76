use serde::{Deserialize, Serialize};

use super::entities::{Classification, Methodology, QuoteFormInput};
use super::rates::ViabilityRates;

/// Pricing parameters read by the viability evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViabilityInputs {
    pub loading_cost: f64,
    pub equipment_cost: f64,
    pub toll_cost: f64,
    pub apply_taxes_on_costs: bool,
    pub apply_markup: bool,
    pub markup_percentage: f64,
    pub negotiated_freight: f64,
}

impl From<&QuoteFormInput> for ViabilityInputs {
    fn from(input: &QuoteFormInput) -> Self {
        Self {
            loading_cost: input.loading_cost,
            equipment_cost: input.equipment_cost,
            toll_cost: input.toll_cost,
            apply_taxes_on_costs: input.apply_taxes_on_costs,
            apply_markup: input.apply_markup,
            markup_percentage: input.markup_percentage,
            negotiated_freight: input.negotiated_freight,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViabilityAssessment {
    pub operational_costs: f64,
    /// Amount the markup was applied to; zero with a negotiated price.
    pub cost_base: f64,
    pub revenue: f64,
    pub tax_cost: f64,
    pub total_costs: f64,
    pub margin_value: f64,
    pub margin_percent: f64,
    pub classification: Classification,
}

impl ViabilityAssessment {
    /// Share of revenue consumed by costs, in percent. Zero without revenue.
    pub fn cost_revenue_ratio(&self) -> f64 {
        if self.revenue > 0.0 {
            self.total_costs / self.revenue * 100.0
        } else {
            0.0
        }
    }
}

/// Picks the base freight the evaluation runs on.
///
/// With the NTC table enabled the estimate for the active methodology wins
/// over anything typed by hand. Container loads travel as dedicated trucks;
/// ANTT prices are always entered through the ANTT calculator, so they keep
/// the manual value.
pub fn resolve_base_freight(
    use_ntc_table: bool,
    methodology: Methodology,
    manual_base_freight: f64,
    cost_fracionado: f64,
    cost_lotacao: f64,
) -> f64 {
    if !use_ntc_table {
        return manual_base_freight;
    }

    match methodology {
        Methodology::Fracionada => cost_fracionado,
        Methodology::Lotacao | Methodology::Container => cost_lotacao,
        Methodology::Antt => manual_base_freight,
    }
}

/// Revenue, taxes and margin for a base freight.
///
/// Total over every numeric input: a quote without revenue has a margin of
/// zero rather than `NaN`.
pub fn evaluate_viability(
    base_freight: f64,
    inputs: &ViabilityInputs,
    rates: &ViabilityRates,
) -> ViabilityAssessment {
    let operational_costs = inputs.loading_cost + inputs.equipment_cost + inputs.toll_cost;

    let (cost_base, revenue) = if inputs.apply_markup {
        let cost_base = base_freight
            + if inputs.apply_taxes_on_costs {
                operational_costs
            } else {
                0.0
            };
        (cost_base, cost_base * (1.0 + inputs.markup_percentage / 100.0))
    } else {
        (0.0, inputs.negotiated_freight)
    };

    let tax_cost = revenue * rates.tax_rate;
    let total_costs = base_freight + operational_costs + tax_cost;
    let margin_value = revenue - total_costs;
    let margin_percent = if revenue > 0.0 {
        (margin_value / revenue) * 100.0
    } else {
        0.0
    };

    ViabilityAssessment {
        operational_costs,
        cost_base,
        revenue,
        tax_cost,
        total_costs,
        margin_value,
        margin_percent,
        classification: classify(margin_percent, rates),
    }
}

pub fn classify(margin_percent: f64, rates: &ViabilityRates) -> Classification {
    if margin_percent >= rates.excellent_margin_pct {
        Classification::Excelente
    } else if margin_percent < rates.refuse_below_margin_pct {
        Classification::Recusar
    } else {
        Classification::Viavel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn markup_inputs() -> ViabilityInputs {
        ViabilityInputs {
            loading_cost: 100.0,
            equipment_cost: 50.0,
            toll_cost: 50.0,
            apply_taxes_on_costs: true,
            apply_markup: true,
            markup_percentage: 30.0,
            negotiated_freight: 0.0,
        }
    }

    #[test]
    fn markup_reference_quote_is_refused() {
        let result = evaluate_viability(2000.0, &markup_inputs(), &ViabilityRates::default());
        assert_eq!(result.operational_costs, 200.0);
        assert_eq!(result.cost_base, 2200.0);
        assert_close(result.revenue, 2860.0);
        assert_close(result.tax_cost, 464.75);
        assert_close(result.total_costs, 2664.75);
        assert_close(result.margin_value, 195.25);
        assert!((result.margin_percent - 6.8269).abs() < 1e-3);
        assert_eq!(result.classification, Classification::Recusar);
    }

    #[test]
    fn operational_costs_left_out_of_markup_base() {
        let inputs = ViabilityInputs {
            apply_taxes_on_costs: false,
            ..markup_inputs()
        };
        let result = evaluate_viability(2000.0, &inputs, &ViabilityRates::default());
        assert_eq!(result.cost_base, 2000.0);
        assert_close(result.revenue, 2600.0);
        // costs still count against the margin
        assert_close(result.total_costs, 2000.0 + 200.0 + 2600.0 * 0.1625);
    }

    #[test]
    fn negotiated_price_bypasses_markup() {
        let inputs = ViabilityInputs {
            apply_markup: false,
            negotiated_freight: 5000.0,
            markup_percentage: 999.0,
            ..markup_inputs()
        };
        for base in [0.0, 1234.0, 99_999.0] {
            let result = evaluate_viability(base, &inputs, &ViabilityRates::default());
            assert_eq!(result.revenue, 5000.0);
            assert_eq!(result.cost_base, 0.0);
        }
    }

    #[test]
    fn zero_revenue_has_zero_margin() {
        let inputs = ViabilityInputs {
            apply_markup: false,
            negotiated_freight: 0.0,
            ..markup_inputs()
        };
        let result = evaluate_viability(1500.0, &inputs, &ViabilityRates::default());
        assert_eq!(result.revenue, 0.0);
        assert_eq!(result.margin_percent, 0.0);
        assert!(!result.margin_percent.is_nan());
        assert_eq!(result.margin_value, -1700.0);
        assert_eq!(result.classification, Classification::Recusar);
        assert_eq!(result.cost_revenue_ratio(), 0.0);
    }

    #[test]
    fn negative_revenue_is_not_rejected() {
        let inputs = ViabilityInputs {
            apply_markup: false,
            negotiated_freight: -100.0,
            ..markup_inputs()
        };
        let result = evaluate_viability(0.0, &inputs, &ViabilityRates::default());
        assert_eq!(result.revenue, -100.0);
        assert_eq!(result.margin_percent, 0.0);
    }

    #[test]
    fn healthy_margin_is_excellent() {
        let inputs = ViabilityInputs {
            apply_markup: false,
            negotiated_freight: 10_000.0,
            ..ViabilityInputs::default()
        };
        let result = evaluate_viability(5000.0, &inputs, &ViabilityRates::default());
        // 10000 - 5000 - 1625 = 3375 -> 33.75 %
        assert_close(result.margin_percent, 33.75);
        assert_eq!(result.classification, Classification::Excelente);
        assert_close(result.cost_revenue_ratio(), 66.25);
    }

    #[test]
    fn classification_boundaries() {
        let rates = ViabilityRates::default();
        assert_eq!(classify(25.0, &rates), Classification::Excelente);
        assert_eq!(classify(24.999, &rates), Classification::Viavel);
        assert_eq!(classify(10.0, &rates), Classification::Viavel);
        assert_eq!(classify(9.999, &rates), Classification::Recusar);
        assert_eq!(classify(-40.0, &rates), Classification::Recusar);
    }

    #[test]
    fn base_freight_resolution() {
        let resolve = |ntc, methodology| resolve_base_freight(ntc, methodology, 700.0, 800.0, 900.0);
        assert_eq!(resolve(true, Methodology::Fracionada), 800.0);
        assert_eq!(resolve(true, Methodology::Lotacao), 900.0);
        assert_eq!(resolve(true, Methodology::Container), 900.0);
        assert_eq!(resolve(true, Methodology::Antt), 700.0);
        assert_eq!(resolve(false, Methodology::Fracionada), 700.0);
        assert_eq!(resolve(false, Methodology::Lotacao), 700.0);
    }
}
