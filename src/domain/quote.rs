//! The full quote pipeline.
//!
//! `recompute` is the single entry point hosts call after any field of the
//! form changes. It is a pure function: identical inputs produce a
//! bit-identical [`DerivedQuoteState`].

use serde::{Deserialize, Serialize};

use super::entities::{DerivedQuoteState, QuoteFormInput};
use super::estimate::{
    estimate_full_truckload, estimate_less_than_truckload, transit_times, FtlEstimate, LtlEstimate,
};
use super::evaluation::{
    evaluate_viability, resolve_base_freight, ViabilityAssessment, ViabilityInputs,
};
use super::rates::PricingTable;
use super::recommendation::recommend_methodology;
use super::shipment::normalize;

/// Intermediate results kept for breakdown displays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBreakdown {
    pub derived: DerivedQuoteState,
    pub fracionado: LtlEstimate,
    pub lotacao: FtlEstimate,
    pub viability: ViabilityAssessment,
}

pub fn recompute(input: &QuoteFormInput, table: &PricingTable) -> DerivedQuoteState {
    price_quote(input, table).derived
}

/// Runs every stage and keeps the itemised estimates alongside the snapshot.
pub fn price_quote(input: &QuoteFormInput, table: &PricingTable) -> QuoteBreakdown {
    let measures = normalize(input.package_dimensions(), input.weight, &table.shipment);

    let recommended_methodology =
        recommend_methodology(&measures, input.urgency, &table.recommendation);

    let fracionado = estimate_less_than_truckload(
        measures.chargeable_weight,
        input.distance,
        input.merchandise_value,
        input.urgency,
        &table.less_than_truckload,
    );
    let lotacao = estimate_full_truckload(
        input.weight,
        measures.cubage,
        input.distance,
        input.urgency,
        &table.full_truckload,
    );
    let times = transit_times(input.distance, &table.transit);

    let base_freight = resolve_base_freight(
        input.use_ntc_table,
        input.methodology,
        input.base_freight,
        fracionado.total,
        lotacao.total,
    );
    let viability = evaluate_viability(base_freight, &ViabilityInputs::from(input), &table.viability);

    let derived = DerivedQuoteState {
        cubage: measures.cubage,
        cubed_weight: measures.cubed_weight,
        chargeable_weight: measures.chargeable_weight,
        recommended_methodology,
        cost_fracionado: fracionado.total,
        cost_lotacao: lotacao.total,
        time_fracionado: times.fracionado_days,
        time_lotacao: times.lotacao_days,
        base_freight,
        calculated_revenue: viability.revenue,
        total_costs: viability.total_costs,
        gross_margin: viability.margin_percent,
        gross_margin_value: viability.margin_value,
        classification: viability.classification,
        tax_cost: viability.tax_cost,
        operational_cost_total: viability.operational_costs,
    };

    QuoteBreakdown {
        derived,
        fracionado,
        lotacao,
        viability,
    }
}
