use super::entities::{Methodology, ShipmentMeasures, Urgency};
use super::rates::RecommendationRules;

/// Suggests between a dedicated truck and consolidated freight.
///
/// Advisory only: the chosen methodology on the quote is never changed.
/// Rules are checked in order and the first match wins.
pub fn recommend_methodology(
    measures: &ShipmentMeasures,
    urgency: Urgency,
    rules: &RecommendationRules,
) -> Methodology {
    if urgency.is_express() {
        Methodology::Lotacao
    } else if measures.chargeable_weight > rules.weight_above_kg {
        Methodology::Lotacao
    } else if measures.cubage > rules.cubage_above_m3 {
        Methodology::Lotacao
    } else {
        Methodology::Fracionada
    }
}
