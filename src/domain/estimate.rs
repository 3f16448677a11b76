//! Cost estimates for the two freight modes.
//!
//! Both estimates are always produced so the quote screen can compare them,
//! whatever methodology is active. Neither reads the other's result.

use serde::{Deserialize, Serialize};

use super::entities::Urgency;
use super::rates::{FtlTariff, LtlTariff, TransitRates};

/// Itemised fractional-load (fracionada) estimate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LtlEstimate {
    /// Weight x distance tariff including the dispatch fee.
    pub base_tariff: f64,
    pub ad_valorem: f64,
    pub gris: f64,
    pub delivery_fee: f64,
    /// Multiplier applied for express delivery (1.0 otherwise).
    pub urgency_factor: f64,
    pub total: f64,
}

/// Fractional-load estimate.
///
/// The distance is floored at `tariff.min_distance_km` so short hauls are not
/// underpriced.
pub fn estimate_less_than_truckload(
    chargeable_weight: f64,
    distance: f64,
    merchandise_value: f64,
    urgency: Urgency,
    tariff: &LtlTariff,
) -> LtlEstimate {
    let billed_distance = distance.max(tariff.min_distance_km);
    let base_tariff = (chargeable_weight / 100.0) * (billed_distance / 100.0)
        * tariff.weight_distance_rate
        + tariff.dispatch_fee;
    let ad_valorem = merchandise_value * tariff.ad_valorem_rate;
    let gris = merchandise_value * tariff.gris_rate;

    let urgency_factor = if urgency.is_express() {
        tariff.express_multiplier
    } else {
        1.0
    };
    let total = (base_tariff + ad_valorem + gris + tariff.delivery_fee) * urgency_factor;

    LtlEstimate {
        base_tariff,
        ad_valorem,
        gris,
        delivery_fee: tariff.delivery_fee,
        urgency_factor,
        total,
    }
}

/// Full-truckload (lotação) estimate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FtlEstimate {
    pub vehicle: String,
    pub rate_per_km: f64,
    /// distance x rate, before the return-trip factor
    pub line_haul: f64,
    pub return_factor: f64,
    pub urgency_factor: f64,
    pub total: f64,
}

/// Picks the vehicle tier and its per-km rate.
///
/// Uses the real `weight`, not the chargeable weight the recommender uses.
/// Every matching tier overrides the previous one, then the regulatory floor
/// is applied.
pub fn select_vehicle(weight: f64, cubage: f64, tariff: &FtlTariff) -> (String, f64) {
    let (name, rate) = tariff
        .tiers
        .iter()
        .rev()
        .find(|tier| tier.applies(weight, cubage))
        .map(|tier| (tier.name.clone(), tier.rate_per_km))
        .unwrap_or_else(|| (tariff.base_vehicle.clone(), tariff.base_rate_per_km));

    (name, rate.max(tariff.min_rate_per_km))
}

/// Full-truckload estimate for a dedicated vehicle.
pub fn estimate_full_truckload(
    weight: f64,
    cubage: f64,
    distance: f64,
    urgency: Urgency,
    tariff: &FtlTariff,
) -> FtlEstimate {
    let (vehicle, rate_per_km) = select_vehicle(weight, cubage, tariff);
    let line_haul = distance * rate_per_km;
    let return_factor = if distance > tariff.long_haul_km {
        tariff.long_haul_factor
    } else {
        tariff.short_haul_factor
    };

    let urgency_factor = if urgency.is_express() {
        tariff.express_multiplier
    } else {
        1.0
    };
    let total = line_haul * return_factor * urgency_factor;

    FtlEstimate {
        vehicle,
        rate_per_km,
        line_haul,
        return_factor,
        urgency_factor,
        total,
    }
}

/// Estimated delivery days for both modes. Informational only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitTimes {
    pub fracionado_days: f64,
    pub lotacao_days: f64,
}

pub fn transit_times(distance: f64, rates: &TransitRates) -> TransitTimes {
    TransitTimes {
        fracionado_days: (distance / rates.ltl_km_per_day).ceil() + rates.ltl_consolidation_days,
        lotacao_days: (distance / rates.ftl_km_per_day).ceil(),
    }
}
