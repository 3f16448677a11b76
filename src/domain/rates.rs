//! Pricing constants used by every stage of the quote pipeline.
//!
//! The defaults reproduce the NTC reference values and the flat composite tax
//! rate. Everything here is plain data so it can be stored as `pricing.json`
//! and edited without rebuilding.

use serde::{Deserialize, Serialize};

use super::antt::AnttRates;
use super::tax::IcmsMatrix;

/// Complete set of tunable pricing parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingTable {
    pub shipment: ShipmentRates,
    pub recommendation: RecommendationRules,
    pub less_than_truckload: LtlTariff,
    pub full_truckload: FtlTariff,
    pub transit: TransitRates,
    pub viability: ViabilityRates,
    pub antt: AnttRates,
    pub icms: IcmsMatrix,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipmentRates {
    /// kg per m³ used to turn cubage into cubed weight.
    pub volumetric_factor: f64,
}

impl Default for ShipmentRates {
    fn default() -> Self {
        Self {
            volumetric_factor: 300.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationRules {
    /// Chargeable weight (kg) above which a dedicated truck is recommended.
    pub weight_above_kg: f64,
    /// Cubage (m³) above which a dedicated truck is recommended.
    pub cubage_above_m3: f64,
}

impl Default for RecommendationRules {
    fn default() -> Self {
        Self {
            weight_above_kg: 3000.0,
            cubage_above_m3: 15.0,
        }
    }
}

/// Fractional-load (fracionada) tariff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LtlTariff {
    pub min_distance_km: f64,
    /// Currency per 100 kg per 100 km.
    pub weight_distance_rate: f64,
    pub dispatch_fee: f64,
    pub ad_valorem_rate: f64,
    pub gris_rate: f64,
    pub delivery_fee: f64,
    pub express_multiplier: f64,
}

impl Default for LtlTariff {
    fn default() -> Self {
        Self {
            min_distance_km: 50.0,
            weight_distance_rate: 45.0,
            dispatch_fee: 80.0,
            ad_valorem_rate: 0.003,
            gris_rate: 0.002,
            delivery_fee: 60.0,
            express_multiplier: 1.5,
        }
    }
}

/// One vehicle class of the full-truckload table.
///
/// A tier applies when the raw weight or the cubage strictly exceeds its
/// thresholds. Tiers are evaluated in order and the last match wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleTier {
    pub name: String,
    pub weight_above_kg: f64,
    pub cubage_above_m3: f64,
    /// Currency per km.
    pub rate_per_km: f64,
}

impl VehicleTier {
    fn new(name: &str, weight_above_kg: f64, cubage_above_m3: f64, rate_per_km: f64) -> Self {
        Self {
            name: name.to_string(),
            weight_above_kg,
            cubage_above_m3,
            rate_per_km,
        }
    }

    pub fn applies(&self, weight: f64, cubage: f64) -> bool {
        weight > self.weight_above_kg || cubage > self.cubage_above_m3
    }
}

/// Full-truckload (lotação) tariff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FtlTariff {
    pub base_vehicle: String,
    pub base_rate_per_km: f64,
    pub tiers: Vec<VehicleTier>,
    /// Regulatory floor for the per-km rate.
    pub min_rate_per_km: f64,
    pub long_haul_km: f64,
    /// Return-trip factor above `long_haul_km`.
    pub long_haul_factor: f64,
    pub short_haul_factor: f64,
    pub express_multiplier: f64,
}

impl Default for FtlTariff {
    fn default() -> Self {
        Self {
            base_vehicle: "Caminhão pequeno".to_string(),
            base_rate_per_km: 3.5,
            tiers: vec![
                VehicleTier::new("Caminhão médio", 3000.0, 15.0, 4.8),
                VehicleTier::new("Caminhão grande", 8000.0, 30.0, 6.5),
                VehicleTier::new("Carreta", 14000.0, 50.0, 8.5),
            ],
            min_rate_per_km: 3.2,
            long_haul_km: 400.0,
            long_haul_factor: 1.4,
            short_haul_factor: 1.8,
            express_multiplier: 1.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitRates {
    pub ltl_km_per_day: f64,
    /// Extra days for consolidation at the terminal.
    pub ltl_consolidation_days: f64,
    pub ftl_km_per_day: f64,
}

impl Default for TransitRates {
    fn default() -> Self {
        Self {
            ltl_km_per_day: 400.0,
            ltl_consolidation_days: 2.0,
            ftl_km_per_day: 700.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViabilityRates {
    /// Composite tax rate applied to revenue.
    pub tax_rate: f64,
    /// Margin percent at or above which a quote is excellent.
    pub excellent_margin_pct: f64,
    /// Margin percent below which a quote should be refused.
    pub refuse_below_margin_pct: f64,
}

impl Default for ViabilityRates {
    fn default() -> Self {
        Self {
            tax_rate: 0.1625,
            excellent_margin_pct: 25.0,
            refuse_below_margin_pct: 10.0,
        }
    }
}
