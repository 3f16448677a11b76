//! ANTT minimum freight (piso mínimo) calculator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{Methodology, QuoteFormInput};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnttCargoKind {
    #[default]
    General,
    Bulk,
    Refrigerated,
    Dangerous,
}

impl AnttCargoKind {
    pub fn label(&self) -> &'static str {
        match self {
            AnttCargoKind::General => "Carga Geral",
            AnttCargoKind::Bulk => "Granel",
            AnttCargoKind::Refrigerated => "Frigorificada",
            AnttCargoKind::Dangerous => "Perigosa",
        }
    }
}

/// Vehicle configuration by number of axles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxleConfig {
    Toco,
    Truck,
    Bitruck,
    Carreta,
    CarretaLs,
}

impl AxleConfig {
    pub const ALL: [AxleConfig; 5] = [
        AxleConfig::Toco,
        AxleConfig::Truck,
        AxleConfig::Bitruck,
        AxleConfig::Carreta,
        AxleConfig::CarretaLs,
    ];

    pub fn from_axles(axles: u8) -> Result<Self, AnttError> {
        Self::ALL
            .into_iter()
            .find(|config| config.axles() == axles)
            .ok_or(AnttError::UnsupportedAxles(axles))
    }

    pub fn axles(&self) -> u8 {
        match self {
            AxleConfig::Toco => 2,
            AxleConfig::Truck => 3,
            AxleConfig::Bitruck => 4,
            AxleConfig::Carreta => 5,
            AxleConfig::CarretaLs => 6,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AxleConfig::Toco => "Toco",
            AxleConfig::Truck => "Truck",
            AxleConfig::Bitruck => "Bitruck",
            AxleConfig::Carreta => "Carreta",
            AxleConfig::CarretaLs => "Carreta LS",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnttError {
    #[error("unsupported axle count {0}; expected 2 to 6")]
    UnsupportedAxles(u8),
}

/// Per-km, per-axle floor rates by cargo kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnttRates {
    pub general: f64,
    pub bulk: f64,
    pub refrigerated: f64,
    pub dangerous: f64,
}

impl Default for AnttRates {
    fn default() -> Self {
        Self {
            general: 1.5,
            bulk: 1.5,
            refrigerated: 1.8,
            dangerous: 2.0,
        }
    }
}

impl AnttRates {
    pub fn rate_for(&self, kind: AnttCargoKind) -> f64 {
        match kind {
            AnttCargoKind::General => self.general,
            AnttCargoKind::Bulk => self.bulk,
            AnttCargoKind::Refrigerated => self.refrigerated,
            AnttCargoKind::Dangerous => self.dangerous,
        }
    }
}

pub fn antt_minimum_freight(
    distance: f64,
    vehicle: AxleConfig,
    kind: AnttCargoKind,
    rates: &AnttRates,
) -> f64 {
    distance * f64::from(vehicle.axles()) * rates.rate_for(kind)
}

impl QuoteFormInput {
    /// Uses an ANTT floor as the quote's base freight.
    ///
    /// Turns the NTC table off so the value is not overridden by the
    /// estimator on the next recomputation.
    pub fn apply_antt_floor(&mut self, value: f64) {
        self.base_freight = value;
        self.use_ntc_table = false;
        self.methodology = Methodology::Antt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::recompute;
    use crate::domain::rates::PricingTable;

    #[test]
    fn floor_by_axles_and_cargo() {
        let rates = AnttRates::default();
        assert_eq!(
            antt_minimum_freight(500.0, AxleConfig::Toco, AnttCargoKind::General, &rates),
            1500.0
        );
        assert_eq!(
            antt_minimum_freight(500.0, AxleConfig::Carreta, AnttCargoKind::Dangerous, &rates),
            5000.0
        );
        assert_eq!(
            antt_minimum_freight(100.0, AxleConfig::Truck, AnttCargoKind::Refrigerated, &rates),
            100.0 * 3.0 * 1.8
        );
    }

    #[test]
    fn axle_counts() {
        assert_eq!(AxleConfig::from_axles(6), Ok(AxleConfig::CarretaLs));
        assert_eq!(AxleConfig::from_axles(1), Err(AnttError::UnsupportedAxles(1)));
        assert_eq!(AxleConfig::from_axles(7), Err(AnttError::UnsupportedAxles(7)));
    }

    #[test]
    fn applied_floor_survives_recompute() {
        let mut input = QuoteFormInput {
            weight: 2000.0,
            distance: 500.0,
            ..QuoteFormInput::default()
        };
        input.apply_antt_floor(1500.0);
        assert!(!input.use_ntc_table);
        assert_eq!(input.methodology, Methodology::Antt);

        let state = recompute(&input, &PricingTable::default());
        assert_eq!(state.base_freight, 1500.0);
    }
}
