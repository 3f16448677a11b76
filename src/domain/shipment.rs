//! Shipment normalisation: cubage, cubed weight and chargeable weight.

use serde::{Deserialize, Serialize};

use super::entities::ShipmentMeasures;
use super::rates::ShipmentRates;

const CM3_PER_M3: f64 = 1_000_000.0;

/// Package dimensions in centimetres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn cubage(&self) -> f64 {
        (self.length * self.width * self.height) / CM3_PER_M3
    }
}

/// Derives the physical measures used by both pricing paths.
///
/// Zero or negative dimensions are not rejected; they simply flow through the
/// arithmetic.
pub fn normalize(dimensions: Dimensions, weight: f64, rates: &ShipmentRates) -> ShipmentMeasures {
    let cubage = dimensions.cubage();
    let cubed_weight = cubage * rates.volumetric_factor;
    ShipmentMeasures {
        cubage,
        cubed_weight,
        chargeable_weight: weight.max(cubed_weight),
    }
}

/// Parses the free-text "C x L x A" dimensions field (centimetres).
///
/// Accepts `x`, `X`, `×` or `*` as separators and a decimal comma. Anything
/// other than exactly three numbers yields `None`.
pub fn parse_dimensions(raw: &str) -> Option<Dimensions> {
    let parts: Vec<f64> = raw
        .split(|ch| matches!(ch, 'x' | 'X' | '×' | '*'))
        .map(|part| part.trim().replace(',', ".").parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;

    match parts.as_slice() {
        [length, width, height] if parts.iter().all(|v| v.is_finite()) => Some(Dimensions {
            length: *length,
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}
