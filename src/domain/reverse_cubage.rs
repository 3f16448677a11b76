//! Estimates physical dimensions from a known volume.
//!
//! Useful when a customer only reports total m³: the result is a plausible
//! C x L x A that reproduces that volume.

use serde::{Deserialize, Serialize};

/// Common cargo shapes as length : width : height ratios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypicalProfile {
    Fitness,
    Pallet,
    Box,
    Appliance,
    Furniture,
}

impl TypicalProfile {
    pub fn ratio(&self) -> [f64; 3] {
        match self {
            TypicalProfile::Fitness => [2.0, 1.2, 1.0],
            TypicalProfile::Pallet => [1.2, 1.0, 1.0],
            TypicalProfile::Box => [1.5, 1.0, 0.8],
            TypicalProfile::Appliance => [1.3, 1.0, 1.2],
            TypicalProfile::Furniture => [1.8, 1.0, 1.0],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TypicalProfile::Fitness => "Equipamento Fitness",
            TypicalProfile::Pallet => "Palete Padrão",
            TypicalProfile::Box => "Caixa de Papelão",
            TypicalProfile::Appliance => "Eletrodoméstico",
            TypicalProfile::Furniture => "Móveis",
        }
    }
}

/// Specific gym equipment shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentProfile {
    Abductor,
    Abdominal,
    LegPress,
    LatPulldown,
    Rowing,
    BenchPress,
    ExerciseBike,
    Treadmill,
}

impl EquipmentProfile {
    pub fn ratio(&self) -> [f64; 3] {
        match self {
            EquipmentProfile::Abductor => [1.8, 1.0, 1.4],
            EquipmentProfile::Abdominal => [1.5, 1.0, 1.2],
            EquipmentProfile::LegPress => [2.2, 1.2, 1.0],
            EquipmentProfile::LatPulldown => [2.0, 1.0, 1.8],
            EquipmentProfile::Rowing => [2.0, 1.1, 1.3],
            EquipmentProfile::BenchPress => [2.0, 1.5, 1.2],
            EquipmentProfile::ExerciseBike => [1.2, 0.6, 1.3],
            EquipmentProfile::Treadmill => [2.2, 0.9, 1.4],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EquipmentProfile::Abductor => "Abdutor/Adução",
            EquipmentProfile::Abdominal => "Abdominal",
            EquipmentProfile::LegPress => "Leg Press",
            EquipmentProfile::LatPulldown => "Puxador Alto",
            EquipmentProfile::Rowing => "Remada",
            EquipmentProfile::BenchPress => "Supino",
            EquipmentProfile::ExerciseBike => "Bicicleta Erg.",
            EquipmentProfile::Treadmill => "Esteira",
        }
    }
}

/// Length:width ratio of the base when the height is known.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "1.2:1")]
    Light,
    #[default]
    #[serde(rename = "1.5:1")]
    Medium,
    #[serde(rename = "2:1")]
    Long,
}

impl BaseRatio {
    pub fn value(&self) -> f64 {
        match self {
            BaseRatio::Square => 1.0,
            BaseRatio::Light => 1.2,
            BaseRatio::Medium => 1.5,
            BaseRatio::Long => 2.0,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1:1" => Some(BaseRatio::Square),
            "1.2:1" => Some(BaseRatio::Light),
            "1.5:1" => Some(BaseRatio::Medium),
            "2:1" => Some(BaseRatio::Long),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EstimationMethod {
    /// A cube.
    Equivalent,
    Typical(TypicalProfile),
    Equipment(EquipmentProfile),
    /// Known height in metres, base proportions from the ratio.
    FixedHeight { height: f64, ratio: BaseRatio },
}

/// Estimated dimensions in metres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimatedDimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub recalculated_volume: f64,
}

/// Deviation above which an estimate no longer reproduces the volume.
pub const MAX_CONSISTENT_DEVIATION_PCT: f64 = 5.0;

impl EstimatedDimensions {
    fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
            recalculated_volume: length * width * height,
        }
    }

    /// Relative difference between the recalculated and original volume.
    pub fn deviation_percent(&self, volume: f64) -> f64 {
        (volume - self.recalculated_volume).abs() / volume * 100.0
    }

    pub fn is_consistent(&self, volume: f64) -> bool {
        self.deviation_percent(volume) < MAX_CONSISTENT_DEVIATION_PCT
    }

    /// "C x L x A" text in metres (2 decimals) or centimetres (no decimals).
    pub fn format(&self, in_cm: bool) -> String {
        let fmt = |value: f64| {
            if in_cm {
                format!("{:.0} cm", value * 100.0)
            } else {
                format!("{value:.2} m")
            }
        };
        format!(
            "{} x {} x {}",
            fmt(self.length),
            fmt(self.width),
            fmt(self.height)
        )
    }
}

/// `None` for a non-positive volume or a non-positive fixed height.
pub fn estimate_dimensions(volume: f64, method: EstimationMethod) -> Option<EstimatedDimensions> {
    if volume.is_nan() || volume <= 0.0 {
        return None;
    }

    let dims = match method {
        EstimationMethod::Equivalent => {
            let side = volume.cbrt();
            EstimatedDimensions::new(side, side, side)
        }
        EstimationMethod::Typical(profile) => from_ratio(volume, profile.ratio()),
        EstimationMethod::Equipment(profile) => from_ratio(volume, profile.ratio()),
        EstimationMethod::FixedHeight { height, ratio } => {
            if height.is_nan() || height <= 0.0 {
                return None;
            }
            let base_area = volume / height;
            let width = (base_area / ratio.value()).sqrt();
            EstimatedDimensions::new(ratio.value() * width, width, height)
        }
    };

    Some(dims)
}

fn from_ratio(volume: f64, [r_length, r_width, r_height]: [f64; 3]) -> EstimatedDimensions {
    let k = (volume / (r_length * r_width * r_height)).cbrt();
    EstimatedDimensions::new(r_length * k, r_width * k, r_height * k)
}
