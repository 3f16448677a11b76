use std::fmt;

use serde::{Deserialize, Serialize};

use super::shipment::{parse_dimensions, Dimensions};

/// Delivery urgency chosen for the shipment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Normal,
    Alta,
    Expressa,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Normal => "Normal",
            Urgency::Alta => "Alta",
            Urgency::Expressa => "Expressa",
        }
    }

    pub fn is_express(&self) -> bool {
        matches!(self, Urgency::Expressa)
    }
}

/// Calculation method for the base freight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Methodology {
    /// Less-than-truckload, consolidated with other shipments.
    #[default]
    Fracionada,
    /// Full truckload, dedicated vehicle.
    Lotacao,
    Container,
    /// Regulatory floor price entered through the ANTT calculator.
    Antt,
}

impl Methodology {
    pub fn label(&self) -> &'static str {
        match self {
            Methodology::Fracionada => "Fracionada",
            Methodology::Lotacao => "Lotação",
            Methodology::Container => "Container",
            Methodology::Antt => "ANTT",
        }
    }
}

impl fmt::Display for Methodology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cargo type declared on the shipment screen. Informational only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CargoType {
    Lotacao,
    #[default]
    Fracionada,
    Container,
}

impl CargoType {
    pub fn label(&self) -> &'static str {
        match self {
            CargoType::Lotacao => "Lotação",
            CargoType::Fracionada => "Fracionada",
            CargoType::Container => "Container",
        }
    }
}

/// Three-tier viability verdict for a quote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Excelente,
    #[default]
    #[serde(rename = "Viável")]
    Viavel,
    Recusar,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Excelente => "Excelente",
            Classification::Viavel => "Viável",
            Classification::Recusar => "Recusar",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Editable state of a quote draft.
///
/// Numeric fields are lenient on input: `null`, empty strings and text that
/// does not parse all read as `0`, so a half-filled form can always be priced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteFormInput {
    // Shipment data
    pub client: Option<String>,
    pub origin: Option<String>,
    pub origin_cep: Option<String>,
    pub destination: Option<String>,
    pub destination_cep: Option<String>,
    /// ICMS percent for the origin/destination state pair.
    #[serde(deserialize_with = "lenient_f64")]
    pub icms: f64,
    pub collection_date: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub items: u32,
    pub cargo_type: CargoType,
    /// Free-text "C x L x A" in cm. Used when the three numeric dimensions
    /// are unset.
    pub dimensions: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub dim_length: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub dim_width: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub dim_height: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub weight: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub distance: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub merchandise_value: f64,
    pub urgency: Urgency,

    // Calculation parameters
    pub use_ntc_table: bool,
    pub methodology: Methodology,
    pub apply_taxes_on_costs: bool,
    pub apply_markup: bool,
    #[serde(deserialize_with = "lenient_f64")]
    pub markup_percentage: f64,

    // Costs
    /// Manually entered base freight, used when the NTC table is off.
    #[serde(deserialize_with = "lenient_f64")]
    pub base_freight: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub loading_cost: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub equipment_cost: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub toll_cost: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub negotiated_freight: f64,
}

impl Default for QuoteFormInput {
    fn default() -> Self {
        Self {
            client: None,
            origin: None,
            origin_cep: None,
            destination: None,
            destination_cep: None,
            icms: 0.0,
            collection_date: None,
            items: 0,
            cargo_type: CargoType::Fracionada,
            dimensions: None,
            dim_length: 0.0,
            dim_width: 0.0,
            dim_height: 0.0,
            weight: 0.0,
            distance: 0.0,
            merchandise_value: 0.0,
            urgency: Urgency::Normal,
            use_ntc_table: true,
            methodology: Methodology::Fracionada,
            apply_taxes_on_costs: true,
            apply_markup: true,
            markup_percentage: 30.0,
            base_freight: 0.0,
            loading_cost: 0.0,
            equipment_cost: 0.0,
            toll_cost: 0.0,
            negotiated_freight: 0.0,
        }
    }
}

impl QuoteFormInput {
    /// Package dimensions for pricing: the numeric fields, or the parsed
    /// free-text field when all three are zero.
    pub fn package_dimensions(&self) -> Dimensions {
        let numeric = Dimensions {
            length: self.dim_length,
            width: self.dim_width,
            height: self.dim_height,
        };
        if numeric != Dimensions::default() {
            return numeric;
        }
        self.dimensions
            .as_deref()
            .and_then(parse_dimensions)
            .unwrap_or(numeric)
    }

    /// Short "Origin -> Destination" label using only the city part.
    pub fn route_label(&self) -> Option<String> {
        let origin = self.origin.as_deref()?;
        let destination = self.destination.as_deref()?;
        let city = |label: &str| label.split(',').next().unwrap_or(label).trim().to_string();
        Some(format!("{} -> {}", city(origin), city(destination)))
    }
}

/// Address resolved from a CEP (Brazilian postal code).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Eight digits, no separator.
    pub cep: String,
    pub street: Option<String>,
    pub district: Option<String>,
    pub city: String,
    /// Two-letter state code.
    pub state: String,
}

impl Address {
    /// "City, UF", the same shape as the city picker labels.
    pub fn label(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }

    /// CEP formatted as `00000-000`.
    pub fn formatted_cep(&self) -> String {
        if self.cep.len() == 8 && self.cep.bytes().all(|b| b.is_ascii_digit()) {
            format!("{}-{}", &self.cep[..5], &self.cep[5..])
        } else {
            self.cep.clone()
        }
    }
}

/// Physical quantities derived from dimensions and weight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentMeasures {
    /// m³
    pub cubage: f64,
    /// kg
    pub cubed_weight: f64,
    /// kg, the larger of real and cubed weight
    pub chargeable_weight: f64,
}

/// Snapshot of everything computed from a [`QuoteFormInput`].
///
/// Never edited directly; a new snapshot replaces the old one on each
/// recomputation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedQuoteState {
    pub cubage: f64,
    pub cubed_weight: f64,
    pub chargeable_weight: f64,
    pub recommended_methodology: Methodology,
    pub cost_fracionado: f64,
    pub cost_lotacao: f64,
    /// days
    pub time_fracionado: f64,
    /// days
    pub time_lotacao: f64,
    pub base_freight: f64,
    pub calculated_revenue: f64,
    pub total_costs: f64,
    /// percent
    pub gross_margin: f64,
    pub gross_margin_value: f64,
    pub classification: Classification,
    pub tax_cost: f64,
    pub operational_cost_total: f64,
}

impl DerivedQuoteState {
    /// Bit-level equality, so `NaN` snapshots still compare equal to themselves.
    pub fn is_identical(&self, other: &Self) -> bool {
        let numbers = |s: &Self| {
            [
                s.cubage,
                s.cubed_weight,
                s.chargeable_weight,
                s.cost_fracionado,
                s.cost_lotacao,
                s.time_fracionado,
                s.time_lotacao,
                s.base_freight,
                s.calculated_revenue,
                s.total_costs,
                s.gross_margin,
                s.gross_margin_value,
                s.tax_cost,
                s.operational_cost_total,
            ]
            .map(f64::to_bits)
        };

        self.recommended_methodology == other.recommended_methodology
            && self.classification == other.classification
            && numbers(self) == numbers(other)
    }
}

/// Parses a form number the way the quote form does: decimal comma allowed,
/// blanks and garbage read as zero.
pub fn parse_form_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| !value.is_nan())
        .unwrap_or(0.0)
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct FormNumber;

    impl<'de> serde::de::Visitor<'de> for FormNumber {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number, a numeric string or null")
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value as f64)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value as f64)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(parse_form_number(value))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(0.0)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(0.0)
        }
    }

    deserializer.deserialize_any(FormNumber)
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    Ok(if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_draft_defaults() {
        let input = QuoteFormInput::default();
        assert!(input.use_ntc_table);
        assert!(input.apply_markup);
        assert!(input.apply_taxes_on_costs);
        assert_eq!(input.markup_percentage, 30.0);
        assert_eq!(input.methodology, Methodology::Fracionada);
        assert_eq!(input.urgency, Urgency::Normal);
        assert_eq!(input.distance, 0.0);
    }

    #[test]
    fn lenient_numbers_from_host_json() {
        let input: QuoteFormInput = serde_json::from_str(
            r#"{
                "weight": "1500",
                "distance": null,
                "merchandiseValue": "",
                "dimLength": "120,5",
                "tollCost": "abc",
                "items": "3",
                "urgency": "expressa",
                "methodology": "lotacao"
            }"#,
        )
        .unwrap();

        assert_eq!(input.weight, 1500.0);
        assert_eq!(input.distance, 0.0);
        assert_eq!(input.merchandise_value, 0.0);
        assert_eq!(input.dim_length, 120.5);
        assert_eq!(input.toll_cost, 0.0);
        assert_eq!(input.items, 3);
        assert_eq!(input.urgency, Urgency::Expressa);
        assert_eq!(input.methodology, Methodology::Lotacao);
        // untouched fields keep draft defaults
        assert_eq!(input.markup_percentage, 30.0);
    }

    #[test]
    fn free_text_dimensions_and_cargo_type_are_kept() {
        let input: QuoteFormInput = serde_json::from_str(
            r#"{ "dimensions": "400x250x200", "weight": 500, "cargoType": "container" }"#,
        )
        .unwrap();
        assert_eq!(input.cargo_type, CargoType::Container);
        assert_eq!(input.dimensions.as_deref(), Some("400x250x200"));
        assert_eq!(
            input.package_dimensions(),
            Dimensions {
                length: 400.0,
                width: 250.0,
                height: 200.0
            }
        );

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["cargoType"], "container");
        assert_eq!(json["dimensions"], "400x250x200");
    }

    #[test]
    fn numeric_dimensions_win_over_text() {
        let input = QuoteFormInput {
            dim_length: 100.0,
            dim_width: 50.0,
            dim_height: 50.0,
            dimensions: Some("400x250x200".into()),
            ..QuoteFormInput::default()
        };
        assert_eq!(input.package_dimensions().cubage(), 0.25);

        let unparsable = QuoteFormInput {
            dimensions: Some("big box".into()),
            ..QuoteFormInput::default()
        };
        assert_eq!(unparsable.package_dimensions(), Dimensions::default());
    }

    #[test]
    fn classification_uses_portuguese_labels_on_the_wire() {
        let json = serde_json::to_string(&Classification::Viavel).unwrap();
        assert_eq!(json, "\"Viável\"");
        let parsed: Classification = serde_json::from_str("\"Recusar\"").unwrap();
        assert_eq!(parsed, Classification::Recusar);
    }

    #[test]
    fn route_label_keeps_city_only() {
        let input = QuoteFormInput {
            origin: Some("São Paulo, SP".into()),
            destination: Some("Curitiba, PR".into()),
            ..QuoteFormInput::default()
        };
        assert_eq!(input.route_label().as_deref(), Some("São Paulo -> Curitiba"));
        assert_eq!(QuoteFormInput::default().route_label(), None);
    }

    #[test]
    fn address_labels() {
        let address = Address {
            cep: "01001000".into(),
            street: Some("Praça da Sé".into()),
            district: Some("Sé".into()),
            city: "São Paulo".into(),
            state: "SP".into(),
        };
        assert_eq!(address.label(), "São Paulo, SP");
        assert_eq!(address.formatted_cep(), "01001-000");
    }

    #[test]
    fn identical_snapshots_tolerate_nan() {
        let state = DerivedQuoteState {
            gross_margin: f64::NAN,
            ..DerivedQuoteState::default()
        };
        assert!(state.is_identical(&state.clone()));
        assert_ne!(state, state.clone());
    }
}
