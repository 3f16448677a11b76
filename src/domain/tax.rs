//! Interstate ICMS rates.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IcmsRate {
    pub origin: String,
    pub destination: String,
    /// percent
    pub rate: f64,
}

impl IcmsRate {
    fn new(origin: &str, destination: &str, rate: f64) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            rate,
        }
    }
}

/// ICMS rates by origin/destination state, with fallbacks for pairs that are
/// not listed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcmsMatrix {
    pub rates: Vec<IcmsRate>,
    pub intrastate_default: f64,
    pub interstate_default: f64,
}

impl Default for IcmsMatrix {
    fn default() -> Self {
        let mut rates = Vec::new();
        for (origin, row) in [
            ("SP", [18.0, 12.0, 12.0, 12.0, 7.0]),
            ("RJ", [12.0, 20.0, 12.0, 12.0, 7.0]),
        ] {
            for (destination, rate) in ["SP", "RJ", "MG", "RS", "BA"].into_iter().zip(row) {
                rates.push(IcmsRate::new(origin, destination, rate));
            }
        }

        Self {
            rates,
            intrastate_default: 18.0,
            interstate_default: 12.0,
        }
    }
}

impl IcmsMatrix {
    /// Rate in percent for a pair of state codes (case-insensitive).
    pub fn rate(&self, origin_uf: &str, destination_uf: &str) -> f64 {
        let origin = origin_uf.trim();
        let destination = destination_uf.trim();

        self.rates
            .iter()
            .find(|entry| {
                entry.origin.eq_ignore_ascii_case(origin)
                    && entry.destination.eq_ignore_ascii_case(destination)
            })
            .map(|entry| entry.rate)
            .unwrap_or_else(|| {
                if origin.eq_ignore_ascii_case(destination) {
                    self.intrastate_default
                } else {
                    self.interstate_default
                }
            })
    }

    /// Rate for two "City, UF" labels. `None` when either has no state part.
    pub fn rate_for_labels(&self, origin: &str, destination: &str) -> Option<f64> {
        let origin_uf = state_from_label(origin)?;
        let destination_uf = state_from_label(destination)?;
        Some(self.rate(origin_uf, destination_uf))
    }
}

/// Extracts the state code from a "City, UF" label.
pub fn state_from_label(label: &str) -> Option<&str> {
    let (_, state) = label.rsplit_once(',')?;
    let state = state.trim();
    (state.len() == 2 && state.chars().all(|ch| ch.is_ascii_alphabetic())).then_some(state)
}

pub fn icms_amount(value: f64, rate_percent: f64) -> f64 {
    value * rate_percent / 100.0
}
