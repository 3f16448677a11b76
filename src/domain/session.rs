//! Quote draft lifecycle: the form input, its latest derived snapshot and the
//! wizard position.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::entities::{Address, DerivedQuoteState, QuoteFormInput};
use super::quote::{price_quote, recompute, QuoteBreakdown};
use super::rates::PricingTable;
use super::tax::IcmsMatrix;

/// Screens of the quote wizard. Navigation only; the calculation ignores it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    #[default]
    ShipmentData,
    CalculationParams,
    ViabilityAnalysis,
    Review,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::ShipmentData => 1,
            WizardStep::CalculationParams => 2,
            WizardStep::ViabilityAnalysis => 3,
            WizardStep::Review => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::ShipmentData => "Dados do Embarque",
            WizardStep::CalculationParams => "Parâmetros de Cálculo",
            WizardStep::ViabilityAnalysis => "Análise de Viabilidade",
            WizardStep::Review => "Revisão",
        }
    }

    pub fn progress_percent(&self) -> u8 {
        self.number() * 25
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            WizardStep::ShipmentData => Some(WizardStep::CalculationParams),
            WizardStep::CalculationParams => Some(WizardStep::ViabilityAnalysis),
            WizardStep::ViabilityAnalysis => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    pub fn previous(&self) -> Option<Self> {
        match self {
            WizardStep::ShipmentData => None,
            WizardStep::CalculationParams => Some(WizardStep::ShipmentData),
            WizardStep::ViabilityAnalysis => Some(WizardStep::CalculationParams),
            WizardStep::Review => Some(WizardStep::ViabilityAnalysis),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Origin,
    Destination,
}

/// Problems that block submitting a quote. They never block pricing.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormIssue {
    #[error("client is required")]
    MissingClient,
    #[error("origin is required")]
    MissingOrigin,
    #[error("destination is required")]
    MissingDestination,
    #[error("gross weight must be greater than zero")]
    MissingWeight,
    #[error("markup is off; a negotiated freight is required")]
    NegotiatedFreightRequired,
}

pub fn validate_for_submission(input: &QuoteFormInput) -> Vec<FormIssue> {
    let blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());

    let mut issues = Vec::new();
    if blank(&input.client) {
        issues.push(FormIssue::MissingClient);
    }
    if blank(&input.origin) {
        issues.push(FormIssue::MissingOrigin);
    }
    if blank(&input.destination) {
        issues.push(FormIssue::MissingDestination);
    }
    if input.weight.is_nan() || input.weight <= 0.0 {
        issues.push(FormIssue::MissingWeight);
    }
    if !input.apply_markup && input.negotiated_freight == 0.0 {
        issues.push(FormIssue::NegotiatedFreightRequired);
    }
    issues
}

/// Sets `icms` from the origin/destination labels.
///
/// Leaves the last value in place while either side is unknown.
pub fn resolve_icms(input: &mut QuoteFormInput, matrix: &IcmsMatrix) {
    let (Some(origin), Some(destination)) = (input.origin.as_deref(), input.destination.as_deref())
    else {
        return;
    };
    if let Some(rate) = matrix.rate_for_labels(origin, destination) {
        input.icms = rate;
    }
}

/// Serialized form of a draft. The derived snapshot is rebuilt on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub id: Uuid,
    pub created_at: String,
    #[serde(default)]
    pub step: WizardStep,
    pub input: QuoteFormInput,
}

/// One quote being edited.
///
/// Every mutation goes through [`QuoteSession::update`], which recomputes the
/// snapshot and only swaps it when something actually changed.
#[derive(Clone, Debug)]
pub struct QuoteSession {
    id: Uuid,
    created_at: String,
    step: WizardStep,
    input: QuoteFormInput,
    derived: DerivedQuoteState,
    table: PricingTable,
}

impl QuoteSession {
    pub fn new(table: PricingTable) -> Self {
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        Self::from_draft(
            QuoteDraft {
                id: Uuid::new_v4(),
                created_at,
                step: WizardStep::default(),
                input: QuoteFormInput::default(),
            },
            table,
        )
    }

    /// Restores a saved draft, re-resolving ICMS against `table`.
    pub fn from_draft(draft: QuoteDraft, table: PricingTable) -> Self {
        let mut input = draft.input;
        resolve_icms(&mut input, &table.icms);
        let derived = recompute(&input, &table);
        Self {
            id: draft.id,
            created_at: draft.created_at,
            step: draft.step,
            input,
            derived,
            table,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn input(&self) -> &QuoteFormInput {
        &self.input
    }

    pub fn derived(&self) -> &DerivedQuoteState {
        &self.derived
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn table(&self) -> &PricingTable {
        &self.table
    }

    /// Applies a field change and recomputes. Returns whether the derived
    /// snapshot changed.
    pub fn update(&mut self, change: impl FnOnce(&mut QuoteFormInput)) -> bool {
        change(&mut self.input);
        resolve_icms(&mut self.input, &self.table.icms);
        self.refresh()
    }

    /// Fills origin or destination from a postal-code lookup.
    pub fn apply_address(&mut self, endpoint: Endpoint, address: &Address) -> bool {
        let label = address.label();
        let cep = address.formatted_cep();
        self.update(|input| match endpoint {
            Endpoint::Origin => {
                input.origin = Some(label);
                input.origin_cep = Some(cep);
            }
            Endpoint::Destination => {
                input.destination = Some(label);
                input.destination_cep = Some(cep);
            }
        })
    }

    pub fn set_table(&mut self, table: PricingTable) -> bool {
        self.table = table;
        resolve_icms(&mut self.input, &self.table.icms);
        self.refresh()
    }

    pub fn next_step(&mut self) -> WizardStep {
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        self.step
    }

    pub fn previous_step(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    pub fn breakdown(&self) -> QuoteBreakdown {
        price_quote(&self.input, &self.table)
    }

    pub fn validate(&self) -> Vec<FormIssue> {
        validate_for_submission(&self.input)
    }

    pub fn to_draft(&self) -> QuoteDraft {
        QuoteDraft {
            id: self.id,
            created_at: self.created_at.clone(),
            step: self.step,
            input: self.input.clone(),
        }
    }

    fn refresh(&mut self) -> bool {
        let next = recompute(&self.input, &self.table);
        if next.is_identical(&self.derived) {
            return false;
        }
        debug!(
            quote = %self.id,
            revenue = next.calculated_revenue,
            margin = next.gross_margin,
            classification = %next.classification,
            "quote recomputed"
        );
        self.derived = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Classification, Methodology};

    fn address(city: &str, state: &str, cep: &str) -> Address {
        Address {
            cep: cep.into(),
            street: None,
            district: None,
            city: city.into(),
            state: state.into(),
        }
    }

    #[test]
    fn new_session_is_priced() {
        let session = QuoteSession::new(PricingTable::default());
        assert_eq!(session.step(), WizardStep::ShipmentData);
        assert_eq!(
            *session.derived(),
            recompute(&QuoteFormInput::default(), &PricingTable::default())
        );
    }

    #[test]
    fn update_short_circuits_unchanged_results() {
        let mut session = QuoteSession::new(PricingTable::default());
        assert!(session.update(|input| input.weight = 1200.0));
        assert!(!session.update(|input| input.weight = 1200.0));
        // client name does not affect pricing
        assert!(!session.update(|input| input.client = Some("Agro Export".into())));
        assert!(session.update(|input| input.distance = 300.0));
    }

    #[test]
    fn addresses_resolve_icms() {
        let mut session = QuoteSession::new(PricingTable::default());
        session.apply_address(Endpoint::Origin, &address("São Paulo", "SP", "01001000"));
        assert_eq!(session.input().icms, 0.0);
        session.apply_address(Endpoint::Destination, &address("Salvador", "BA", "40020000"));
        assert_eq!(session.input().icms, 7.0);
        assert_eq!(session.input().origin.as_deref(), Some("São Paulo, SP"));
        assert_eq!(session.input().destination_cep.as_deref(), Some("40020-000"));
    }

    #[test]
    fn icms_keeps_last_value_when_a_side_is_unknown() {
        let mut input = QuoteFormInput {
            icms: 12.0,
            origin: Some("Curitiba, PR".into()),
            destination: Some("Somewhere".into()),
            ..QuoteFormInput::default()
        };
        resolve_icms(&mut input, &IcmsMatrix::default());
        assert_eq!(input.icms, 12.0);
    }

    #[test]
    fn wizard_navigation_is_bounded() {
        let mut session = QuoteSession::new(PricingTable::default());
        assert_eq!(session.previous_step(), WizardStep::ShipmentData);
        assert_eq!(session.next_step(), WizardStep::CalculationParams);
        session.next_step();
        assert_eq!(session.next_step(), WizardStep::Review);
        assert_eq!(session.next_step(), WizardStep::Review);
        assert_eq!(session.step().progress_percent(), 100);
    }

    #[test]
    fn wizard_step_does_not_change_pricing() {
        let mut session = QuoteSession::new(PricingTable::default());
        session.update(|input| input.weight = 800.0);
        let before = session.derived().clone();
        session.next_step();
        session.next_step();
        assert!(before.is_identical(session.derived()));
    }

    #[test]
    fn draft_roundtrip_rebuilds_snapshot() {
        let mut session = QuoteSession::new(PricingTable::default());
        session.update(|input| {
            input.weight = 2000.0;
            input.distance = 850.0;
            input.methodology = Methodology::Lotacao;
        });
        session.next_step();

        let json = serde_json::to_string(&session.to_draft()).unwrap();
        let draft: QuoteDraft = serde_json::from_str(&json).unwrap();
        let restored = QuoteSession::from_draft(draft, PricingTable::default());

        assert_eq!(restored.id(), session.id());
        assert_eq!(restored.step(), WizardStep::CalculationParams);
        assert!(restored.derived().is_identical(session.derived()));
    }

    #[test]
    fn restored_draft_uses_the_current_icms_matrix() {
        let draft = QuoteDraft {
            id: Uuid::new_v4(),
            created_at: "2024-05-01T12:00:00Z".into(),
            step: WizardStep::Review,
            input: QuoteFormInput {
                origin: Some("São Paulo, SP".into()),
                destination: Some("Salvador, BA".into()),
                icms: 12.0,
                ..QuoteFormInput::default()
            },
        };
        let session = QuoteSession::from_draft(draft, PricingTable::default());
        assert_eq!(session.input().icms, 7.0);
        assert_eq!(session.step(), WizardStep::Review);
    }

    #[test]
    fn new_table_reprices() {
        let mut session = QuoteSession::new(PricingTable::default());
        session.update(|input| {
            input.apply_markup = false;
            input.negotiated_freight = 1000.0;
            input.use_ntc_table = false;
            input.base_freight = 700.0;
        });
        // 1000 - 700 - 162.5 = 137.5 -> 13.75 %
        assert_eq!(session.derived().classification, Classification::Viavel);

        let mut table = PricingTable::default();
        table.viability.tax_rate = 0.25;
        assert!(session.set_table(table));
        assert_eq!(session.derived().classification, Classification::Recusar);
    }

    #[test]
    fn submission_checks() {
        let issues = validate_for_submission(&QuoteFormInput {
            apply_markup: false,
            ..QuoteFormInput::default()
        });
        assert_eq!(
            issues,
            vec![
                FormIssue::MissingClient,
                FormIssue::MissingOrigin,
                FormIssue::MissingDestination,
                FormIssue::MissingWeight,
                FormIssue::NegotiatedFreightRequired,
            ]
        );

        let complete = QuoteFormInput {
            client: Some("Tech Solutions SA".into()),
            origin: Some("São Paulo, SP".into()),
            destination: Some("Rio de Janeiro, RJ".into()),
            weight: 100.0,
            ..QuoteFormInput::default()
        };
        assert!(validate_for_submission(&complete).is_empty());
    }
}
