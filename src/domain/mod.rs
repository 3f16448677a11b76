//! Freight pricing and viability logic lives here.

pub mod antt;
pub mod entities;
pub mod estimate;
pub mod evaluation;
pub mod quote;
pub mod rates;
pub mod recommendation;
pub mod reverse_cubage;
pub mod session;
pub mod shipment;
pub mod tax;

pub use antt::{antt_minimum_freight, AnttCargoKind, AnttError, AnttRates, AxleConfig};
pub use entities::{
    Address, CargoType, Classification, DerivedQuoteState, Methodology, QuoteFormInput,
    ShipmentMeasures, Urgency,
};
pub use estimate::{
    estimate_full_truckload, estimate_less_than_truckload, transit_times, FtlEstimate, LtlEstimate,
    TransitTimes,
};
pub use evaluation::{
    classify, evaluate_viability, resolve_base_freight, ViabilityAssessment, ViabilityInputs,
};
pub use quote::{price_quote, recompute, QuoteBreakdown};
pub use rates::PricingTable;
pub use recommendation::recommend_methodology;
pub use reverse_cubage::{estimate_dimensions, EstimatedDimensions, EstimationMethod};
pub use session::{
    validate_for_submission, Endpoint, FormIssue, QuoteDraft, QuoteSession, WizardStep,
};
pub use shipment::{normalize, Dimensions};
pub use tax::IcmsMatrix;
