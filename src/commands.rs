//! Command handlers for the `freight-quote` binary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use freight_quote::domain::antt::{antt_minimum_freight, AnttCargoKind, AnttError, AxleConfig};
use freight_quote::domain::reverse_cubage::{estimate_dimensions, EstimationMethod};
use freight_quote::domain::shipment::parse_dimensions;
use freight_quote::domain::tax::icms_amount;
use freight_quote::domain::{Endpoint, PricingTable, QuoteBreakdown, QuoteFormInput, QuoteSession};
use freight_quote::infra::cache::default_cache_path;
use freight_quote::infra::cep::{CacheStatus, CepClient, CepClientError};
use freight_quote::util::format::{brl, decimal, percent};
use freight_quote::util::persistence::{PersistError, Store};

use crate::cli::{
    AnttArgs, CepArgs, CubageArgs, CubageMethodArg, IcmsArgs, QuoteArgs, SettingsAction,
};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid quote JSON in {}: {source}", path.display())]
    InvalidInput {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid dimensions {0:?}; expected CxLxA in cm")]
    InvalidDimensions(String),
    #[error("--height is required for --method fixed-height")]
    MissingHeight,
    #[error("no estimate for a volume of {0} m³ with this method")]
    NoEstimate(f64),
    #[error(transparent)]
    Cep(#[from] CepClientError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Antt(#[from] AnttError),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

pub fn open_store(config_dir: Option<PathBuf>) -> Result<Store, CliError> {
    match config_dir {
        Some(dir) => Ok(Store::at(dir)),
        None => Ok(Store::locate()?),
    }
}

/// ViaCEP client. An explicit `--config-dir` also holds the address cache.
pub fn open_cep_client(store: &Store, custom_root: bool) -> Result<CepClient, CliError> {
    let cache_path = if custom_root {
        Some(store.cep_cache_path())
    } else {
        default_cache_path()
    };
    Ok(CepClient::new()?.with_disk_cache(cache_path))
}

/// Form input from the optional JSON file with flag overrides applied.
pub fn build_input(args: &QuoteArgs) -> Result<QuoteFormInput, CliError> {
    let mut input = match &args.input {
        Some(path) => read_input(path)?,
        None => QuoteFormInput::default(),
    };

    if let Some(client) = &args.client {
        input.client = Some(client.clone());
    }
    if let Some(origin) = &args.origin {
        input.origin = Some(origin.clone());
    }
    if let Some(destination) = &args.destination {
        input.destination = Some(destination.clone());
    }
    if let Some(date) = &args.collection_date {
        input.collection_date = Some(date.clone());
    }
    if let Some(items) = args.items {
        input.items = items;
    }
    if let Some(cargo_type) = args.cargo_type {
        input.cargo_type = cargo_type.into();
    }
    if let Some(raw) = &args.dimensions {
        let dims = parse_dimensions(raw).ok_or_else(|| CliError::InvalidDimensions(raw.clone()))?;
        input.dimensions = Some(raw.clone());
        input.dim_length = dims.length;
        input.dim_width = dims.width;
        input.dim_height = dims.height;
    }

    let numbers = [
        (args.weight, &mut input.weight),
        (args.distance, &mut input.distance),
        (args.merchandise_value, &mut input.merchandise_value),
        (args.base_freight, &mut input.base_freight),
        (args.loading_cost, &mut input.loading_cost),
        (args.equipment_cost, &mut input.equipment_cost),
        (args.toll_cost, &mut input.toll_cost),
        (args.markup, &mut input.markup_percentage),
    ];
    for (flag, field) in numbers {
        if let Some(value) = flag {
            *field = value;
        }
    }

    if let Some(urgency) = args.urgency {
        input.urgency = urgency.into();
    }
    if let Some(methodology) = args.methodology {
        input.methodology = methodology.into();
    }
    if args.manual_freight {
        input.use_ntc_table = false;
    }
    if args.no_taxes_on_costs {
        input.apply_taxes_on_costs = false;
    }
    if let Some(price) = args.negotiated_freight {
        input.apply_markup = false;
        input.negotiated_freight = price;
    }

    Ok(input)
}

fn read_input(path: &Path) -> Result<QuoteFormInput, CliError> {
    let data = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| CliError::InvalidInput {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteReport<'a> {
    id: Uuid,
    input: &'a QuoteFormInput,
    breakdown: QuoteBreakdown,
    cost_revenue_ratio: f64,
    issues: Vec<String>,
}

/// Prices a quote and returns the session it was priced in.
pub async fn run_quote(
    args: &QuoteArgs,
    store: &Store,
    cep: &CepClient,
) -> Result<QuoteSession, CliError> {
    let input = build_input(args)?;
    let mut session = QuoteSession::new(store.load_pricing_table());
    session.update(|draft| *draft = input);

    if args.origin_cep.is_some() || args.destination_cep.is_some() {
        resolve_ceps(args, cep, &mut session).await;
    }

    if let Some(axles) = args.antt_axles {
        let vehicle = AxleConfig::from_axles(axles)?;
        let floor = antt_minimum_freight(
            session.input().distance,
            vehicle,
            args.antt_cargo.into(),
            &session.table().antt,
        );
        info!(vehicle = vehicle.label(), floor, "applying ANTT floor");
        session.update(|draft| draft.apply_antt_floor(floor));
    }

    let breakdown = session.breakdown();
    let issues: Vec<String> = session.validate().iter().map(ToString::to_string).collect();

    if args.json {
        let report = QuoteReport {
            id: session.id(),
            input: session.input(),
            cost_revenue_ratio: breakdown.viability.cost_revenue_ratio(),
            breakdown,
            issues,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_quote(&session, &breakdown, &issues);
    }

    if args.save {
        let path = store.save_draft(&session.to_draft())?;
        if !args.json {
            println!("\nSaved draft to {}", path.display());
        }
    }

    Ok(session)
}

/// Fills origin/destination from CEPs. Failures keep whatever was typed.
async fn resolve_ceps(args: &QuoteArgs, client: &CepClient, session: &mut QuoteSession) {
    let lookups = [
        (Endpoint::Origin, args.origin_cep.as_deref()),
        (Endpoint::Destination, args.destination_cep.as_deref()),
    ];
    for (endpoint, cep) in lookups {
        let Some(cep) = cep else { continue };
        match client.lookup(cep).await {
            Ok(payload) => {
                if payload.status == CacheStatus::Stale {
                    warn!(cep, "using a stale cached address");
                }
                session.apply_address(endpoint, &payload.data);
            }
            Err(err) => warn!(cep, error = %err, ?endpoint, "CEP lookup failed; keeping typed value"),
        }
    }
}

fn print_quote(session: &QuoteSession, breakdown: &QuoteBreakdown, issues: &[String]) {
    let input = session.input();
    let derived = &breakdown.derived;
    let viability = &breakdown.viability;

    println!("Quote {}", session.id());
    if let Some(client) = &input.client {
        println!("  Client        {client}");
    }
    if let Some(route) = input.route_label() {
        println!("  Route         {route}  (ICMS {})", percent(input.icms));
    }
    println!(
        "  Cubage        {} m³  cubed {} kg  chargeable {} kg",
        decimal(derived.cubage, 3),
        decimal(derived.cubed_weight, 1),
        decimal(derived.chargeable_weight, 1)
    );
    println!(
        "  Recommended   {}  (cargo type {})",
        derived.recommended_methodology,
        input.cargo_type.label()
    );
    println!(
        "  Fracionada    {}  ~{} days",
        brl(derived.cost_fracionado),
        decimal(derived.time_fracionado, 1)
    );
    println!(
        "  Lotação       {}  ~{} days  ({})",
        brl(derived.cost_lotacao),
        decimal(derived.time_lotacao, 1),
        breakdown.lotacao.vehicle
    );
    println!(
        "  Base freight  {}  [{}{}]",
        brl(derived.base_freight),
        input.methodology,
        if input.use_ntc_table { ", NTC table" } else { ", manual" }
    );
    println!("  Op. costs     {}", brl(viability.operational_costs));
    println!("  Revenue       {}", brl(derived.calculated_revenue));
    println!("  Taxes         {}", brl(derived.tax_cost));
    println!(
        "  Total costs   {}  ({} of revenue)",
        brl(derived.total_costs),
        percent(viability.cost_revenue_ratio())
    );
    println!(
        "  Margin        {}  ({})  -> {}",
        brl(derived.gross_margin_value),
        percent(derived.gross_margin),
        derived.classification
    );

    if !issues.is_empty() {
        println!("\nNot ready to submit:");
        for issue in issues {
            println!("  - {issue}");
        }
    }
}

pub async fn run_cep(args: &CepArgs, client: &CepClient) -> Result<(), CliError> {
    let payload = client.lookup(&args.cep).await?;
    let address = &payload.data;

    println!("{}  {}", address.formatted_cep(), address.label());
    if let Some(street) = &address.street {
        println!("  {street}");
    }
    if let Some(district) = &address.district {
        println!("  {district}");
    }
    if payload.status == CacheStatus::Stale {
        println!("  (offline: cached result)");
    }
    Ok(())
}

pub fn run_antt(args: &AnttArgs, table: &PricingTable) -> Result<(), CliError> {
    let cargo: AnttCargoKind = args.cargo.into();
    let vehicles = match args.axles {
        Some(axles) => vec![AxleConfig::from_axles(axles)?],
        None => AxleConfig::ALL.to_vec(),
    };

    println!(
        "ANTT floor for {} km, {}",
        decimal(args.distance, 0),
        cargo.label()
    );
    for vehicle in vehicles {
        println!(
            "  {:<11} {} axles  {}",
            vehicle.label(),
            vehicle.axles(),
            brl(antt_minimum_freight(args.distance, vehicle, cargo, &table.antt))
        );
    }
    Ok(())
}

pub fn run_icms(args: &IcmsArgs, table: &PricingTable) {
    let rate = table.icms.rate(&args.origin, &args.destination);
    println!(
        "ICMS {} -> {}: {}",
        args.origin.to_ascii_uppercase(),
        args.destination.to_ascii_uppercase(),
        percent(rate)
    );
    if let Some(value) = args.value {
        println!("  on {}: {}", brl(value), brl(icms_amount(value, rate)));
    }
}

pub fn cubage_method(args: &CubageArgs) -> Result<EstimationMethod, CliError> {
    Ok(match args.method {
        CubageMethodArg::Equivalent => EstimationMethod::Equivalent,
        CubageMethodArg::Typical => EstimationMethod::Typical(args.profile.into()),
        CubageMethodArg::Equipment => EstimationMethod::Equipment(args.equipment.into()),
        CubageMethodArg::FixedHeight => EstimationMethod::FixedHeight {
            height: args.height.ok_or(CliError::MissingHeight)?,
            ratio: args.ratio,
        },
    })
}

pub fn run_cubage(args: &CubageArgs) -> Result<(), CliError> {
    let method = cubage_method(args)?;
    let dims = estimate_dimensions(args.volume, method).ok_or(CliError::NoEstimate(args.volume))?;

    println!("{}", dims.format(args.cm));
    println!(
        "  recalculated {} m³, deviation {}{}",
        decimal(dims.recalculated_volume, 3),
        percent(dims.deviation_percent(args.volume)),
        if dims.is_consistent(args.volume) {
            ""
        } else {
            " (inconsistent)"
        }
    );
    Ok(())
}

pub fn run_settings(action: &SettingsAction, store: &Store) -> Result<(), CliError> {
    match action {
        SettingsAction::Show => {
            let table = store.load_pricing_table();
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
        SettingsAction::Path => println!("{}", store.pricing_path().display()),
        SettingsAction::Init => {
            let path = store.save_pricing_table(&store.load_pricing_table())?;
            println!("Wrote {}", path.display());
        }
        SettingsAction::Reset => {
            store.reset_pricing_table()?;
            println!("Pricing table reset to defaults");
        }
    }
    Ok(())
}

pub fn run_drafts(store: &Store) -> Result<(), CliError> {
    let drafts = store.load_drafts()?;
    if drafts.is_empty() {
        println!("No saved drafts");
        return Ok(());
    }

    let table = store.load_pricing_table();
    for draft in drafts {
        let client = draft.input.client.clone().unwrap_or_else(|| "-".into());
        let route = draft.input.route_label().unwrap_or_else(|| "-".into());
        let step = draft.step.label();
        let id = draft.id;
        let created_at = draft.created_at.clone();
        let session = QuoteSession::from_draft(draft, table.clone());
        println!(
            "{id}  {created_at}  {client}  {route}  [{step}]  {}  {}",
            brl(session.derived().calculated_revenue),
            session.derived().classification
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{CargoTypeArg, EquipmentArg, MethodologyArg, ProfileArg, UrgencyArg};
    use freight_quote::domain::reverse_cubage::BaseRatio;
    use freight_quote::domain::{CargoType, Methodology, Urgency};

    fn offline_client() -> CepClient {
        CepClient::with_base_url("http://127.0.0.1:9/").unwrap()
    }

    fn cubage_args(method: CubageMethodArg) -> CubageArgs {
        CubageArgs {
            volume: 6.0,
            method,
            profile: ProfileArg::Pallet,
            equipment: EquipmentArg::Treadmill,
            height: None,
            ratio: BaseRatio::Medium,
            cm: false,
        }
    }

    #[test]
    fn flags_override_json_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote.json");
        fs::write(
            &path,
            r#"{ "client": "Agro Export", "weight": "800", "distance": 300, "methodology": "fracionada" }"#,
        )
        .unwrap();

        let args = QuoteArgs {
            input: Some(path),
            weight: Some(1500.0),
            dimensions: Some("120x80x60".into()),
            cargo_type: Some(CargoTypeArg::Lotacao),
            urgency: Some(UrgencyArg::Alta),
            methodology: Some(MethodologyArg::Lotacao),
            ..QuoteArgs::default()
        };
        let input = build_input(&args).unwrap();
        assert_eq!(input.client.as_deref(), Some("Agro Export"));
        assert_eq!(input.weight, 1500.0);
        assert_eq!(input.distance, 300.0);
        assert_eq!(input.dim_length, 120.0);
        assert_eq!(input.dim_height, 60.0);
        assert_eq!(input.dimensions.as_deref(), Some("120x80x60"));
        assert_eq!(input.cargo_type, CargoType::Lotacao);
        assert_eq!(input.urgency, Urgency::Alta);
        assert_eq!(input.methodology, Methodology::Lotacao);
        assert!(input.apply_markup);
    }

    #[test]
    fn negotiated_price_turns_markup_off() {
        let args = QuoteArgs {
            negotiated_freight: Some(5000.0),
            manual_freight: true,
            base_freight: Some(3000.0),
            ..QuoteArgs::default()
        };
        let input = build_input(&args).unwrap();
        assert!(!input.apply_markup);
        assert!(!input.use_ntc_table);
        assert_eq!(input.negotiated_freight, 5000.0);
        assert_eq!(input.base_freight, 3000.0);
    }

    #[test]
    fn bad_input_errors() {
        let args = QuoteArgs {
            dimensions: Some("120x80".into()),
            ..QuoteArgs::default()
        };
        assert!(matches!(build_input(&args), Err(CliError::InvalidDimensions(_))));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote.json");
        fs::write(&path, "[1, 2]").unwrap();
        let args = QuoteArgs {
            input: Some(path),
            ..QuoteArgs::default()
        };
        assert!(matches!(build_input(&args), Err(CliError::InvalidInput { .. })));

        let args = QuoteArgs {
            input: Some(dir.path().join("missing.json")),
            ..QuoteArgs::default()
        };
        assert!(matches!(build_input(&args), Err(CliError::Read { .. })));
    }

    #[test]
    fn cubage_methods() {
        assert_eq!(
            cubage_method(&cubage_args(CubageMethodArg::Equivalent)).unwrap(),
            EstimationMethod::Equivalent
        );
        assert!(matches!(
            cubage_method(&cubage_args(CubageMethodArg::FixedHeight)),
            Err(CliError::MissingHeight)
        ));
        let args = CubageArgs {
            height: Some(1.0),
            ..cubage_args(CubageMethodArg::FixedHeight)
        };
        assert!(run_cubage(&args).is_ok());
        let args = CubageArgs {
            volume: 0.0,
            ..cubage_args(CubageMethodArg::Typical)
        };
        assert!(matches!(run_cubage(&args), Err(CliError::NoEstimate(_))));
    }

    #[tokio::test]
    async fn quote_with_antt_floor_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path());
        let args = QuoteArgs {
            client: Some("Agro Export".into()),
            origin: Some("São Paulo, SP".into()),
            destination: Some("Salvador, BA".into()),
            weight: Some(12_000.0),
            distance: Some(500.0),
            antt_axles: Some(5),
            save: true,
            ..QuoteArgs::default()
        };

        let session = run_quote(&args, &store, &offline_client()).await.unwrap();
        assert_eq!(session.input().icms, 7.0);
        assert_eq!(session.input().methodology, Methodology::Antt);
        assert_eq!(session.derived().base_freight, 500.0 * 5.0 * 1.5);
        assert!(session.validate().is_empty());

        let drafts = store.load_drafts().unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, session.id());
    }

    #[tokio::test]
    async fn failed_cep_lookup_still_prices() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path());
        let args = QuoteArgs {
            client: Some("Agro Export".into()),
            origin: Some("São Paulo, SP".into()),
            destination: Some("Salvador, BA".into()),
            origin_cep: Some("01001-000".into()),
            destination_cep: Some("123".into()),
            weight: Some(800.0),
            distance: Some(300.0),
            ..QuoteArgs::default()
        };

        let session = run_quote(&args, &store, &offline_client()).await.unwrap();
        assert_eq!(session.input().origin.as_deref(), Some("São Paulo, SP"));
        assert_eq!(session.input().destination.as_deref(), Some("Salvador, BA"));
        assert_eq!(session.input().icms, 7.0);
        assert!(session.derived().calculated_revenue > 0.0);
        assert!(session.validate().is_empty());
    }

    #[tokio::test]
    async fn json_form_with_text_dimensions_prices_cubage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote.json");
        fs::write(
            &path,
            r#"{ "dimensions": "400x250x200", "weight": 500, "distance": 850, "cargoType": "container" }"#,
        )
        .unwrap();
        let args = QuoteArgs {
            input: Some(path),
            save: true,
            ..QuoteArgs::default()
        };

        let store = Store::at(dir.path());
        let session = run_quote(&args, &store, &offline_client()).await.unwrap();
        assert_eq!(session.derived().cubage, 20.0);
        assert_eq!(session.derived().recommended_methodology, Methodology::Lotacao);

        let drafts = store.load_drafts().unwrap();
        assert_eq!(drafts[0].input.dimensions.as_deref(), Some("400x250x200"));
        assert_eq!(drafts[0].input.cargo_type, CargoType::Container);
    }

    #[test]
    fn explicit_config_dir_holds_the_address_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path());
        assert!(open_cep_client(&store, true).is_ok());
        assert_eq!(store.cep_cache_path(), dir.path().join("cep_cache.json"));
    }

    #[tokio::test]
    async fn unsupported_axles_fail_the_quote() {
        let dir = tempfile::tempdir().unwrap();
        let args = QuoteArgs {
            antt_axles: Some(9),
            ..QuoteArgs::default()
        };
        assert!(matches!(
            run_quote(&args, &Store::at(dir.path()), &offline_client()).await,
            Err(CliError::Antt(AnttError::UnsupportedAxles(9)))
        ));
    }

    #[test]
    fn settings_init_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::at(dir.path());
        run_settings(&SettingsAction::Init, &store).unwrap();
        assert!(store.pricing_path().exists());
        run_settings(&SettingsAction::Reset, &store).unwrap();
        assert!(!store.pricing_path().exists());
        run_drafts(&store).unwrap();
    }
}
