//! Command-line arguments for `freight-quote`.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use freight_quote::domain::antt::AnttCargoKind;
use freight_quote::domain::reverse_cubage::{BaseRatio, EquipmentProfile, TypicalProfile};
use freight_quote::domain::{CargoType, Methodology, Urgency};
use freight_quote::logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "freight-quote",
    version,
    about = "Freight quotes: cubage, LTL/FTL estimates and viability analysis"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    /// Settings and drafts directory (default: platform config dir).
    #[arg(long = "config-dir", value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Price a quote and print its viability.
    Quote(QuoteArgs),

    /// Look up an address by CEP.
    Cep(CepArgs),

    /// ANTT minimum freight for a route.
    Antt(AnttArgs),

    /// ICMS rate between two states.
    Icms(IcmsArgs),

    /// Estimate dimensions from a volume.
    Cubage(CubageArgs),

    /// Inspect or reset the pricing table.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// List saved quote drafts.
    Drafts,
}

#[derive(Args, Default)]
pub struct QuoteArgs {
    /// Quote form as JSON; flags below override its fields.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    #[arg(long)]
    pub client: Option<String>,

    /// Origin as "City, UF".
    #[arg(long)]
    pub origin: Option<String>,

    /// Destination as "City, UF".
    #[arg(long)]
    pub destination: Option<String>,

    /// Resolve the origin from a CEP.
    #[arg(long = "origin-cep", value_name = "CEP")]
    pub origin_cep: Option<String>,

    /// Resolve the destination from a CEP.
    #[arg(long = "destination-cep", value_name = "CEP")]
    pub destination_cep: Option<String>,

    /// Collection date (YYYY-MM-DD).
    #[arg(long = "collection-date", value_name = "DATE")]
    pub collection_date: Option<String>,

    #[arg(long)]
    pub items: Option<u32>,

    #[arg(long = "cargo-type", value_enum)]
    pub cargo_type: Option<CargoTypeArg>,

    /// Package dimensions in cm, e.g. "120x80x60".
    #[arg(long, value_name = "CxLxA")]
    pub dimensions: Option<String>,

    /// Gross weight in kg.
    #[arg(long)]
    pub weight: Option<f64>,

    /// Route distance in km.
    #[arg(long)]
    pub distance: Option<f64>,

    /// Declared merchandise value in BRL.
    #[arg(long = "merchandise-value", value_name = "BRL")]
    pub merchandise_value: Option<f64>,

    #[arg(long, value_enum)]
    pub urgency: Option<UrgencyArg>,

    #[arg(long, value_enum)]
    pub methodology: Option<MethodologyArg>,

    /// Use --base-freight instead of the NTC table estimate.
    #[arg(long = "manual-freight")]
    pub manual_freight: bool,

    #[arg(long = "base-freight", value_name = "BRL")]
    pub base_freight: Option<f64>,

    #[arg(long = "loading-cost", value_name = "BRL")]
    pub loading_cost: Option<f64>,

    #[arg(long = "equipment-cost", value_name = "BRL")]
    pub equipment_cost: Option<f64>,

    #[arg(long = "toll-cost", value_name = "BRL")]
    pub toll_cost: Option<f64>,

    /// Leave operational costs out of the markup base.
    #[arg(long = "no-taxes-on-costs")]
    pub no_taxes_on_costs: bool,

    /// Markup percentage over the cost base.
    #[arg(long, value_name = "PCT")]
    pub markup: Option<f64>,

    /// Agreed price; turns markup off.
    #[arg(long = "negotiated-freight", value_name = "BRL")]
    pub negotiated_freight: Option<f64>,

    /// Price on the ANTT floor for this many axles (2-6).
    #[arg(long = "antt-axles", value_name = "N")]
    pub antt_axles: Option<u8>,

    #[arg(long = "antt-cargo", value_enum, default_value = "general")]
    pub antt_cargo: CargoArg,

    /// Print the full breakdown as JSON.
    #[arg(long)]
    pub json: bool,

    /// Save the quote as a draft.
    #[arg(long)]
    pub save: bool,
}

#[derive(Args)]
pub struct CepArgs {
    pub cep: String,
}

#[derive(Args)]
pub struct AnttArgs {
    /// Distance in km.
    #[arg(long)]
    pub distance: f64,

    /// Axle count (2-6); all configurations when omitted.
    #[arg(long)]
    pub axles: Option<u8>,

    #[arg(long, value_enum, default_value = "general")]
    pub cargo: CargoArg,
}

#[derive(Args)]
pub struct IcmsArgs {
    /// Origin state code.
    #[arg(long)]
    pub origin: String,

    /// Destination state code.
    #[arg(long)]
    pub destination: String,

    /// Freight value to apply the rate to.
    #[arg(long)]
    pub value: Option<f64>,
}

#[derive(Args)]
pub struct CubageArgs {
    /// Volume in m³.
    #[arg(long)]
    pub volume: f64,

    #[arg(long, value_enum, default_value = "equivalent")]
    pub method: CubageMethodArg,

    /// Shape for --method typical.
    #[arg(long, value_enum, default_value = "fitness")]
    pub profile: ProfileArg,

    /// Shape for --method equipment.
    #[arg(long, value_enum, default_value = "leg-press")]
    pub equipment: EquipmentArg,

    /// Known height in metres for --method fixed-height.
    #[arg(long)]
    pub height: Option<f64>,

    /// Base length:width ratio for --method fixed-height.
    #[arg(long, default_value = "1.5:1", value_parser = parse_base_ratio)]
    pub ratio: BaseRatio,

    /// Print centimetres instead of metres.
    #[arg(long)]
    pub cm: bool,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the active pricing table as JSON.
    Show,
    /// Print the settings file location.
    Path,
    /// Write the default table to the settings file for editing.
    Init,
    /// Delete the settings file so defaults apply.
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum UrgencyArg {
    Normal,
    Alta,
    Expressa,
}

impl From<UrgencyArg> for Urgency {
    fn from(value: UrgencyArg) -> Self {
        match value {
            UrgencyArg::Normal => Urgency::Normal,
            UrgencyArg::Alta => Urgency::Alta,
            UrgencyArg::Expressa => Urgency::Expressa,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CargoTypeArg {
    Lotacao,
    Fracionada,
    Container,
}

impl From<CargoTypeArg> for CargoType {
    fn from(value: CargoTypeArg) -> Self {
        match value {
            CargoTypeArg::Lotacao => CargoType::Lotacao,
            CargoTypeArg::Fracionada => CargoType::Fracionada,
            CargoTypeArg::Container => CargoType::Container,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MethodologyArg {
    Fracionada,
    Lotacao,
    Container,
    Antt,
}

impl From<MethodologyArg> for Methodology {
    fn from(value: MethodologyArg) -> Self {
        match value {
            MethodologyArg::Fracionada => Methodology::Fracionada,
            MethodologyArg::Lotacao => Methodology::Lotacao,
            MethodologyArg::Container => Methodology::Container,
            MethodologyArg::Antt => Methodology::Antt,
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum CargoArg {
    #[default]
    General,
    Bulk,
    Refrigerated,
    Dangerous,
}

impl From<CargoArg> for AnttCargoKind {
    fn from(value: CargoArg) -> Self {
        match value {
            CargoArg::General => AnttCargoKind::General,
            CargoArg::Bulk => AnttCargoKind::Bulk,
            CargoArg::Refrigerated => AnttCargoKind::Refrigerated,
            CargoArg::Dangerous => AnttCargoKind::Dangerous,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CubageMethodArg {
    Equivalent,
    Typical,
    Equipment,
    FixedHeight,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ProfileArg {
    Fitness,
    Pallet,
    Box,
    Appliance,
    Furniture,
}

impl From<ProfileArg> for TypicalProfile {
    fn from(value: ProfileArg) -> Self {
        match value {
            ProfileArg::Fitness => TypicalProfile::Fitness,
            ProfileArg::Pallet => TypicalProfile::Pallet,
            ProfileArg::Box => TypicalProfile::Box,
            ProfileArg::Appliance => TypicalProfile::Appliance,
            ProfileArg::Furniture => TypicalProfile::Furniture,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EquipmentArg {
    Abductor,
    Abdominal,
    LegPress,
    LatPulldown,
    Rowing,
    BenchPress,
    ExerciseBike,
    Treadmill,
}

impl From<EquipmentArg> for EquipmentProfile {
    fn from(value: EquipmentArg) -> Self {
        match value {
            EquipmentArg::Abductor => EquipmentProfile::Abductor,
            EquipmentArg::Abdominal => EquipmentProfile::Abdominal,
            EquipmentArg::LegPress => EquipmentProfile::LegPress,
            EquipmentArg::LatPulldown => EquipmentProfile::LatPulldown,
            EquipmentArg::Rowing => EquipmentProfile::Rowing,
            EquipmentArg::BenchPress => EquipmentProfile::BenchPress,
            EquipmentArg::ExerciseBike => EquipmentProfile::ExerciseBike,
            EquipmentArg::Treadmill => EquipmentProfile::Treadmill,
        }
    }
}

fn parse_base_ratio(raw: &str) -> Result<BaseRatio, String> {
    BaseRatio::parse(raw).ok_or_else(|| format!("expected 1:1, 1.2:1, 1.5:1 or 2:1, got {raw:?}"))
}
