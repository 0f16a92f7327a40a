use super::Host;
use super::common::{DataDirs, GlobalArgs, OutputArgs, emit, init_logging};
use crate::Result;
use crate::query::{QueryEngine, StreetScope, list_provinces, list_regions};
use crate::snapshot::SnapshotStore;
use clap::{ArgGroup, Args, Subcommand};

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    #[command(subcommand)]
    pub request: QueryRequest,
}

#[derive(Subcommand, Debug)]
pub enum QueryRequest {
    /// Localities served by a postal code, or by all codes sharing a 3 or 4 digit prefix
    Postal {
        /// Five digit postal code or 3-4 digit prefix
        code: String,
    },

    /// Localities of a municipality
    Municipality {
        /// Province code (1-52)
        #[arg(allow_negative_numbers = true)]
        cpro: i64,

        /// Municipality code within the province
        #[arg(allow_negative_numbers = true)]
        cmun: i64,
    },

    /// Localities of one population unit variant
    Unit {
        /// Province code (1-52)
        #[arg(allow_negative_numbers = true)]
        cpro: i64,

        /// Municipality code within the province
        #[arg(allow_negative_numbers = true)]
        cmun: i64,

        /// Seven digit population unit variant
        #[arg(allow_negative_numbers = true)]
        cun_var: i64,
    },

    /// Population units of a province
    Units {
        /// Province code (1-52)
        #[arg(allow_negative_numbers = true)]
        cpro: i64,
    },

    /// Streets whose name contains a text, within a postal code or a population unit
    Streets(StreetsArgs),
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("scope").required(true).args(["postal_code", "unit"])))]
pub struct StreetsArgs {
    /// Part of the street name (at least three characters)
    pub name: String,

    /// Search within this five digit postal code
    #[arg(long, value_name = "CODE")]
    pub postal_code: Option<String>,

    /// Search within a population unit, given as province, municipality and unit code
    #[arg(long, num_args = 3, value_names = ["CPRO", "CMUN", "CUN"], allow_negative_numbers = true)]
    pub unit: Option<Vec<i64>>,
}

impl StreetsArgs {
    fn scope(&self) -> Option<StreetScope<'_>> {
        if let Some(code) = &self.postal_code {
            return Some(StreetScope::PostalCode(code));
        }

        match self.unit.as_deref() {
            Some(&[cpro, cmun, cun]) => Some(StreetScope::PopulationUnit { cpro, cmun, cun }),
            _ => None,
        }
    }
}

#[derive(Args, Debug)]
pub struct ProvincesArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Only list the provinces of this region (1-19)
    #[arg(allow_negative_numbers = true)]
    pub region: Option<i64>,
}

pub fn run_query<H: Host>(host: &mut H, global: &GlobalArgs, args: &QueryArgs) -> Result<()> {
    init_logging(global.log_level);

    let dirs = DataDirs::resolve(global.data_dir.as_deref())?;
    let store = SnapshotStore::new(dirs.snapshots());
    let snapshot = store.load()?;
    let engine = QueryEngine::new(&snapshot);
    let (format, color) = (args.output.format, global.color);

    match &args.request {
        QueryRequest::Postal { code } => emit(host, &engine.lookup_by_postal_code(code), format, color),
        QueryRequest::Municipality { cpro, cmun } => {
            emit(host, &engine.lookup_by_province_municipality(*cpro, *cmun), format, color)
        }
        QueryRequest::Unit { cpro, cmun, cun_var } => {
            emit(host, &engine.lookup_by_population_unit(*cpro, *cmun, *cun_var), format, color)
        }
        QueryRequest::Units { cpro } => emit(host, &engine.list_population_units(*cpro), format, color),
        QueryRequest::Streets(streets) => {
            let Some(scope) = streets.scope() else {
                ohno::bail!("a street search needs either --postal-code or --unit");
            };
            emit(host, &engine.search_streets(scope, &streets.name), format, color)
        }
    }
}

pub fn run_regions<H: Host>(host: &mut H, global: &GlobalArgs, output: OutputArgs) -> Result<()> {
    init_logging(global.log_level);
    emit(host, &list_regions(), output.format, global.color)
}

pub fn run_provinces<H: Host>(host: &mut H, global: &GlobalArgs, args: &ProvincesArgs) -> Result<()> {
    init_logging(global.log_level);
    emit(host, &list_provinces(args.region), args.output.format, global.color)
}
