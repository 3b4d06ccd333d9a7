//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use shopwright::fixture::DEFAULT_TEST_DATA_PATH;
use shopwright::scenario::PRODUCTS_TO_ADD;
use shopwright::PaymentMethod;
use std::path::PathBuf;

/// Shopwright: guest checkout scenarios for the Demo Web Shop
#[derive(Parser, Debug)]
#[command(name = "shopwright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available scenarios
    List,

    /// Run checkout scenarios against the shop
    Run(RunArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),
}

/// Where the shop configuration comes from
#[derive(Args, Debug, Clone, Default)]
pub struct EnvArgs {
    /// Shop base URL
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Load variables from this .env file instead of ./.env
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenario ids to run (TC001-TC004); all when omitted
    pub scenarios: Vec<String>,

    /// Shop configuration
    #[command(flatten)]
    pub env: EnvArgs,

    /// Guest user test data file
    #[arg(short, long, default_value = DEFAULT_TEST_DATA_PATH)]
    pub data: PathBuf,

    /// Run scenarios concurrently, one page each
    #[arg(long)]
    pub parallel: bool,

    /// Per-scenario timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Seed for random product choice
    #[arg(long)]
    pub seed: Option<u64>,

    /// Products to add before checkout
    #[arg(long, default_value_t = PRODUCTS_TO_ADD)]
    pub products: usize,

    /// Payment method for scenarios that place an order
    #[arg(long, value_enum, default_value = "cash-on-delivery")]
    pub payment: PaymentArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: FormatArg,

    /// Also write the JSON report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Shop configuration
    #[command(flatten)]
    pub env: EnvArgs,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Use colors when stdout is a terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Payment method argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentArg {
    /// Cash on delivery
    #[default]
    CashOnDelivery,
    /// Check or money order
    CheckMoneyOrder,
    /// Credit card
    CreditCard,
    /// Purchase order
    PurchaseOrder,
}

impl From<PaymentArg> for PaymentMethod {
    fn from(arg: PaymentArg) -> Self {
        match arg {
            PaymentArg::CashOnDelivery => Self::CashOnDelivery,
            PaymentArg::CheckMoneyOrder => Self::CheckMoneyOrder,
            PaymentArg::CreditCard => Self::CreditCard,
            PaymentArg::PurchaseOrder => Self::PurchaseOrder,
        }
    }
}

/// Output format argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON report on stdout
    Json,
}
