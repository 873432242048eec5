use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "cedears")]
#[command(
    version,
    about = "CEDEARs investment tracker with broker commission and custody calculations"
)]
#[command(
    long_about = "Calculate broker commissions (with IVA), monthly custody fees, break-even returns and optimal operation sizes for CEDEARs, and keep a journal of the commissions you paid."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calculate the commission of a buy or sell operation
    Commission {
        /// Operation type: buy or sell
        operation: String,

        /// Operation amount (e.g., 10000 or 2500.50)
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Broker name (defaults to CEDEARS_BROKER or the config file)
        #[arg(short, long)]
        broker: Option<String>,
    },

    /// Calculate the monthly custody fee for a portfolio value
    Custody {
        /// Total portfolio value
        #[arg(allow_hyphen_values = true)]
        portfolio_value: String,

        #[arg(short, long)]
        broker: Option<String>,
    },

    /// Project entry, custody and exit costs and the return needed to break even
    BreakEven {
        /// Amount to invest
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Holding period in months
        #[arg(short, long)]
        months: Option<u32>,

        /// Expected monthly growth of the position (0.01 = 1%)
        #[arg(short, long, allow_hyphen_values = true)]
        growth: Option<String>,

        /// Value of the rest of the portfolio (shares the custody threshold)
        #[arg(long)]
        holdings: Option<String>,

        /// Leave the sell commission out of the analysis
        #[arg(long)]
        no_exit: bool,

        #[arg(short, long)]
        broker: Option<String>,
    },

    /// Search the operation size with the lowest relative cost
    Optimize {
        /// Acceptable break-even percentage (1.5 = 1.5%)
        #[arg(long, default_value = "1.5")]
        target_pct: String,

        /// Holding period in months
        #[arg(short, long)]
        months: Option<u32>,

        /// Expected monthly growth of the position (0.01 = 1%)
        #[arg(short, long, allow_hyphen_values = true)]
        growth: Option<String>,

        /// Value of the rest of the portfolio
        #[arg(long)]
        holdings: Option<String>,

        /// Amount increment between candidates
        #[arg(long, default_value = "10000")]
        step: String,

        /// Largest amount to evaluate
        #[arg(long, default_value = "2000000")]
        max: String,

        /// Leave the sell commission out of the analysis
        #[arg(long)]
        no_exit: bool,

        #[arg(short, long)]
        broker: Option<String>,
    },

    /// Broker commission configuration
    Brokers {
        #[command(subcommand)]
        action: BrokerCommands,
    },

    /// Trade journal
    Trades {
        #[command(subcommand)]
        action: TradeCommands,
    },

    /// Commission reports
    Report {
        #[command(subcommand)]
        action: ReportCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum BrokerCommands {
    /// List configured brokers
    List,

    /// Show a broker's commission configuration
    Show {
        /// Broker name
        name: String,
    },

    /// Create or update a broker (rates are fractions: 0.005 = 0.5%)
    Set {
        /// Broker name
        name: String,

        #[arg(long)]
        buy_pct: Option<String>,

        #[arg(long)]
        buy_min: Option<String>,

        #[arg(long)]
        sell_pct: Option<String>,

        #[arg(long)]
        sell_min: Option<String>,

        /// IVA rate for buy and sell commissions
        #[arg(long)]
        iva: Option<String>,

        #[arg(long)]
        custody_exempt: Option<String>,

        #[arg(long)]
        custody_pct: Option<String>,

        #[arg(long)]
        custody_min: Option<String>,

        #[arg(long)]
        custody_iva: Option<String>,
    },

    /// Delete a broker without recorded trades
    Delete {
        /// Broker name
        name: String,
    },

    /// Import brokers from a TOML file with [[broker]] tables
    Import {
        /// Path to the TOML file
        file: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TradeCommands {
    /// Record a trade and the commission charged for it
    Add {
        /// Ticker symbol (e.g., AAPL)
        ticker: String,

        /// Operation type: buy or sell
        operation: String,

        /// Quantity of certificates
        quantity: String,

        /// Price per certificate
        price: String,

        /// Trade date (YYYY-MM-DD)
        date: String,

        #[arg(short, long)]
        broker: Option<String>,

        /// Optional notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List recorded trades
    List {
        /// Filter by ticker
        #[arg(short, long)]
        ticker: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Monthly commissions paid in a year
    Commissions {
        /// Year (e.g., 2025)
        year: i32,

        /// Export report to CSV (commissions_report_<year>.csv)
        #[arg(long)]
        export: bool,
    },
}
