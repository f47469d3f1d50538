use std::path::PathBuf;

use clap::{Parser, Subcommand};

use equine_eligibility::config::CONFIG_ENV_VAR;
use equine_eligibility::reference::{AgeBand, Category, Preference, Use};

#[derive(Parser, Debug)]
#[command(name = "equine-eligibility")]
#[command(author, version, about = "Equine medical coverage eligibility toolkit", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file
    #[arg(long, global = true, env = CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate coverage eligibility for one horse
    Evaluate {
        /// Horse category (western, sport)
        #[arg(long)]
        category: Category,

        /// Primary use (barrel, general_western, eventing, dressage, polo_racing, general_sport)
        #[arg(long = "use")]
        use_: Use,

        /// Insured value, e.g. 50000 or "$50,000"
        #[arg(long)]
        value: String,

        /// Age band (31d_20y, over20)
        #[arg(long)]
        age: AgeBand,

        /// Client preference (broad_coverage, no_copay); repeatable
        #[arg(long = "prefer")]
        prefer: Vec<Preference>,

        /// Horse name for the report
        #[arg(long)]
        name: Option<String>,

        /// Age in years for the report
        #[arg(long)]
        age_years: Option<u32>,

        /// Print the evaluation JSON document
        #[arg(long)]
        json: bool,
    },

    /// Search the appetite guide
    Appetite {
        /// Text matched against category names and rule labels
        query: Option<String>,

        /// Restrict to one category
        #[arg(long)]
        category: Option<String>,

        /// Show one rule (requires --category)
        #[arg(long, requires = "category")]
        rule: Option<String>,

        /// Print an underwriting email link for the selected rule
        #[arg(long, requires = "rule")]
        mailto: bool,
    },

    /// Compare medical products
    Plans {
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        co_pay: Option<String>,

        /// Two-letter state code
        #[arg(long)]
        state: Option<String>,

        /// Race Horse, Sport Horse, Western, ...
        #[arg(long)]
        horse_category: Option<String>,

        /// Export rate rows as CSV
        #[arg(long)]
        csv: bool,
    },

    /// Render an evaluation JSON document as a text summary
    Format {
        /// JSON file (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Show the reference tables, version and fingerprint
    Reference,

    /// Interactive eligibility wizard (default)
    Wizard,
}
