mod cli;
// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

use cli::{Cli, Commands};
use equine_eligibility::appetite::AppetiteGuide;
use equine_eligibility::config::Config;
use equine_eligibility::logging;
use equine_eligibility::plans::{PlanCatalog, PlanFilter};
use equine_eligibility::ranker::PreferenceSet;
use equine_eligibility::reference::{
    reference_fingerprint, AgeBand, Category, InsuredValue, Preference, REFERENCE_VERSION,
};
use equine_eligibility::report::{EvaluationReport, EvaluationRequest};
use equine_eligibility::summary::{
    format_usd, EligibilitySummary, ValueStatus, CLASSIC_NO_COINSURANCE_NOTE, DISCLAIMER,
    NO_MAJOR_MEDICAL_MESSAGE,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(cli.config.as_deref())?;
    logging::init(&logging::resolve_filter(cli.verbose, &config.logging.filter));
    debug!(?config, "configuration loaded");

    match cli.command.unwrap_or(Commands::Wizard) {
        Commands::Evaluate {
            category,
            use_,
            value,
            age,
            prefer,
            name,
            age_years,
            json,
        } => {
            let mut request = EvaluationRequest::new(category, use_, InsuredValue::parse(&value), age);
            request.preferences = prefer.into_iter().collect::<PreferenceSet>();
            request.horse_name = name;
            request.age_years = age_years;
            run_evaluate(&request, &value, json)
        }
        Commands::Appetite {
            query,
            category,
            rule,
            mailto,
        } => run_appetite(
            &config.appetite_guide()?,
            query.as_deref().unwrap_or(""),
            category.as_deref(),
            rule.as_deref(),
            mailto,
        ),
        Commands::Plans {
            search,
            company,
            co_pay,
            state,
            horse_category,
            csv,
        } => {
            let filter = PlanFilter {
                search,
                company,
                co_pay,
                state,
                horse_category,
            };
            run_plans(&config.plan_catalog()?, &filter, csv)
        }
        Commands::Format { file } => run_format(file.as_deref()),
        Commands::Reference => {
            run_reference();
            Ok(())
        }
        Commands::Wizard => run_ui_mode(&config),
    }
}

fn run_evaluate(request: &EvaluationRequest, raw_value: &str, json: bool) -> Result<()> {
    let (coverage, ranking) = request.evaluate()?;

    if json {
        let report = EvaluationReport::build(request, &coverage, &ranking)?;
        println!("{}", report.to_json_pretty()?);
        return Ok(());
    }

    let discipline = request.discipline()?;
    let summary = EligibilitySummary::from_coverage(&coverage, discipline, request.value);

    println!("🐴 {} · {} · {}", request.category.label(), request.use_.label(), request.age.label());
    println!("   Insured value: {}", format_usd(request.value));
    if let Some(status) = ValueStatus::assess(raw_value, request.value) {
        println!("   {}", status.text);
    }

    println!("\nMajor Medical:");
    if summary.has_major_medical() {
        for name in &summary.major_medical {
            println!("  ✓ {}", name);
        }
    } else {
        println!("  {}", NO_MAJOR_MEDICAL_MESSAGE);
    }
    if summary.show_100k_note {
        println!("  {}", CLASSIC_NO_COINSURANCE_NOTE);
    }

    if !summary.other_options.is_empty() {
        println!("\nOther eligible options:");
        for name in &summary.other_options {
            println!("  • {}", name);
        }
    }

    if !ranking.is_empty() {
        println!("\nRecommended:");
        for line in ranking.primary_lines() {
            println!("  → {}", line);
        }
        for line in ranking.supplemental_lines() {
            println!("  + {}", line);
        }
    }

    println!("\n{}", DISCLAIMER);
    Ok(())
}

fn run_appetite(
    guide: &AppetiteGuide,
    query: &str,
    category: Option<&str>,
    rule: Option<&str>,
    mailto: bool,
) -> Result<()> {
    if let (Some(category), Some(rule)) = (category, rule) {
        let selection = guide.lookup(category, rule)?;
        println!("{}", selection.printable_summary());
        if mailto {
            println!("\n{}", selection.underwriting_mailto());
        }
        return Ok(());
    }

    let results = guide.search(query, category);
    if results.is_empty() {
        println!("No appetite rules match \"{}\".", query);
        return Ok(());
    }

    for cat in &results {
        println!("\n{}", cat.category);
        if let Some(notes) = &cat.notes {
            println!("  ({})", notes);
        }
        for rule in &cat.rules {
            println!("  {:<24} {}", rule.status.label(), rule.label);
            if let Some(note) = &rule.note {
                println!("  {:<24} ↳ {}", "", note);
            }
        }
    }
    Ok(())
}

fn run_plans(catalog: &PlanCatalog, filter: &PlanFilter, csv: bool) -> Result<()> {
    let plans = catalog.filter(filter);

    if csv {
        PlanCatalog::write_csv(io::stdout().lock(), &plans, filter.horse_category.as_deref())?;
        return Ok(());
    }

    println!("📊 {} of {} plans", plans.len(), catalog.plans().len());
    for plan in plans {
        println!("\n{} — {} (co-pay: {})", plan.plan_name, plan.company, plan.co_pay);
        println!("  Age: {}", plan.age_eligibility);
        println!("  Use & value: {}", plan.use_and_value_eligibility);
        println!("  Limits: {}", plan.special_limits);
        for rate in plan.filtered_rates(filter.horse_category.as_deref()) {
            println!(
                "    {:<26} {:<12} ded {:<7} limit {:<8} {}",
                rate.horse_category, rate.sum_insured, rate.deductible, rate.limit, rate.premium
            );
        }
    }
    Ok(())
}

fn run_format(file: Option<&Path>) -> Result<()> {
    let input = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read evaluation file: {:?}", path))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read evaluation JSON from stdin")?;
            buf
        }
    };

    let report = EvaluationReport::from_json(input.trim())?;
    println!("{}", report.summary_text());
    Ok(())
}

fn run_reference() {
    println!("Reference tables v{} ({})", REFERENCE_VERSION, reference_fingerprint());

    println!("\nCategories / uses:");
    for category in Category::ALL {
        println!("  {} ({})", category.label(), category.key());
        for use_ in category.uses() {
            println!("    {:<16} {}", use_.key(), use_.label());
        }
    }

    println!("\nAge bands:");
    for age in AgeBand::ALL {
        println!("  {:<16} {}", age.key(), age.label());
    }

    println!("\nPreferences:");
    for pref in Preference::ALL {
        println!("  {:<16} {}", pref.key(), pref.label());
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    let appetite = config.appetite_guide()?;
    let plans = config.plan_catalog()?;

    let mut app = ui::App::new(appetite, plans);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    anyhow::bail!(
        "TUI mode not available. Rebuild with `--features tui`, or use a subcommand (see --help)"
    )
}
