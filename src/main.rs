use alerter::AlertScanner;
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use core_types::ProjectInputs;
use engine::CalculationEngine;
use projection::ProjectionCalculator;
use risk::RiskDetector;
use rust_decimal::Decimal;
use scenario::{standard_scenarios, ScenarioComparator};
use std::path::{Path, PathBuf};
use store::MemoryStore;
use tracing_subscriber::EnvFilter;
use valuation::ValuationAnalyzer;

/// The main entry point for the Horizon projection engine.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = configuration::load_config()?;

    match cli.command {
        Commands::Calculate(args) => handle_calculate(args),
        Commands::Valuation(args) => handle_valuation(args, &config),
        Commands::Scenarios(args) => handle_scenarios(args, &config),
        Commands::Risk(args) => handle_risk(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Financial projection and valuation engine for business plans.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the monthly projection for a project and print its summary.
    Calculate(CalculateArgs),

    /// Derive NPV, IRR, payback and ratio indicators for a project.
    Valuation(ValuationArgs),

    /// Compare the base case against the optimistic/pessimistic scenarios.
    Scenarios(ScenariosArgs),

    /// Classify the project's risk level and list dashboard alerts.
    Risk(RiskArgs),
}

#[derive(Parser)]
struct CalculateArgs {
    /// Path to the project inputs file (JSON).
    #[arg(long)]
    inputs: PathBuf,

    /// Recalculate even if a calculation is already stored.
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
struct ValuationArgs {
    /// Path to the project inputs file (JSON).
    #[arg(long)]
    inputs: PathBuf,

    /// Initial investment the discounted payback is measured against.
    #[arg(long, default_value = "0")]
    initial_investment: Decimal,
}

#[derive(Parser)]
struct ScenariosArgs {
    /// Path to the project inputs file (JSON).
    #[arg(long)]
    inputs: PathBuf,

    /// Initial investment used for per-scenario discounted metrics.
    #[arg(long, default_value = "0")]
    initial_investment: Decimal,
}

#[derive(Parser)]
struct RiskArgs {
    /// Path to the project inputs file (JSON).
    #[arg(long)]
    inputs: PathBuf,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn load_inputs(path: &Path) -> anyhow::Result<ProjectInputs> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read inputs file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse project inputs from {}", path.display()))
}

fn handle_calculate(args: CalculateArgs) -> anyhow::Result<()> {
    let inputs = load_inputs(&args.inputs)?;
    let engine = CalculationEngine::new(MemoryStore::new());

    let outcome = engine.run_calculation(&inputs, None, args.force)?;
    let summary = &outcome.summary;

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Months calculated".to_string(), summary.months_calculated.to_string()]);
    table.add_row(vec!["Total revenue".to_string(), summary.total_revenue.to_string()]);
    table.add_row(vec!["Total COGS".to_string(), summary.total_cogs.to_string()]);
    table.add_row(vec!["Gross margin".to_string(), summary.gross_margin.to_string()]);
    table.add_row(vec!["Total opex".to_string(), summary.total_opex.to_string()]);
    table.add_row(vec!["Total depreciation".to_string(), summary.total_depreciation.to_string()]);
    table.add_row(vec!["Net income".to_string(), summary.net_income.to_string()]);
    table.add_row(vec!["Cash flow".to_string(), summary.cash_flow.to_string()]);
    table.add_row(vec!["Gross margin %".to_string(), summary.gross_margin_pct.to_string()]);
    table.add_row(vec!["Net margin %".to_string(), summary.net_margin_pct.to_string()]);
    table.add_row(vec!["Avg monthly revenue".to_string(), summary.avg_monthly_revenue.to_string()]);
    table.add_row(vec!["Profitable".to_string(), summary.profitability.to_string()]);
    table.add_row(vec![
        "Break-even month".to_string(),
        summary
            .break_even_month
            .map(|m| m.to_string())
            .unwrap_or_else(|| "never".to_string()),
    ]);
    println!("{table}");

    Ok(())
}

fn handle_valuation(args: ValuationArgs, config: &configuration::Config) -> anyhow::Result<()> {
    let inputs = load_inputs(&args.inputs)?;
    let series = ProjectionCalculator::new().calculate(&inputs, None)?;
    let report = ValuationAnalyzer::new(config.valuation.clone()).analyze(
        &series,
        &inputs.loans,
        args.initial_investment,
    )?;

    let irr_display = if report.irr.converged {
        format!("{:.2}%", report.irr.rate_pct)
    } else {
        format!("{:.2}% (not converged)", report.irr.rate_pct)
    };

    let mut table = Table::new();
    table.set_header(vec!["Indicator", "Value"]);
    table.add_row(vec!["NPV".to_string(), report.npv.to_string()]);
    table.add_row(vec!["IRR".to_string(), irr_display]);
    table.add_row(vec!["Payback (months)".to_string(), report.payback_months.to_string()]);
    table.add_row(vec!["Break-even month".to_string(), report.break_even_month.to_string()]);
    table.add_row(vec![
        "Discounted payback (months)".to_string(),
        report.discounted_payback_months.to_string(),
    ]);
    table.add_row(vec![
        "Cash generation starts".to_string(),
        report
            .cash_generation_start
            .map(|m| format!("month {m}"))
            .unwrap_or_else(|| "never".to_string()),
    ]);
    table.add_row(vec!["Gross margin avg %".to_string(), report.gross_margin_avg_pct.to_string()]);
    table.add_row(vec!["EBITDA margin avg %".to_string(), report.ebitda_margin_avg_pct.to_string()]);
    table.add_row(vec!["Debt/equity avg".to_string(), report.debt_to_equity_avg.to_string()]);
    table.add_row(vec!["Current ratio avg".to_string(), report.current_ratio_avg.to_string()]);
    table.add_row(vec![
        "DSCR min".to_string(),
        report
            .dscr_min
            .map(|d| d.to_string())
            .unwrap_or_else(|| "no debt service".to_string()),
    ]);
    table.add_row(vec!["Peak funding need".to_string(), report.peak_funding_need.to_string()]);
    table.add_row(vec!["ROI %".to_string(), report.roi_pct.to_string()]);
    println!("{table}");

    Ok(())
}

fn handle_scenarios(args: ScenariosArgs, config: &configuration::Config) -> anyhow::Result<()> {
    let inputs = load_inputs(&args.inputs)?;
    let scenarios = standard_scenarios(&config.scenarios);
    let comparison = ScenarioComparator::new(config.valuation.clone()).compare(
        &inputs,
        &scenarios,
        args.initial_investment,
    )?;

    let mut table = Table::new();
    table.set_header(vec!["Scenario", "Revenue", "Net income", "NPV", "IRR %", "DSCR min"]);
    for outcome in &comparison.outcomes {
        table.add_row(vec![
            outcome.name.clone(),
            outcome.metrics.total_revenue.to_string(),
            outcome.metrics.net_income.to_string(),
            outcome.metrics.npv.to_string(),
            format!("{:.2}", outcome.metrics.irr.rate_pct),
            outcome
                .metrics
                .dscr_min
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{table}");
    println!("Best case:  {}", comparison.best_case);
    println!("Worst case: {}", comparison.worst_case);
    println!(
        "Variance (revenue / net income / NPV): {} / {} / {}",
        comparison.variance.revenue, comparison.variance.net_income, comparison.variance.npv
    );

    Ok(())
}

fn handle_risk(args: RiskArgs, config: &configuration::Config) -> anyhow::Result<()> {
    let inputs = load_inputs(&args.inputs)?;
    let series = ProjectionCalculator::new().calculate(&inputs, None)?;

    let assessment = RiskDetector::new(config.risk.clone())?.assess(&series);
    println!("Risk level: {:?}", assessment.level);
    for indicator in &assessment.indicators {
        println!("  [{:?}] {}", indicator.severity, indicator.detail);
    }

    let alerts = AlertScanner::new(config.risk.clone()).scan(&series);
    if alerts.is_empty() {
        println!("No alerts.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Severity", "Impact", "Message", "Months"]);
        for alert in &alerts {
            table.add_row(vec![
                format!("{:?}", alert.severity),
                format!("{:?}", alert.impact),
                alert.message.clone(),
                alert.occurrences.to_string(),
            ]);
        }
        println!("{table}");
    }

    Ok(())
}
