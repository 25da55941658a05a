use anyhow::Context;
use serde::Serialize;
use taxlot::engine::DiscountCandidate;
use taxlot::{
    AppError, CompileReport, Compiler, Config, CsvLedgerSource, FinancialYear, PeriodView,
    TaxRules, TradeDate,
};
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    run_id: Uuid,
    financial_year: String,
    period: PeriodView,
    failures: Vec<FailureRow>,
    upcoming_discounts: Vec<DiscountCandidate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureRow {
    ticker: String,
    error: String,
}

fn build_report(config: &Config, compiled: &CompileReport) -> Result<RunReport, AppError> {
    let fy = match config.financial_year {
        Some(year) => FinancialYear::new(year),
        None => FinancialYear::current(),
    }?;

    Ok(RunReport {
        run_id: compiled.run_id(),
        financial_year: fy.label(),
        period: compiled.log.financial_year_view(fy, config.report_summary),
        failures: compiled
            .failures
            .iter()
            .map(|f| FailureRow {
                ticker: f.ticker.to_string(),
                error: f.error.to_string(),
            })
            .collect(),
        upcoming_discounts: compiled
            .upcoming_discounts(TradeDate::today(), config.discount_lookback_days),
    })
}

async fn run(config: &Config) -> Result<RunReport, AppError> {
    let source = CsvLedgerSource::new(&config.ledger_path);
    let compiled =
        Compiler::compile_source(&source, TaxRules::default(), config.compile_mode).await?;
    build_report(config, &compiled)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match Config::from_env().map_err(AppError::from) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let output = run(&config)
        .await
        .with_context(|| format!("processing ledger {}", config.ledger_path))
        .and_then(|report| serde_json::to_string_pretty(&report).context("serializing report"));
    match output {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Report error: {:#}", e);
            std::process::exit(1);
        }
    }
}
