use capacity_planner::core::export::ReportWriter;
use capacity_planner::core::RecordStore;
use capacity_planner::domain::model::{ForecastResult, OwnerId};
use capacity_planner::utils::error::{ErrorSeverity, PlannerError};
use capacity_planner::utils::{logger, validation};
use capacity_planner::utils::validation::Validate;
use capacity_planner::{
    CliArgs, ForecastEngine, InMemoryStore, LocalStorage, PlannerConfig, RestStore, StoreConfig,
};
use chrono::{Local, NaiveDate};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.monitoring.json_logs {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(args.verbose, config.log_level());
    }

    tracing::info!("🚀 Starting capacity-planner");
    tracing::debug!("Config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let today = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    match run(&args, &config, today).await {
        Ok(result) => {
            print_summary(&result);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Forecast failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

async fn run(
    args: &CliArgs,
    config: &PlannerConfig,
    today: NaiveDate,
) -> Result<ForecastResult, PlannerError> {
    let owner = OwnerId::new(
        validation::validate_required_field("forecast.owner", &config.forecast.owner)?.clone(),
    );

    let result = match &config.store {
        StoreConfig::Json { path } => {
            tracing::info!("📁 Reading records from {}", path);
            let store = InMemoryStore::from_storage(&LocalStorage::new("."), path).await?;
            forecast_with(store, config, &owner, today, args.strict).await?
        }
        StoreConfig::Rest { endpoint, api_key } => {
            tracing::info!("🌐 Reading records from {}", endpoint);
            let store = RestStore::new(endpoint.clone(), api_key.clone());
            forecast_with(store, config, &owner, today, args.strict).await?
        }
    };

    let writer = ReportWriter::new(
        LocalStorage::new(config.output_path()),
        config.output_formats()?,
    );
    for file in writer.write(&result).await? {
        tracing::info!("📁 Report saved to: {}/{}", config.output_path(), file);
    }

    Ok(result)
}

async fn forecast_with<S: RecordStore>(
    store: S,
    config: &PlannerConfig,
    owner: &OwnerId,
    today: NaiveDate,
    strict: bool,
) -> Result<ForecastResult, PlannerError> {
    let engine = ForecastEngine::with_fetch_timeout(store, config.fetch_timeout());
    if strict {
        engine.try_forecast(owner, today).await
    } else {
        Ok(engine.forecast(owner, today).await)
    }
}

fn print_summary(result: &ForecastResult) {
    println!(
        "{:<5} {:<10} {:>8} {:>8} {:>7} {:>10} {:>10} {:>10}",
        "Week", "Start", "Cap hrs", "Sch hrs", "Util %", "Cost $", "Rev $", "Profit $"
    );
    for week in &result.weekly_summary {
        println!(
            "{:<5} {:<10} {:>8} {:>8} {:>7} {:>10} {:>10} {:>10}  {:?}",
            week.week,
            week.week_start.to_string(),
            week.capacity_hours,
            week.scheduled_hours,
            week.utilization,
            week.cost,
            week.revenue,
            week.profit,
            week.band()
        );
    }

    println!();
    println!("Consultants: {}", result.total_consultants);
    if result.bench.is_empty() {
        println!("Bench: none");
    } else {
        println!("Bench:");
        for consultant in &result.bench {
            println!(
                "  - {} ({}h/week available)",
                consultant.name, consultant.capacity_hours_per_week
            );
        }
    }
}
