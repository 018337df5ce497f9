use crate::config::toml_config::{PlannerConfig, StoreConfig};
use chrono::NaiveDate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "capacity-planner")]
#[command(about = "12-week utilization and profit forecast for a consulting team")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Owner (tenant) whose records are forecast
    #[arg(long, env = "PLANNER_OWNER")]
    pub owner: Option<String>,

    /// Reference date, defaults to today
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,

    /// Read records from this dataset JSON file instead of the configured store
    #[arg(long)]
    pub dataset: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Fail with a non-zero exit code instead of printing an empty forecast
    #[arg(long)]
    pub strict: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    /// Loads the configuration file (or defaults) and applies command line overrides.
    pub fn load_config(&self) -> crate::Result<PlannerConfig> {
        let mut config = match &self.config {
            Some(path) => PlannerConfig::from_file(path)?,
            None => PlannerConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut PlannerConfig) {
        if let Some(dataset) = &self.dataset {
            config.store = StoreConfig::Json {
                path: dataset.clone(),
            };
        }
        if let Some(owner) = &self.owner {
            config.forecast.owner = Some(owner.clone());
        }
        if let Some(output_path) = &self.output_path {
            config.output.output_path = output_path.clone();
        }
    }
}
