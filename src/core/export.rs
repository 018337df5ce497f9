use crate::core::{ConsultantForecast, ForecastResult, Storage, WeeklyForecast};
use crate::utils::error::{PlannerError, Result};
use serde::{Deserialize, Serialize};

pub const SUMMARY_CSV: &str = "weekly-summary.csv";
pub const CONSULTANTS_CSV: &str = "consultant-weeks.csv";
pub const FORECAST_JSON: &str = "forecast.json";

const SUMMARY_HEADERS: [&str; 7] = [
    "Week",
    "Capacity Hours",
    "Scheduled Hours",
    "Utilization %",
    "Cost $",
    "Revenue $",
    "Profit $",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub const ALL: [&'static str; 2] = ["csv", "json"];

    pub fn parse(field_name: &str, value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(PlannerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.to_string(),
                reason: format!("Unsupported format. Valid formats: {}", Self::ALL.join(", ")),
            }),
        }
    }
}

fn week_row(week: &WeeklyForecast) -> [String; 7] {
    [
        week.week.clone(),
        week.capacity_hours.to_string(),
        week.scheduled_hours.to_string(),
        week.utilization.to_string(),
        week.cost.to_string(),
        week.revenue.to_string(),
        week.profit.to_string(),
    ]
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| {
        PlannerError::IoError(std::io::Error::new(e.error().kind(), e.error().to_string()))
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Weekly fleet summary, one row per week.
pub fn weekly_summary_csv(weeks: &[WeeklyForecast]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SUMMARY_HEADERS)?;
    for week in weeks {
        writer.write_record(week_row(week))?;
    }
    finish(writer)
}

/// Long format: one row per consultant and week.
pub fn consultant_weeks_csv(consultants: &[ConsultantForecast]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut headers = vec!["Consultant"];
    headers.extend(SUMMARY_HEADERS);
    writer.write_record(&headers)?;

    for consultant in consultants {
        for week in &consultant.weeks {
            let mut row = vec![consultant.consultant_name.clone()];
            row.extend(week_row(week));
            writer.write_record(&row)?;
        }
    }
    finish(writer)
}

pub struct ReportWriter<S: Storage> {
    storage: S,
    formats: Vec<OutputFormat>,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S, formats: Vec<OutputFormat>) -> Self {
        Self { storage, formats }
    }

    /// Writes every configured report and returns the file names written.
    pub async fn write(&self, result: &ForecastResult) -> Result<Vec<String>> {
        let mut written = Vec::new();

        for format in &self.formats {
            match format {
                OutputFormat::Csv => {
                    let summary = weekly_summary_csv(&result.weekly_summary)?;
                    self.storage.write_file(SUMMARY_CSV, summary.as_bytes()).await?;
                    written.push(SUMMARY_CSV.to_string());

                    let consultants = consultant_weeks_csv(&result.per_consultant)?;
                    self.storage
                        .write_file(CONSULTANTS_CSV, consultants.as_bytes())
                        .await?;
                    written.push(CONSULTANTS_CSV.to_string());
                }
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(result)?;
                    self.storage.write_file(FORECAST_JSON, json.as_bytes()).await?;
                    written.push(FORECAST_JSON.to_string());
                }
            }
        }

        tracing::debug!("Wrote {} report files", written.len());
        Ok(written)
    }
}
