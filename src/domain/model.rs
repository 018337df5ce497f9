use crate::utils::error::Result;
use crate::utils::validation::{
    validate_date_range, validate_non_negative, validate_positive_hours, validate_record_name,
    Validate,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tenant key handed over by the identity provider. Every store query is scoped by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultant {
    pub id: String,
    pub name: String,
    pub cost_per_hour: f64,
    pub bill_rate: f64,
    pub capacity_hours_per_week: f64,
    pub user_id: OwnerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub user_id: OwnerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingModel {
    Hourly,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub client_id: String,
    pub name: String,
    pub billing_model: BillingModel,
    #[serde(default)]
    pub flat_fee: Option<f64>,
    pub user_id: OwnerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: String,
    pub consultant_id: String,
    pub project_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hours_per_week: f64,
    pub user_id: OwnerId,
}

/// Consultant columns joined onto an allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultantRates {
    pub name: String,
    pub cost_per_hour: f64,
    pub bill_rate: f64,
    pub capacity_hours_per_week: f64,
}

/// Project columns joined onto an allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectBilling {
    pub name: String,
    pub billing_model: BillingModel,
    #[serde(default)]
    pub flat_fee: Option<f64>,
    #[serde(default)]
    pub client_name: Option<String>,
}

/// An allocation enriched with everything the engine needs, so one query is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    #[serde(flatten)]
    pub allocation: Allocation,
    pub consultant: ConsultantRates,
    pub project: ProjectBilling,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyForecast {
    pub week: String,
    pub week_number: u32,
    pub week_start: NaiveDate,
    pub capacity_hours: i64,
    pub scheduled_hours: i64,
    pub utilization: i64,
    pub cost: i64,
    pub revenue: i64,
    pub profit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantForecast {
    pub consultant_id: String,
    pub consultant_name: String,
    pub weeks: Vec<WeeklyForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchConsultant {
    pub id: String,
    pub name: String,
    pub capacity_hours_per_week: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub per_consultant: Vec<ConsultantForecast>,
    pub weekly_summary: Vec<WeeklyForecast>,
    pub bench: Vec<BenchConsultant>,
    pub total_consultants: usize,
}

/// Colour band used by dashboards for a utilization percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilizationBand {
    Healthy,
    Stretched,
    Overbooked,
}

impl UtilizationBand {
    pub fn classify(utilization: i64) -> Self {
        match utilization {
            u if u <= 100 => UtilizationBand::Healthy,
            u if u <= 120 => UtilizationBand::Stretched,
            _ => UtilizationBand::Overbooked,
        }
    }
}

impl WeeklyForecast {
    pub fn band(&self) -> UtilizationBand {
        UtilizationBand::classify(self.utilization)
    }
}

impl Validate for Client {
    fn validate(&self) -> Result<()> {
        validate_record_name("client", &self.name)
    }
}

impl Validate for Consultant {
    fn validate(&self) -> Result<()> {
        validate_record_name("consultant", &self.name)?;
        validate_non_negative("consultant", "cost_per_hour", self.cost_per_hour)?;
        validate_non_negative("consultant", "bill_rate", self.bill_rate)?;
        validate_non_negative(
            "consultant",
            "capacity_hours_per_week",
            self.capacity_hours_per_week,
        )
    }
}

impl Validate for Project {
    fn validate(&self) -> Result<()> {
        validate_record_name("project", &self.name)?;
        if let Some(fee) = self.flat_fee {
            validate_non_negative("project", "flat_fee", fee)?;
        }
        Ok(())
    }
}

impl Validate for Allocation {
    fn validate(&self) -> Result<()> {
        validate_date_range("allocation", self.start_date, self.end_date)?;
        validate_positive_hours("allocation", "hours_per_week", self.hours_per_week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_validation() {
        let mut allocation = Allocation {
            id: "a1".to_string(),
            consultant_id: "c1".to_string(),
            project_id: "p1".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            hours_per_week: 8.0,
            user_id: OwnerId::new("owner"),
        };
        assert!(allocation.validate().is_ok());

        allocation.hours_per_week = 0.0;
        assert!(allocation.validate().is_err());

        allocation.hours_per_week = 8.0;
        allocation.end_date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        assert!(allocation.validate().is_err());
    }

    #[test]
    fn test_project_flat_fee_must_not_be_negative() {
        let project = Project {
            id: "p1".to_string(),
            client_id: "cl1".to_string(),
            name: "Audit".to_string(),
            billing_model: BillingModel::Flat,
            flat_fee: Some(-5.0),
            user_id: OwnerId::new("owner"),
        };
        assert!(project.validate().is_err());
    }

    #[test]
    fn test_utilization_band_thresholds() {
        assert_eq!(UtilizationBand::classify(0), UtilizationBand::Healthy);
        assert_eq!(UtilizationBand::classify(100), UtilizationBand::Healthy);
        assert_eq!(UtilizationBand::classify(101), UtilizationBand::Stretched);
        assert_eq!(UtilizationBand::classify(120), UtilizationBand::Stretched);
        assert_eq!(UtilizationBand::classify(121), UtilizationBand::Overbooked);
    }

    #[test]
    fn test_allocation_record_reads_joined_row() {
        let row = serde_json::json!({
            "id": "a1",
            "consultant_id": "c1",
            "project_id": "p1",
            "start_date": "2025-03-03",
            "end_date": "2025-03-23",
            "hours_per_week": 20,
            "user_id": "owner-1",
            "consultant": {"name": "Ada", "cost_per_hour": 100, "bill_rate": 150, "capacity_hours_per_week": 40},
            "project": {"name": "Migration", "billing_model": "flat", "flat_fee": 9000}
        });

        let record: AllocationRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.allocation.user_id, OwnerId::new("owner-1"));
        assert_eq!(record.project.billing_model, BillingModel::Flat);
        assert_eq!(record.project.flat_fee, Some(9000.0));
        assert_eq!(record.project.client_name, None);
    }

    #[test]
    fn test_forecast_result_uses_camel_case_keys() {
        let result = ForecastResult {
            per_consultant: vec![],
            weekly_summary: vec![],
            bench: vec![BenchConsultant {
                id: "c1".to_string(),
                name: "Ada".to_string(),
                capacity_hours_per_week: 40.0,
            }],
            total_consultants: 1,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("perConsultant").is_some());
        assert!(value.get("weeklySummary").is_some());
        assert_eq!(value["totalConsultants"], 1);
        assert_eq!(value["bench"][0]["capacityHoursPerWeek"], 40.0);
    }
}
