use crate::utils::error::{PlannerError, Result};
use chrono::NaiveDate;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(PlannerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PlannerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PlannerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(PlannerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PlannerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(PlannerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| PlannerError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PlannerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(PlannerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Unsupported value. Valid values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}

// 以下為資料紀錄的檢查，錯誤型別與設定檢查不同

pub fn validate_record_name(entity: &'static str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PlannerError::InvalidRecordError {
            entity,
            field: "name".to_string(),
            reason: "Name cannot be empty".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_negative(entity: &'static str, field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlannerError::InvalidRecordError {
            entity,
            field: field_name.to_string(),
            reason: format!("Value must be a non-negative number, got {}", value),
        });
    }
    Ok(())
}

pub fn validate_positive_hours(entity: &'static str, field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PlannerError::InvalidRecordError {
            entity,
            field: field_name.to_string(),
            reason: "Hours per week must be greater than 0".to_string(),
        });
    }
    Ok(())
}

pub fn validate_date_range(entity: &'static str, start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(PlannerError::InvalidRecordError {
            entity,
            field: "start_date".to_string(),
            reason: format!(
                "Start date must be before or equal to end date ({} > {})",
                start, end
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("store.endpoint", "https://example.com").is_ok());
        assert!(validate_url("store.endpoint", "http://example.com").is_ok());
        assert!(validate_url("store.endpoint", "").is_err());
        assert!(validate_url("store.endpoint", "invalid-url").is_err());
        assert!(validate_url("store.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("forecast.fetch_timeout_seconds", 10, 1).is_ok());
        assert!(validate_positive_number("forecast.fetch_timeout_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_one_of() {
        assert!(validate_one_of("output.output_formats", "csv", &["csv", "json"]).is_ok());
        assert!(validate_one_of("output.output_formats", "xlsx", &["csv", "json"]).is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert!(validate_date_range("allocation", start, end).is_ok());
        assert!(validate_date_range("allocation", start, start).is_ok());
        assert!(matches!(
            validate_date_range("allocation", end, start),
            Err(PlannerError::InvalidRecordError { entity: "allocation", .. })
        ));
    }

    #[test]
    fn test_validate_hours_and_amounts() {
        assert!(validate_positive_hours("allocation", "hours_per_week", 0.5).is_ok());
        assert!(validate_positive_hours("allocation", "hours_per_week", 0.0).is_err());
        assert!(validate_non_negative("consultant", "cost_per_hour", 0.0).is_ok());
        assert!(validate_non_negative("consultant", "cost_per_hour", -1.0).is_err());
        assert!(validate_non_negative("consultant", "cost_per_hour", f64::NAN).is_err());
    }
}
