//! Week-by-week utilization and financial aggregation.
//!
//! Everything here is pure. Hours and money are accumulated as `f64` and only
//! rounded when a [`WeekTotals`] is turned into a [`WeeklyForecast`].

use crate::core::calendar::{week_label, WeekWindow};
use crate::domain::model::{
    AllocationRecord, BenchConsultant, BillingModel, Consultant, ConsultantForecast,
    ForecastResult, WeeklyForecast,
};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Unrounded totals for one week.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeekTotals {
    pub capacity_hours: f64,
    pub scheduled_hours: f64,
    pub cost: f64,
    pub revenue: f64,
}

impl WeekTotals {
    pub fn profit(&self) -> f64 {
        self.revenue - self.cost
    }

    /// Scheduled hours as a whole percentage of capacity, 0 without capacity.
    pub fn utilization(&self) -> i64 {
        if self.capacity_hours > 0.0 {
            round_half_up(self.scheduled_hours / self.capacity_hours * 100.0)
        } else {
            0
        }
    }

    pub fn accumulate(&mut self, other: &WeekTotals) {
        self.capacity_hours += other.capacity_hours;
        self.scheduled_hours += other.scheduled_hours;
        self.cost += other.cost;
        self.revenue += other.revenue;
    }

    pub fn to_forecast(&self, index: usize, week: &WeekWindow) -> WeeklyForecast {
        let week_number = index as u32 + 1;
        WeeklyForecast {
            week: week_label(week_number),
            week_number,
            week_start: week.start,
            capacity_hours: round_half_up(self.capacity_hours),
            scheduled_hours: round_half_up(self.scheduled_hours),
            utilization: self.utilization(),
            cost: round_half_up(self.cost),
            revenue: round_half_up(self.revenue),
            profit: round_half_up(self.profit()),
        }
    }
}

/// Rounds halves towards positive infinity, so `-2.5` becomes `-2`.
pub fn round_half_up(value: f64) -> i64 {
    // compare the fraction instead of adding 0.5, which carries 0.49999999999999994 up to 1
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

/// Calendar weeks covered by an allocation's own dates, never less than one.
pub fn weeks_spanned(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = (end - start).num_days().unsigned_abs();
    let weeks = days.div_ceil(7);
    weeks.max(1) as u32
}

/// Revenue one allocation earns in one overlapping week.
pub fn weekly_revenue(record: &AllocationRecord) -> f64 {
    match record.project.billing_model {
        BillingModel::Hourly => record.allocation.hours_per_week * record.consultant.bill_rate,
        BillingModel::Flat => match record.project.flat_fee {
            Some(fee) if fee != 0.0 && fee.is_finite() => {
                let weeks =
                    weeks_spanned(record.allocation.start_date, record.allocation.end_date);
                fee / f64::from(weeks)
            }
            _ => 0.0,
        },
    }
}

/// Allocations from `allocations` that touch `week`.
pub fn overlapping<'a, I>(allocations: I, week: &'a WeekWindow) -> impl Iterator<Item = &'a AllocationRecord>
where
    I: IntoIterator<Item = &'a AllocationRecord>,
{
    allocations
        .into_iter()
        .filter(move |r| week.overlaps(r.allocation.start_date, r.allocation.end_date))
}

/// Totals for one consultant in one week, given the allocations overlapping that week.
pub fn week_totals<'a, I>(consultant: &Consultant, week_allocations: I) -> WeekTotals
where
    I: IntoIterator<Item = &'a AllocationRecord>,
{
    let mut totals = WeekTotals {
        capacity_hours: consultant.capacity_hours_per_week,
        ..WeekTotals::default()
    };

    for record in week_allocations {
        let hours = record.allocation.hours_per_week;
        totals.scheduled_hours += hours;
        totals.cost += hours * record.consultant.cost_per_hour;
        totals.revenue += weekly_revenue(record);
    }

    totals
}

/// Groups allocations by consultant id, keeping fetch order inside each group.
pub fn by_consultant(allocations: &[AllocationRecord]) -> HashMap<&str, Vec<&AllocationRecord>> {
    let mut grouped: HashMap<&str, Vec<&AllocationRecord>> = HashMap::new();
    for record in allocations {
        grouped
            .entry(record.allocation.consultant_id.as_str())
            .or_default()
            .push(record);
    }
    grouped
}

pub fn consultant_series(
    consultant: &Consultant,
    own_allocations: &[&AllocationRecord],
    weeks: &[WeekWindow],
) -> Vec<WeekTotals> {
    weeks
        .iter()
        .map(|week| week_totals(consultant, overlapping(own_allocations.iter().copied(), week)))
        .collect()
}

/// Fleet totals per week. Utilization comes from the summed hours, not from averaging.
pub fn fleet_summary(series: &[Vec<WeekTotals>], week_count: usize) -> Vec<WeekTotals> {
    let mut summary = vec![WeekTotals::default(); week_count];
    for consultant_weeks in series {
        for (total, week) in summary.iter_mut().zip(consultant_weeks) {
            total.accumulate(week);
        }
    }
    summary
}

/// Consultants without any allocation in `allocations`.
pub fn bench(consultants: &[Consultant], allocations: &[AllocationRecord]) -> Vec<BenchConsultant> {
    let allocated: HashSet<&str> = allocations
        .iter()
        .map(|r| r.allocation.consultant_id.as_str())
        .collect();

    consultants
        .iter()
        .filter(|c| !allocated.contains(c.id.as_str()))
        .map(|c| BenchConsultant {
            id: c.id.clone(),
            name: c.name.clone(),
            capacity_hours_per_week: c.capacity_hours_per_week,
        })
        .collect()
}

/// Builds the forecast from already fetched records.
///
/// `allocations` is expected to hold only allocations overlapping `weeks`; the bench
/// is derived from it directly.
pub fn build_forecast(
    weeks: &[WeekWindow],
    consultants: &[Consultant],
    allocations: &[AllocationRecord],
) -> ForecastResult {
    let grouped = by_consultant(allocations);

    let series: Vec<Vec<WeekTotals>> = consultants
        .iter()
        .map(|consultant| {
            let own = grouped
                .get(consultant.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            consultant_series(consultant, own, weeks)
        })
        .collect();

    let per_consultant = consultants
        .iter()
        .zip(&series)
        .map(|(consultant, totals)| ConsultantForecast {
            consultant_id: consultant.id.clone(),
            consultant_name: consultant.name.clone(),
            weeks: to_forecasts(totals, weeks),
        })
        .collect();

    let weekly_summary = to_forecasts(&fleet_summary(&series, weeks.len()), weeks);

    ForecastResult {
        per_consultant,
        weekly_summary,
        bench: bench(consultants, allocations),
        total_consultants: consultants.len(),
    }
}

/// Structurally complete forecast with every week zeroed.
pub fn empty_forecast(weeks: &[WeekWindow]) -> ForecastResult {
    ForecastResult {
        per_consultant: Vec::new(),
        weekly_summary: to_forecasts(&vec![WeekTotals::default(); weeks.len()], weeks),
        bench: Vec::new(),
        total_consultants: 0,
    }
}

fn to_forecasts(totals: &[WeekTotals], weeks: &[WeekWindow]) -> Vec<WeeklyForecast> {
    totals
        .iter()
        .zip(weeks)
        .enumerate()
        .map(|(index, (total, week))| total.to_forecast(index, week))
        .collect()
}
