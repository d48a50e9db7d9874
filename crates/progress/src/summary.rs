//! Daily measurement summaries.

use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::Serialize;
use vitals_core::Measurement;

/// Average of one day's measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    /// UTC calendar day
    pub day: NaiveDate,
    /// Mean value
    pub average: f64,
    /// Number of measurements
    pub count: usize,
}

/// Group measurements by UTC day and average them, oldest day first.
///
/// When `kind` is given only measurements of that type are included.
pub fn daily_averages(measurements: &[Measurement], kind: Option<&str>) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

    for m in measurements {
        if kind.is_some_and(|k| m.kind != k) {
            continue;
        }
        let entry = days.entry(m.timestamp.date_naive()).or_insert((0.0, 0));
        entry.0 += m.value;
        entry.1 += 1;
    }

    days.into_iter()
        .map(|(day, (sum, count))| DailySummary {
            day,
            average: sum / count as f64,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vitals_core::SubjectId;

    fn at(day: u32, hour: u32, kind: &str, value: f64) -> Measurement {
        Measurement::new(SubjectId::new("s"), kind, value, None)
            .with_timestamp(Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap())
    }

    #[test]
    fn test_groups_by_day_sorted() {
        let measurements = vec![
            at(2, 9, "weight", 70.0),
            at(1, 8, "weight", 71.0),
            at(1, 20, "weight", 73.0),
        ];
        let summary = daily_averages(&measurements, None);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].day, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(summary[0].average, 72.0);
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[1].average, 70.0);
    }

    #[test]
    fn test_kind_filter() {
        let measurements = vec![at(1, 8, "weight", 70.0), at(1, 9, "glucose", 95.0)];
        let summary = daily_averages(&measurements, Some("glucose"));
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].average, 95.0);
        assert!(daily_averages(&[], None).is_empty());
    }
}
