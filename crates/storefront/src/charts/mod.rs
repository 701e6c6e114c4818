//! Dashboard chart data.
//!
//! The API aggregates orders per month; the dashboard can regroup those
//! buckets by calendar quarter or by year. Rendering lives in [`svg`].

pub mod svg;

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;

use grips_gears_core::Price;

use crate::api::{MonthKey, MonthlyOrders, MonthlyStat};

/// Grouping applied to monthly statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Period {
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Monthly, Self::Quarterly, Self::Yearly]
    }

    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Yearly => "Yearly",
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(Self::Monthly),
            "quarterly" | "quarter" => Ok(Self::Quarterly),
            "yearly" | "year" => Ok(Self::Yearly),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

/// One x-axis bucket of the revenue/orders charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    pub label: String,
    pub revenue: Price,
    pub orders: u64,
}

/// `MM-YYYY`.
#[must_use]
pub fn month_label(key: MonthKey) -> String {
    format!("{:02}-{}", key.month, key.year)
}

/// Calendar quarter (1-4) of a month (1-12); `None` outside 1-12.
#[must_use]
pub const fn quarter_of(month: u32) -> Option<u32> {
    match month {
        1..=12 => Some((month - 1) / 3 + 1),
        _ => None,
    }
}

/// Group monthly stats into chart buckets.
///
/// Monthly keeps the API's order. Quarters and years are summed and
/// returned in chronological order. Stats with a month outside 1-12 are
/// left out of every period.
#[must_use]
pub fn bucket(stats: &[MonthlyStat], period: Period) -> Vec<SeriesPoint> {
    let stats: Vec<&MonthlyStat> = stats
        .iter()
        .filter(|s| {
            let valid = quarter_of(s.key.month).is_some();
            if !valid {
                tracing::warn!(
                    year = s.key.year,
                    month = s.key.month,
                    "Skipping stat with invalid month"
                );
            }
            valid
        })
        .collect();

    match period {
        Period::Monthly => stats
            .iter()
            .map(|s| SeriesPoint {
                label: month_label(s.key),
                revenue: s.monthly_revenue,
                orders: s.order_count,
            })
            .collect(),
        Period::Quarterly => group(
            &stats,
            |k| (k.year, quarter_of(k.month).unwrap_or_default()),
            |(year, q)| format!("Q{q} {year}"),
        ),
        Period::Yearly => group(&stats, |k| (k.year, 0), |(year, _)| year.to_string()),
    }
}

fn group(
    stats: &[&MonthlyStat],
    key: impl Fn(MonthKey) -> (i32, u32),
    label: impl Fn((i32, u32)) -> String,
) -> Vec<SeriesPoint> {
    let mut buckets: BTreeMap<(i32, u32), (Price, u64)> = BTreeMap::new();
    for stat in stats {
        let entry = buckets.entry(key(stat.key)).or_default();
        entry.0 = entry.0 + stat.monthly_revenue;
        entry.1 += stat.order_count;
    }
    buckets
        .into_iter()
        .map(|(k, (revenue, orders))| SeriesPoint {
            label: label(k),
            revenue,
            orders,
        })
        .collect()
}

/// The user dashboard's monthly order counts as `(MM-YYYY, count)`.
#[must_use]
pub fn user_monthly_orders(months: &[MonthlyOrders]) -> Vec<(String, u64)> {
    months
        .iter()
        .map(|m| (month_label(m.key), m.order_count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(year: i32, month: u32, revenue: i64, orders: u64) -> MonthlyStat {
        MonthlyStat {
            key: MonthKey { year, month },
            monthly_revenue: Price::from_taka(revenue),
            order_count: orders,
        }
    }

    fn sample() -> Vec<MonthlyStat> {
        vec![
            stat(2024, 11, 1000, 1),
            stat(2024, 12, 2000, 2),
            stat(2025, 1, 3000, 3),
            stat(2025, 3, 500, 1),
            stat(2025, 4, 4000, 4),
        ]
    }

    #[test]
    fn test_month_label_zero_pads() {
        assert_eq!(month_label(MonthKey { year: 2025, month: 3 }), "03-2025");
        assert_eq!(month_label(MonthKey { year: 2024, month: 12 }), "12-2024");
    }

    #[test]
    fn test_monthly_keeps_input_order() {
        let points = bucket(&sample(), Period::Monthly);
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["11-2024", "12-2024", "01-2025", "03-2025", "04-2025"]);
    }

    #[test]
    fn test_quarterly_groups_calendar_quarters() {
        let points = bucket(&sample(), Period::Quarterly);
        assert_eq!(
            points,
            vec![
                SeriesPoint {
                    label: "Q4 2024".into(),
                    revenue: Price::from_taka(3000),
                    orders: 3
                },
                SeriesPoint {
                    label: "Q1 2025".into(),
                    revenue: Price::from_taka(3500),
                    orders: 4
                },
                SeriesPoint {
                    label: "Q2 2025".into(),
                    revenue: Price::from_taka(4000),
                    orders: 4
                },
            ]
        );
    }

    #[test]
    fn test_quarter_of() {
        assert_eq!(quarter_of(1), Some(1));
        assert_eq!(quarter_of(3), Some(1));
        assert_eq!(quarter_of(4), Some(2));
        assert_eq!(quarter_of(9), Some(3));
        assert_eq!(quarter_of(12), Some(4));
        assert_eq!(quarter_of(0), None);
        assert_eq!(quarter_of(13), None);
    }

    #[test]
    fn test_invalid_months_are_skipped() {
        let mut stats = sample();
        stats.push(stat(2025, 0, 9999, 9));
        stats.push(stat(2025, 13, 9999, 9));

        let quarters = bucket(&stats, Period::Quarterly);
        assert_eq!(quarters.len(), 3);
        assert_eq!(quarters[1].revenue, Price::from_taka(3500));

        let years = bucket(&stats, Period::Yearly);
        assert_eq!(years[1].orders, 8);

        assert_eq!(bucket(&stats, Period::Monthly).len(), 5);
    }

    #[test]
    fn test_yearly_ascending() {
        let mut stats = sample();
        stats.reverse();
        let points = bucket(&stats, Period::Yearly);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "2024");
        assert_eq!(points[0].orders, 3);
        assert_eq!(points[1].label, "2025");
        assert_eq!(points[1].revenue, Price::from_taka(7500));
    }

    #[test]
    fn test_empty_stats() {
        for period in Period::all() {
            assert!(bucket(&[], period).is_empty());
        }
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("Quarterly".parse(), Ok(Period::Quarterly));
        assert_eq!("yearly".parse(), Ok(Period::Yearly));
        assert!("weekly".parse::<Period>().is_err());
        assert_eq!(Period::default(), Period::Monthly);
    }
}
