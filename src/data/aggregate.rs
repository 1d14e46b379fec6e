use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use super::error::InsufficientDataError;
use super::model::{FilteredSeries, Measurement, Metric};

// ---------------------------------------------------------------------------
// Health status bands
// ---------------------------------------------------------------------------

/// Five ordered bands a mean AQI falls into.
///
/// Upper bounds are inclusive: 50 is still `Good`, anything above 50 up to
/// and including 100 is `Moderate`, and so on; everything above 300 is
/// `Hazardous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthStatus {
    Good,
    Moderate,
    UnhealthySensitive,
    VeryUnhealthy,
    Hazardous,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 5] = [
        HealthStatus::Good,
        HealthStatus::Moderate,
        HealthStatus::UnhealthySensitive,
        HealthStatus::VeryUnhealthy,
        HealthStatus::Hazardous,
    ];

    /// Classify a (mean) AQI value.
    pub fn from_aqi(aqi: f64) -> Self {
        match aqi {
            a if a <= 50.0 => HealthStatus::Good,
            a if a <= 100.0 => HealthStatus::Moderate,
            a if a <= 200.0 => HealthStatus::UnhealthySensitive,
            a if a <= 300.0 => HealthStatus::VeryUnhealthy,
            _ => HealthStatus::Hazardous,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Good => "Good",
            HealthStatus::Moderate => "Moderate",
            HealthStatus::UnhealthySensitive => "Unhealthy (sensitive groups)",
            HealthStatus::VeryUnhealthy => "Very Unhealthy",
            HealthStatus::Hazardous => "Hazardous",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            HealthStatus::Good => "Air quality is satisfactory. Enjoy outdoor activities.",
            HealthStatus::Moderate => {
                "Acceptable air. Unusually sensitive people should limit prolonged exertion."
            }
            HealthStatus::UnhealthySensitive => {
                "Children, the elderly and people with lung disease should reduce outdoor activity."
            }
            HealthStatus::VeryUnhealthy => {
                "Everyone may feel health effects. Avoid long or heavy outdoor exertion."
            }
            HealthStatus::Hazardous => "Emergency conditions. Stay indoors and wear a mask outside.",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Scalar reductions
// ---------------------------------------------------------------------------

fn require_rows(
    series: &FilteredSeries,
    statistic: &'static str,
) -> Result<(), InsufficientDataError> {
    if series.is_empty() {
        Err(InsufficientDataError::new(statistic, 0))
    } else {
        Ok(())
    }
}

/// Measurement with the lowest AQI; the earliest one on ties.
pub fn best_day(series: &FilteredSeries) -> Result<&Measurement, InsufficientDataError> {
    series
        .rows()
        .iter()
        .reduce(|best, m| if m.aqi < best.aqi { m } else { best })
        .ok_or_else(|| InsufficientDataError::new("best day", 0))
}

/// Measurement with the highest AQI; the earliest one on ties.
pub fn worst_day(series: &FilteredSeries) -> Result<&Measurement, InsufficientDataError> {
    series
        .rows()
        .iter()
        .reduce(|worst, m| if m.aqi > worst.aqi { m } else { worst })
        .ok_or_else(|| InsufficientDataError::new("worst day", 0))
}

pub fn min_aqi(series: &FilteredSeries) -> Result<f64, InsufficientDataError> {
    require_rows(series, "minimum AQI")?;
    best_day(series).map(|m| m.aqi)
}

pub fn max_aqi(series: &FilteredSeries) -> Result<f64, InsufficientDataError> {
    require_rows(series, "maximum AQI")?;
    worst_day(series).map(|m| m.aqi)
}

pub fn mean_aqi(series: &FilteredSeries) -> Result<f64, InsufficientDataError> {
    require_rows(series, "mean AQI")?;
    let mean = mean(series.rows().iter().map(|m| m.aqi), series.len());
    // summation rounding can land a hair outside the observed range
    Ok(mean.clamp(min_aqi(series)?, max_aqi(series)?))
}

fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    values.sum::<f64>() / n as f64
}

/// Mean concentration of each pollutant, in [`Metric::POLLUTANTS`] order.
pub fn pollutant_means(
    series: &FilteredSeries,
) -> Result<Vec<(Metric, f64)>, InsufficientDataError> {
    require_rows(series, "pollutant means")?;
    Ok(Metric::POLLUTANTS
        .iter()
        .map(|&metric| {
            let avg = mean(series.rows().iter().map(|m| metric.value(m)), series.len());
            (metric, avg)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// `(category, count)` pairs, most frequent first; equal counts by name.
pub fn category_counts(series: &FilteredSeries) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for m in series.rows() {
        *counts.entry(m.aqi_category.as_str()).or_default() += 1;
    }
    let mut pairs: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(cat, n)| (cat.to_string(), n))
        .collect();
    // stable sort keeps the BTreeMap's name order among ties
    pairs.sort_by(|a, b| b.1.cmp(&a.1));
    pairs
}

/// Most frequent category; lexicographically smallest among ties.
pub fn modal_category(series: &FilteredSeries) -> Result<String, InsufficientDataError> {
    category_counts(series)
        .into_iter()
        .next()
        .map(|(cat, _)| cat)
        .ok_or_else(|| InsufficientDataError::new("most common category", 0))
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation between every pair of numeric columns.
///
/// Cells involving a constant column (or fewer than two rows) are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub metrics: Vec<Metric>,
    /// Row-major, `metrics.len()` × `metrics.len()`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Metric, b: Metric) -> Option<f64> {
        let i = self.metrics.iter().position(|&m| m == a)?;
        let j = self.metrics.iter().position(|&m| m == b)?;
        Some(self.values[i][j])
    }
}

/// Correlation of AQI and the six pollutants.
pub fn correlation_matrix(series: &FilteredSeries) -> CorrelationMatrix {
    correlation_matrix_for(series, &Metric::ALL)
}

pub fn correlation_matrix_for(series: &FilteredSeries, metrics: &[Metric]) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = metrics.iter().map(|&m| series.values(m)).collect();
    let n = metrics.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = if i == j {
                if !is_degenerate(&columns[i]) {
                    1.0
                } else {
                    f64::NAN
                }
            } else {
                pearson(&columns[i], &columns[j])
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix {
        metrics: metrics.to_vec(),
        values,
    }
}

/// Fewer than two values, or every value identical.  The mean of a constant
/// column like `0.1` picks up rounding error, so a sum-of-squares test would
/// see a tiny positive variance here.
fn is_degenerate(xs: &[f64]) -> bool {
    xs.len() < 2 || xs.iter().all(|x| *x == xs[0])
}

/// Sum of squared deviations from the mean (unnormalised).
fn variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs.iter().copied(), xs.len());
    xs.iter().map(|x| (x - m).powi(2)).sum()
}

/// Pearson's r, or `NaN` when either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    if is_degenerate(xs) || is_degenerate(ys) {
        return f64::NAN;
    }
    let mx = mean(xs.iter().copied(), n);
    let my = mean(ys.iter().copied(), n);
    let cov: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    let vx = variance(xs);
    let vy = variance(ys);
    if vx <= 0.0 || vy <= 0.0 {
        return f64::NAN;
    }
    (cov / (vx.sqrt() * vy.sqrt())).clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// Period means (monthly / yearly trend charts)
// ---------------------------------------------------------------------------

/// Mean AQI over one calendar month or year.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodMean {
    pub period_start: NaiveDate,
    pub mean_aqi: f64,
    pub observations: usize,
}

pub fn monthly_mean_aqi(series: &FilteredSeries) -> Vec<PeriodMean> {
    period_means(series, |d| (d.year(), d.month()))
}

pub fn yearly_mean_aqi(series: &FilteredSeries) -> Vec<PeriodMean> {
    period_means(series, |d| (d.year(), 1))
}

fn period_means(
    series: &FilteredSeries,
    key: impl Fn(NaiveDate) -> (i32, u32),
) -> Vec<PeriodMean> {
    let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for m in series.rows() {
        let slot = buckets.entry(key(m.date)).or_insert((0.0, 0));
        slot.0 += m.aqi;
        slot.1 += 1;
    }
    buckets
        .into_iter()
        .filter_map(|((year, month), (sum, count))| {
            Some(PeriodMean {
                period_start: NaiveDate::from_ymd_opt(year, month, 1)?,
                mean_aqi: sum / count as f64,
                observations: count,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// AggregateSummary
// ---------------------------------------------------------------------------

/// Every scalar the KPI and insight panels show for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSummary {
    pub observations: usize,
    pub mean_aqi: f64,
    pub max_aqi: f64,
    pub min_aqi: f64,
    pub best_day: Measurement,
    pub worst_day: Measurement,
    pub modal_category: String,
    pub correlation: CorrelationMatrix,
    pub health_status: HealthStatus,
}

impl AggregateSummary {
    /// Summarise a non-empty series.
    pub fn compute(series: &FilteredSeries) -> Result<Self, InsufficientDataError> {
        require_rows(series, "summary")?;
        let mean_aqi = mean_aqi(series)?;
        Ok(AggregateSummary {
            observations: series.len(),
            mean_aqi,
            max_aqi: max_aqi(series)?,
            min_aqi: min_aqi(series)?,
            best_day: best_day(series)?.clone(),
            worst_day: worst_day(series)?.clone(),
            modal_category: modal_category(series)?,
            correlation: correlation_matrix(series),
            health_status: HealthStatus::from_aqi(mean_aqi),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::test_support::{day, measurement};

    fn series(aqis: &[f64]) -> FilteredSeries {
        let start = day(2021, 1, 1);
        FilteredSeries::from_rows(
            aqis.iter()
                .enumerate()
                .map(|(i, &aqi)| {
                    let cat = HealthStatus::from_aqi(aqi).label();
                    measurement("Delhi", start + chrono::Days::new(i as u64), aqi, cat)
                })
                .collect(),
        )
    }

    #[test]
    fn test_health_status_boundaries() {
        assert_eq!(HealthStatus::from_aqi(0.0), HealthStatus::Good);
        assert_eq!(HealthStatus::from_aqi(50.0), HealthStatus::Good);
        assert_eq!(HealthStatus::from_aqi(50.5), HealthStatus::Moderate);
        assert_eq!(HealthStatus::from_aqi(51.0), HealthStatus::Moderate);
        assert_eq!(HealthStatus::from_aqi(100.0), HealthStatus::Moderate);
        assert_eq!(HealthStatus::from_aqi(101.0), HealthStatus::UnhealthySensitive);
        assert_eq!(HealthStatus::from_aqi(200.0), HealthStatus::UnhealthySensitive);
        assert_eq!(HealthStatus::from_aqi(201.0), HealthStatus::VeryUnhealthy);
        assert_eq!(HealthStatus::from_aqi(300.0), HealthStatus::VeryUnhealthy);
        assert_eq!(HealthStatus::from_aqi(301.0), HealthStatus::Hazardous);
        assert_eq!(HealthStatus::from_aqi(999.0), HealthStatus::Hazardous);
    }

    #[test]
    fn test_health_status_is_monotonic() {
        let mut last = HealthStatus::Good;
        for tenth in 0..6000 {
            let status = HealthStatus::from_aqi(tenth as f64 / 10.0);
            assert!(status >= last);
            last = status;
        }
        assert_eq!(last, HealthStatus::Hazardous);
    }

    #[test]
    fn test_empty_series_is_insufficient() {
        let empty = FilteredSeries::default();
        assert!(mean_aqi(&empty).is_err());
        assert!(min_aqi(&empty).is_err());
        assert!(max_aqi(&empty).is_err());
        assert!(best_day(&empty).is_err());
        assert!(worst_day(&empty).is_err());
        assert!(modal_category(&empty).is_err());
        assert!(pollutant_means(&empty).is_err());
        let err = AggregateSummary::compute(&empty).unwrap_err();
        assert_eq!(err.observations, 0);
        assert!(category_counts(&empty).is_empty());
        assert!(monthly_mean_aqi(&empty).is_empty());
    }

    #[test]
    fn test_scalar_reductions() {
        let s = series(&[120.0, 80.0, 200.0, 40.0]);
        assert_eq!(mean_aqi(&s).unwrap(), 110.0);
        assert_eq!(min_aqi(&s).unwrap(), 40.0);
        assert_eq!(max_aqi(&s).unwrap(), 200.0);
        assert_eq!(best_day(&s).unwrap().date, day(2021, 1, 4));
        assert_eq!(worst_day(&s).unwrap().date, day(2021, 1, 3));
    }

    #[test]
    fn test_ties_resolve_to_earliest_date() {
        let s = series(&[90.0, 30.0, 250.0, 30.0, 250.0]);
        assert_eq!(best_day(&s).unwrap().date, day(2021, 1, 2));
        assert_eq!(worst_day(&s).unwrap().date, day(2021, 1, 3));
    }

    #[test]
    fn test_mean_stays_within_min_max_for_constant_series() {
        let s = series(&[0.1, 0.1, 0.1]);
        let mean = mean_aqi(&s).unwrap();
        assert!(min_aqi(&s).unwrap() <= mean && mean <= max_aqi(&s).unwrap());
    }

    #[test]
    fn test_modal_category_tie_takes_smallest_name() {
        let rows = vec![
            measurement("Goa", day(2020, 1, 1), 60.0, "Moderate"),
            measurement("Goa", day(2020, 1, 2), 20.0, "Good"),
            measurement("Goa", day(2020, 1, 3), 70.0, "Moderate"),
            measurement("Goa", day(2020, 1, 4), 30.0, "Good"),
            measurement("Goa", day(2020, 1, 5), 130.0, "Unhealthy"),
        ];
        let s = FilteredSeries::from_rows(rows);
        assert_eq!(modal_category(&s).unwrap(), "Good");
        assert_eq!(
            category_counts(&s),
            vec![
                ("Good".to_string(), 2),
                ("Moderate".to_string(), 2),
                ("Unhealthy".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_pearson() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
        assert!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).is_nan());
        assert!(pearson(&[1.0], &[1.0]).is_nan());
        assert!(pearson(&[1.0, 2.0, 3.0], &[0.1, 0.1, 0.1]).is_nan());
    }

    #[test]
    fn test_inexact_constant_column_is_undefined() {
        let start = day(2021, 1, 1);
        let rows = (0..10)
            .map(|i| {
                let aqi = 60.0 + 7.0 * i as f64;
                let cat = HealthStatus::from_aqi(aqi).label();
                let mut m = measurement("Delhi", start + chrono::Days::new(i), aqi, cat);
                m.co = 0.1;
                m
            })
            .collect();
        let corr = correlation_matrix(&FilteredSeries::from_rows(rows));
        assert!(corr.get(Metric::Co, Metric::Co).unwrap().is_nan());
        assert!(corr.get(Metric::Aqi, Metric::Co).unwrap().is_nan());
        assert!(corr.get(Metric::Co, Metric::Pm25).unwrap().is_nan());
        assert_eq!(corr.get(Metric::Aqi, Metric::Aqi), Some(1.0));
    }

    #[test]
    fn test_correlation_matrix_shape_and_constant_columns() {
        let s = series(&[50.0, 80.0, 120.0, 160.0]);
        let corr = correlation_matrix(&s);
        assert_eq!(corr.metrics.len(), 7);
        assert_eq!(corr.values.len(), 7);
        // pm25 is a linear function of aqi in the fixture
        assert!((corr.get(Metric::Aqi, Metric::Pm25).unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(corr.get(Metric::Aqi, Metric::Aqi), Some(1.0));
        // no2 is constant
        assert!(corr.get(Metric::No2, Metric::No2).unwrap().is_nan());
        assert!(corr.get(Metric::Aqi, Metric::No2).unwrap().is_nan());
        for i in 0..7 {
            for j in 0..7 {
                let (a, b) = (corr.values[i][j], corr.values[j][i]);
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }
    }

    #[test]
    fn test_period_means() {
        let rows = vec![
            measurement("Pune", day(2020, 1, 10), 100.0, "Moderate"),
            measurement("Pune", day(2020, 1, 20), 50.0, "Good"),
            measurement("Pune", day(2020, 3, 1), 70.0, "Moderate"),
            measurement("Pune", day(2021, 3, 1), 10.0, "Good"),
        ];
        let s = FilteredSeries::from_rows(rows);
        let monthly = monthly_mean_aqi(&s);
        assert_eq!(monthly.len(), 3);
        assert_eq!(monthly[0].period_start, day(2020, 1, 1));
        assert_eq!(monthly[0].mean_aqi, 75.0);
        assert_eq!(monthly[0].observations, 2);

        let yearly = yearly_mean_aqi(&s);
        assert_eq!(yearly.len(), 2);
        assert_eq!(yearly[0].period_start, day(2020, 1, 1));
        assert!((yearly[0].mean_aqi - 220.0 / 3.0).abs() < 1e-9);
        assert_eq!(yearly[1].mean_aqi, 10.0);
    }

    #[test]
    fn test_summary_bundles_everything() {
        let s = series(&[40.0, 60.0, 80.0]);
        let summary = AggregateSummary::compute(&s).unwrap();
        assert_eq!(summary.observations, 3);
        assert_eq!(summary.mean_aqi, 60.0);
        assert_eq!(summary.best_day.aqi, summary.min_aqi);
        assert_eq!(summary.worst_day.aqi, summary.max_aqi);
        assert_eq!(summary.health_status, HealthStatus::Moderate);
        assert_eq!(summary.modal_category, "Moderate");
    }
}
