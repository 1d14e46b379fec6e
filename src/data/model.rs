use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column names every source table must carry, in export order.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "city",
    "date",
    "aqi",
    "pm25",
    "pm10",
    "no2",
    "so2",
    "co",
    "o3",
    "aqi_category",
];

// ---------------------------------------------------------------------------
// Metric – one numeric column of the measurement table
// ---------------------------------------------------------------------------

/// The numeric columns of a [`Measurement`]: the AQI score and six pollutants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Aqi,
    Pm25,
    Pm10,
    No2,
    So2,
    Co,
    O3,
}

impl Metric {
    /// All numeric columns in schema order.
    pub const ALL: [Metric; 7] = [
        Metric::Aqi,
        Metric::Pm25,
        Metric::Pm10,
        Metric::No2,
        Metric::So2,
        Metric::Co,
        Metric::O3,
    ];

    /// The six pollutant concentrations (everything except AQI).
    pub const POLLUTANTS: [Metric; 6] = [
        Metric::Pm25,
        Metric::Pm10,
        Metric::No2,
        Metric::So2,
        Metric::Co,
        Metric::O3,
    ];

    /// Column header in the source table.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Aqi => "aqi",
            Metric::Pm25 => "pm25",
            Metric::Pm10 => "pm10",
            Metric::No2 => "no2",
            Metric::So2 => "so2",
            Metric::Co => "co",
            Metric::O3 => "o3",
        }
    }

    /// Human-readable label for axes and legends.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Aqi => "AQI",
            Metric::Pm25 => "PM2.5",
            Metric::Pm10 => "PM10",
            Metric::No2 => "NO2",
            Metric::So2 => "SO2",
            Metric::Co => "CO",
            Metric::O3 => "O3",
        }
    }

    /// Read this column out of a measurement.
    pub fn value(self, m: &Measurement) -> f64 {
        match self {
            Metric::Aqi => m.aqi,
            Metric::Pm25 => m.pm25,
            Metric::Pm10 => m.pm10,
            Metric::No2 => m.no2,
            Metric::So2 => m.so2,
            Metric::Co => m.co,
            Metric::O3 => m.o3,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Measurement – one row of the source table
// ---------------------------------------------------------------------------

/// One daily air-quality record for a city.
///
/// Field order matches [`REQUIRED_COLUMNS`] so serializing a row with `csv`
/// reproduces the source schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub city: String,
    pub date: NaiveDate,
    pub aqi: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub o3: f64,
    pub aqi_category: String,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// All measurements in source order. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<Measurement>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<Measurement>) -> Self {
        Dataset { rows }
    }

    pub fn rows(&self) -> &[Measurement] {
        &self.rows
    }

    /// Number of measurements.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct city names, sorted.
    pub fn cities(&self) -> BTreeSet<String> {
        self.rows.iter().map(|m| m.city.clone()).collect()
    }

    /// Earliest and latest date across every city, if any rows exist.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|m| m.date).min()?;
        let max = self.rows.iter().map(|m| m.date).max()?;
        Some((min, max))
    }
}

// ---------------------------------------------------------------------------
// Selection / FilteredSeries
// ---------------------------------------------------------------------------

/// A city and an inclusive date window, as chosen in the side panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub city: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Selection {
    pub fn new(city: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Selection {
            city: city.into(),
            start,
            end,
        }
    }

    /// Whether a measurement falls inside this selection.
    pub fn matches(&self, m: &Measurement) -> bool {
        m.city == self.city && self.start <= m.date && m.date <= self.end
    }
}

/// The measurements matching a [`Selection`], ordered by date ascending.
///
/// Rows sharing a date keep their source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredSeries {
    rows: Vec<Measurement>,
}

impl FilteredSeries {
    pub fn from_rows(mut rows: Vec<Measurement>) -> Self {
        // stable: equal dates stay in source order
        rows.sort_by_key(|m| m.date);
        FilteredSeries { rows }
    }

    pub fn rows(&self) -> &[Measurement] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Measurement> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&Measurement> {
        self.rows.last()
    }

    /// Values of one numeric column, in date order.
    pub fn values(&self, metric: Metric) -> Vec<f64> {
        self.rows.iter().map(|m| metric.value(m)).collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn measurement(city: &str, date: NaiveDate, aqi: f64, category: &str) -> Measurement {
        Measurement {
            city: city.to_string(),
            date,
            aqi,
            pm25: aqi * 0.6,
            pm10: aqi * 0.9,
            no2: 20.0,
            so2: 8.0,
            co: 1.1,
            o3: 30.0,
            aqi_category: category.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_filtered_series_sorts_by_date_and_keeps_ties_stable() {
        let rows = vec![
            measurement("Delhi", day(2020, 1, 3), 10.0, "Good"),
            measurement("Delhi", day(2020, 1, 1), 20.0, "Good"),
            measurement("Delhi", day(2020, 1, 3), 30.0, "Good"),
        ];
        let series = FilteredSeries::from_rows(rows);
        let aqis = series.values(Metric::Aqi);
        assert_eq!(aqis, vec![20.0, 10.0, 30.0]);
    }

    #[test]
    fn test_dataset_bounds_and_cities() {
        let ds = Dataset::from_rows(vec![
            measurement("Mumbai", day(2019, 5, 1), 80.0, "Moderate"),
            measurement("Delhi", day(2021, 2, 1), 300.0, "Very Unhealthy"),
            measurement("Delhi", day(2018, 7, 9), 120.0, "Unhealthy"),
        ]);
        assert_eq!(ds.date_bounds(), Some((day(2018, 7, 9), day(2021, 2, 1))));
        let cities: Vec<String> = ds.cities().into_iter().collect();
        assert_eq!(cities, vec!["Delhi".to_string(), "Mumbai".to_string()]);
        assert_eq!(Dataset::default().date_bounds(), None);
    }

    #[test]
    fn test_metric_columns_follow_schema_order() {
        let cols: Vec<&str> = Metric::ALL.iter().map(|m| m.column()).collect();
        assert_eq!(cols, REQUIRED_COLUMNS[2..9].to_vec());
    }
}
