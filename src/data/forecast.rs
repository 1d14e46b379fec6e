use chrono::NaiveDate;

use super::model::{FilteredSeries, Metric};

/// Fewest observations a trend is fitted on.
pub const MIN_OBSERVATIONS: usize = 30;

/// Number of future days predicted.
pub const HORIZON: usize = 7;

// ---------------------------------------------------------------------------
// Linear trend (ordinary least squares on observation index)
// ---------------------------------------------------------------------------

/// `aqi ≈ intercept + slope × index`, where index counts observations in
/// date order starting at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Closed-form OLS fit of `ys` against `0..ys.len()`.
    ///
    /// Returns `None` for fewer than two points (the slope is undefined).
    pub fn fit(ys: &[f64]) -> Option<Self> {
        let n = ys.len();
        if n < 2 {
            return None;
        }
        let nf = n as f64;
        let mean_x = (nf - 1.0) / 2.0;
        let mean_y = ys.iter().sum::<f64>() / nf;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (i, y) in ys.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxy += dx * (y - mean_y);
            sxx += dx * dx;
        }
        let slope = sxy / sxx;
        Some(LinearTrend {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn predict(&self, index: usize) -> f64 {
        self.intercept + self.slope * index as f64
    }
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Raw model output; may leave the 0–500 range.
    pub aqi: f64,
}

/// Result of [`forecast`]: either a prediction or a reason there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum Forecast {
    Unavailable {
        observations: usize,
        required: usize,
    },
    Available {
        trend: LinearTrend,
        points: Vec<ForecastPoint>,
    },
}

impl Forecast {
    pub fn is_available(&self) -> bool {
        matches!(self, Forecast::Available { .. })
    }

    pub fn points(&self) -> &[ForecastPoint] {
        match self {
            Forecast::Available { points, .. } => points,
            Forecast::Unavailable { .. } => &[],
        }
    }
}

/// Extrapolate the AQI trend [`HORIZON`] days past the last observation,
/// or decline with fewer than [`MIN_OBSERVATIONS`] rows.
pub fn forecast(series: &FilteredSeries) -> Forecast {
    forecast_with(series, MIN_OBSERVATIONS, HORIZON)
}

/// [`forecast`] with explicit thresholds.
///
/// Steps are counted in observations, not calendar days: gaps in the input
/// are ignored both when fitting and when dating the predictions, which run
/// one calendar day apart from the day after the last observation.
pub fn forecast_with(
    series: &FilteredSeries,
    min_observations: usize,
    horizon: usize,
) -> Forecast {
    let required = min_observations.max(2);
    let observations = series.len();
    let unavailable = Forecast::Unavailable {
        observations,
        required,
    };
    if observations < required {
        log::debug!("forecast unavailable: {observations} of {required} observations");
        return unavailable;
    }

    let (Some(trend), Some(last)) = (LinearTrend::fit(&series.values(Metric::Aqi)), series.last())
    else {
        return unavailable;
    };

    let dates = std::iter::successors(last.date.succ_opt(), |d| d.succ_opt());
    let points: Vec<ForecastPoint> = dates
        .take(horizon)
        .enumerate()
        .map(|(step, date)| ForecastPoint {
            date,
            aqi: trend.predict(observations + step),
        })
        .collect();

    log::debug!(
        "forecast fitted on {observations} observations: slope {:.3}, intercept {:.3}",
        trend.slope,
        trend.intercept
    );
    Forecast::Available { trend, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::test_support::{day, measurement};

    fn daily(aqis: impl IntoIterator<Item = f64>) -> FilteredSeries {
        let start = day(2022, 1, 1);
        FilteredSeries::from_rows(
            aqis.into_iter()
                .enumerate()
                .map(|(i, aqi)| measurement("Delhi", start + chrono::Days::new(i as u64), aqi, "x"))
                .collect(),
        )
    }

    #[test]
    fn test_fit_exact_line() {
        let trend = LinearTrend::fit(&[3.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((trend.slope - 2.0).abs() < 1e-12);
        assert!((trend.intercept - 3.0).abs() < 1e-12);
        assert!((trend.predict(10) - 23.0).abs() < 1e-12);
        assert!(LinearTrend::fit(&[1.0]).is_none());
    }

    #[test]
    fn test_unavailable_below_threshold() {
        let s = daily((0..29).map(|i| i as f64));
        assert_eq!(
            forecast(&s),
            Forecast::Unavailable {
                observations: 29,
                required: 30
            }
        );
        assert!(!forecast(&FilteredSeries::default()).is_available());
        assert!(forecast(&FilteredSeries::default()).points().is_empty());
    }

    #[test]
    fn test_available_at_threshold() {
        let s = daily((0..30).map(|i| 50.0 + i as f64));
        let f = forecast(&s);
        assert!(f.is_available());
        let points = f.points();
        assert_eq!(points.len(), HORIZON);
        assert_eq!(points[0].date, day(2022, 1, 31));
        assert_eq!(points[6].date, day(2022, 2, 6));
        assert!((points[0].aqi - 80.0).abs() < 1e-9);
        assert!(points.windows(2).all(|w| w[1].aqi > w[0].aqi));
    }

    #[test]
    fn test_gaps_are_ignored() {
        // one observation per week; predictions are still daily
        let start = day(2022, 1, 1);
        let rows = (0..30)
            .map(|i| measurement("Agra", start + chrono::Days::new(7 * i), 100.0 + i as f64, "x"))
            .collect();
        let s = FilteredSeries::from_rows(rows);
        let f = forecast(&s);
        let last = s.last().unwrap().date;
        assert_eq!(f.points()[0].date, last + chrono::Days::new(1));
        assert!((f.points()[0].aqi - 130.0).abs() < 1e-9);
    }

    #[test]
    fn test_predictions_are_not_clamped() {
        let s = daily((0..40).map(|i| 390.0 - 10.0 * i as f64));
        let f = forecast(&s);
        assert!(f.points().iter().all(|p| p.aqi < 0.0));
    }

    #[test]
    fn test_decreasing_series_trends_down() {
        let s = daily((0..35).map(|i| 300.0 - i as f64 * 2.5));
        match forecast(&s) {
            Forecast::Available { trend, points } => {
                assert!(trend.slope < 0.0);
                assert!(points.windows(2).all(|w| w[1].aqi < w[0].aqi));
            }
            other => panic!("expected a forecast, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_threshold_never_below_two() {
        let s = daily([10.0]);
        assert!(!forecast_with(&s, 0, 3).is_available());
        let s = daily([10.0, 12.0]);
        assert_eq!(forecast_with(&s, 0, 3).points().len(), 3);
    }
}
