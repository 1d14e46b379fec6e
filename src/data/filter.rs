use super::model::{Dataset, FilteredSeries, Measurement, Selection};

// ---------------------------------------------------------------------------
// Selection filter: city + inclusive date window
// ---------------------------------------------------------------------------

/// Return the rows matching `selection`, sorted by date ascending.
///
/// Never fails:
/// * A city absent from `rows` → empty series
/// * An inverted window (`start > end`) → empty series, it is simply
///   unsatisfiable
pub fn filter_rows(rows: &[Measurement], selection: &Selection) -> FilteredSeries {
    if selection.start > selection.end {
        log::debug!(
            "inverted date window {} > {}, nothing selected",
            selection.start,
            selection.end
        );
        return FilteredSeries::default();
    }
    let matched: Vec<Measurement> = rows
        .iter()
        .filter(|m| selection.matches(m))
        .cloned()
        .collect();
    log::debug!(
        "selection {} [{} ..= {}] matched {} of {} rows",
        selection.city,
        selection.start,
        selection.end,
        matched.len(),
        rows.len()
    );
    FilteredSeries::from_rows(matched)
}

impl Dataset {
    /// Narrow the dataset to one city and date window.
    pub fn select(&self, selection: &Selection) -> FilteredSeries {
        filter_rows(self.rows(), selection)
    }
}

impl FilteredSeries {
    /// Filter an already-filtered series again.
    pub fn select(&self, selection: &Selection) -> FilteredSeries {
        filter_rows(self.rows(), selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::test_support::{day, measurement};

    fn sample() -> Dataset {
        Dataset::from_rows(vec![
            measurement("Delhi", day(2020, 1, 5), 210.0, "Very Unhealthy"),
            measurement("Mumbai", day(2020, 1, 2), 90.0, "Moderate"),
            measurement("Delhi", day(2020, 1, 1), 180.0, "Unhealthy"),
            measurement("Delhi", day(2020, 1, 3), 150.0, "Unhealthy"),
            measurement("Delhi", day(2020, 2, 1), 99.0, "Moderate"),
        ])
    }

    #[test]
    fn test_filter_city_and_inclusive_window() {
        let ds = sample();
        let sel = Selection::new("Delhi", day(2020, 1, 1), day(2020, 1, 5));
        let series = ds.select(&sel);
        let dates: Vec<_> = series.rows().iter().map(|m| m.date).collect();
        assert_eq!(dates, vec![day(2020, 1, 1), day(2020, 1, 3), day(2020, 1, 5)]);
        assert!(series.rows().iter().all(|m| m.city == "Delhi"));
    }

    #[test]
    fn test_filter_single_day() {
        let ds = sample();
        let sel = Selection::new("Delhi", day(2020, 1, 3), day(2020, 1, 3));
        let series = ds.select(&sel);
        assert_eq!(series.len(), 1);
        assert_eq!(series.rows()[0].aqi, 150.0);

        let none = ds.select(&Selection::new("Delhi", day(2020, 1, 4), day(2020, 1, 4)));
        assert!(none.is_empty());
    }

    #[test]
    fn test_filter_unknown_city_is_empty() {
        let ds = sample();
        let sel = Selection::new("Atlantis", day(2000, 1, 1), day(2030, 1, 1));
        assert!(ds.select(&sel).is_empty());
    }

    #[test]
    fn test_filter_city_match_is_exact() {
        let ds = sample();
        let sel = Selection::new("delhi", day(2000, 1, 1), day(2030, 1, 1));
        assert!(ds.select(&sel).is_empty());
    }

    #[test]
    fn test_filter_inverted_window_is_empty() {
        let ds = sample();
        let sel = Selection::new("Delhi", day(2020, 2, 1), day(2020, 1, 1));
        assert!(ds.select(&sel).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let ds = sample();
        let sel = Selection::new("Delhi", day(2020, 1, 2), day(2020, 2, 1));
        let once = ds.select(&sel);
        let twice = once.select(&sel);
        assert_eq!(once, twice);
    }
}
