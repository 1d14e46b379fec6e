use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;

use aqi_dashboard::config::{AppConfig, Theme};
use aqi_dashboard::data::aggregate::{self, AggregateSummary, PeriodMean};
use aqi_dashboard::data::error::InsufficientDataError;
use aqi_dashboard::data::export;
use aqi_dashboard::data::forecast::{self, Forecast};
use aqi_dashboard::data::loader::DatasetHandle;
use aqi_dashboard::data::model::{Dataset, FilteredSeries, Selection};
use aqi_dashboard::data::national::{self, CityAverage};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Source the current dataset came from.
    pub source: Option<DatasetHandle>,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Arc<Dataset>>,

    /// Distinct cities of the dataset, for the selector.
    pub cities: Vec<String>,

    /// Active city and date window.
    pub selection: Option<Selection>,

    /// Rows matching `selection` (cached).
    pub filtered: FilteredSeries,

    /// KPIs and insights, or why there are none.
    pub summary: Result<AggregateSummary, InsufficientDataError>,

    pub forecast: Forecast,
    pub monthly: Vec<PeriodMean>,
    pub yearly: Vec<PeriodMean>,
    pub categories: Vec<(String, usize)>,

    /// Full-history averages for the map; only depends on the dataset.
    pub city_averages: Vec<CityAverage>,

    pub theme: Theme,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            source: None,
            dataset: None,
            cities: Vec::new(),
            selection: None,
            filtered: FilteredSeries::default(),
            summary: Err(InsufficientDataError::new("summary", 0)),
            forecast: forecast::forecast(&FilteredSeries::default()),
            monthly: Vec::new(),
            yearly: Vec::new(),
            categories: Vec::new(),
            city_averages: Vec::new(),
            theme: Theme::default(),
            status_message: None,
        }
    }
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let mut state = Self {
            theme: config.theme,
            ..Default::default()
        };
        if config.data_path.exists() {
            state.open(&config.data_path);
        } else {
            log::warn!(
                "dataset {} not found, waiting for File → Open…",
                config.data_path.display()
            );
            state.status_message = Some(format!(
                "{} not found. Open a dataset via File → Open…",
                config.data_path.display()
            ));
        }
        state
    }

    /// Load `path` through a fresh handle and make it the active dataset.
    pub fn open(&mut self, path: &Path) {
        let handle = DatasetHandle::new(path);
        match handle.get() {
            Ok(dataset) => {
                self.source = Some(handle);
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset: city list, map averages and a default
    /// selection of the first city over the whole time span.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.cities = dataset.cities().into_iter().collect();
        self.city_averages = national::city_averages(&dataset);

        self.selection = match (self.cities.first(), dataset.date_bounds()) {
            (Some(city), Some((start, end))) => Some(Selection::new(city.clone(), start, end)),
            _ => None,
        };
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Recompute every selection-dependent value.
    pub fn refresh(&mut self) {
        self.filtered = match (&self.dataset, &self.selection) {
            (Some(ds), Some(sel)) => ds.select(sel),
            _ => FilteredSeries::default(),
        };
        self.summary = AggregateSummary::compute(&self.filtered);
        self.forecast = forecast::forecast(&self.filtered);
        self.monthly = aggregate::monthly_mean_aqi(&self.filtered);
        self.yearly = aggregate::yearly_mean_aqi(&self.filtered);
        self.categories = aggregate::category_counts(&self.filtered);
        if let Err(e) = &self.summary {
            log::debug!("no summary for current selection: {e}");
        }
    }

    pub fn set_city(&mut self, city: &str) {
        if let Some(sel) = &mut self.selection {
            if sel.city != city {
                sel.city = city.to_string();
                self.refresh();
            }
        }
    }

    pub fn set_range(&mut self, start: NaiveDate, end: NaiveDate) {
        if let Some(sel) = &mut self.selection {
            sel.start = start;
            sel.end = end;
            self.refresh();
        }
    }

    /// Widen the window back to the dataset's full span.
    pub fn reset_range(&mut self) {
        if let Some((start, end)) = self.dataset.as_ref().and_then(|ds| ds.date_bounds()) {
            self.set_range(start, end);
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    /// Suggested file name for exporting the current selection.
    pub fn export_name(&self) -> String {
        let city = self.selection.as_ref().map_or("selection", |s| s.city.as_str());
        export::export_file_name(city)
    }

    /// Write the filtered rows as CSV to `path`.
    pub fn export_to(&mut self, path: PathBuf) {
        let result = std::fs::File::create(&path)
            .map_err(anyhow::Error::from)
            .and_then(|file| export::write_csv(&self.filtered, file));
        match result {
            Ok(()) => {
                log::info!("Exported {} rows to {}", self.filtered.len(), path.display());
                self.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqi_dashboard::data::model::Measurement;

    fn row(city: &str, date: NaiveDate, aqi: f64) -> Measurement {
        Measurement {
            city: city.to_string(),
            date,
            aqi,
            pm25: 1.0,
            pm10: 2.0,
            no2: 3.0,
            so2: 4.0,
            co: 5.0,
            o3: 6.0,
            aqi_category: "Moderate".to_string(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(Arc::new(Dataset::from_rows(vec![
            row("Mumbai", day(3), 70.0),
            row("Delhi", day(1), 150.0),
            row("Delhi", day(2), 250.0),
        ])));
        state
    }

    #[test]
    fn test_default_selection_is_first_city_full_span() {
        let state = loaded();
        let sel = state.selection.as_ref().unwrap();
        assert_eq!(sel.city, "Delhi");
        assert_eq!((sel.start, sel.end), (day(1), day(3)));
        assert_eq!(state.filtered.len(), 2);
        assert_eq!(state.summary.as_ref().unwrap().mean_aqi, 200.0);
        assert_eq!(state.city_averages.len(), 2);
    }

    #[test]
    fn test_empty_window_shows_no_data() {
        let mut state = loaded();
        state.set_range(day(3), day(3));
        assert!(state.filtered.is_empty());
        assert!(state.summary.is_err());
        assert!(!state.forecast.is_available());
        // map averages ignore the selection
        assert_eq!(state.city_averages.len(), 2);

        state.reset_range();
        assert_eq!(state.filtered.len(), 2);
    }

    #[test]
    fn test_switch_city() {
        let mut state = loaded();
        state.set_city("Mumbai");
        assert_eq!(state.filtered.len(), 1);
        assert_eq!(state.export_name(), "Mumbai_AQI_Data.csv");
    }
}
