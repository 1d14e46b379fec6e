use std::path::PathBuf;

/// Dataset opened at start-up when nothing else is configured.
pub const DEFAULT_DATA_PATH: &str = "india_city_aqi_2015_2023.csv";

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Colour scheme of the dashboard. Only the UI reads this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Start-up settings.
///
/// * data path: first command-line argument, else `AQI_DATA_PATH`, else
///   [`DEFAULT_DATA_PATH`]
/// * theme: `AQI_THEME` (`light` / `dark`), else dark
///
/// Log verbosity is `RUST_LOG`, read by `env_logger`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub theme: Theme,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            theme: Theme::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::args().nth(1),
            std::env::var("AQI_DATA_PATH").ok(),
            std::env::var("AQI_THEME").ok(),
        )
    }

    fn resolve(arg: Option<String>, path_var: Option<String>, theme_var: Option<String>) -> Self {
        let data_path = arg
            .or(path_var)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let theme = match theme_var.as_deref() {
            None => Theme::default(),
            Some(raw) => Theme::parse(raw).unwrap_or_else(|| {
                log::warn!("ignoring unknown AQI_THEME '{raw}'");
                Theme::default()
            }),
        };

        AppConfig { data_path, theme }
    }
}
