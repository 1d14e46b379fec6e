//! Data layer: measurement types, loading, filtering and derived values.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset (cached behind a DatasetHandle)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  (city, start, end) → FilteredSeries, date ascending
//!   └──────────┘
//!        │
//!        ├──────────────────┐
//!        ▼                  ▼
//!   ┌───────────┐     ┌──────────┐
//!   │ aggregate  │     │ forecast  │  7-day OLS trend, or Unavailable
//!   └───────────┘     └──────────┘
//!
//!   national: per-city full-history averages for the map (Dataset only)
//!   export:   FilteredSeries → CSV with the source schema
//! ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod forecast;
pub mod loader;
pub mod model;
pub mod national;
