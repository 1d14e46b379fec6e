use std::io::Write;

use anyhow::{Context, Result};

use super::model::FilteredSeries;

/// Download name the dashboard suggests for a city's export.
pub fn export_file_name(city: &str) -> String {
    format!("{city}_AQI_Data.csv")
}

/// Write the series as CSV with the source column layout (header first).
pub fn write_csv<W: Write>(series: &FilteredSeries, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    if series.is_empty() {
        // serialize() only emits the header alongside the first row
        out.write_record(super::model::REQUIRED_COLUMNS)
            .context("writing CSV header")?;
    }
    for m in series.rows() {
        out.serialize(m).context("writing CSV row")?;
    }
    out.flush().context("flushing CSV")?;
    Ok(())
}

pub fn to_csv_string(series: &FilteredSeries) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(series, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not UTF-8")
}
