use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;

use aqi_dashboard::data::aggregate::HealthStatus;
use aqi_dashboard::data::export::write_csv;
use aqi_dashboard::data::model::{FilteredSeries, Measurement, REQUIRED_COLUMNS};

/// (city, typical AQI, winter swing)
const CITY_PROFILES: [(&str, f64, f64); 15] = [
    ("Delhi", 210.0, 120.0),
    ("Mumbai", 110.0, 40.0),
    ("Jaipur", 150.0, 60.0),
    ("Agra", 175.0, 80.0),
    ("Kolkata", 160.0, 70.0),
    ("Chennai", 85.0, 25.0),
    ("Bengaluru", 75.0, 20.0),
    ("Hyderabad", 95.0, 30.0),
    ("Pune", 90.0, 30.0),
    ("Ahmedabad", 140.0, 55.0),
    ("Lucknow", 190.0, 100.0),
    ("Varanasi", 185.0, 90.0),
    ("Amritsar", 165.0, 85.0),
    ("Goa", 55.0, 15.0),
    ("Indore", 105.0, 35.0),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Category vocabulary used by the source dataset for each health band.
fn category_for(aqi: f64) -> &'static str {
    match HealthStatus::from_aqi(aqi) {
        HealthStatus::Good => "Good",
        HealthStatus::Moderate => "Moderate",
        HealthStatus::UnhealthySensitive => "Unhealthy",
        HealthStatus::VeryUnhealthy => "Very Unhealthy",
        HealthStatus::Hazardous => "Hazardous",
    }
}

/// One city-day: winter peak around mid-January, slow yearly improvement,
/// gaussian noise; pollutants loosely track the AQI.
fn synthesize(
    city: &str,
    base: f64,
    swing: f64,
    date: NaiveDate,
    year_index: f64,
    rng: &mut SimpleRng,
) -> Measurement {
    let phase = 2.0 * std::f64::consts::PI * (date.ordinal0() as f64 - 15.0) / 365.25;
    let aqi = (base + swing * phase.cos() - 2.5 * year_index + rng.gauss(0.0, base * 0.12))
        .round()
        .max(5.0);
    let positive = |v: f64| (v * 100.0).round().max(0.0) / 100.0;
    Measurement {
        city: city.to_string(),
        date,
        aqi,
        pm25: positive(aqi * 0.55 + rng.gauss(0.0, 6.0)),
        pm10: positive(aqi * 0.85 + rng.gauss(0.0, 10.0)),
        no2: positive(15.0 + aqi * 0.12 + rng.gauss(0.0, 4.0)),
        so2: positive(4.0 + aqi * 0.04 + rng.gauss(0.0, 2.0)),
        co: positive(0.4 + aqi * 0.006 + rng.gauss(0.0, 0.15)),
        o3: positive(25.0 + 10.0 * phase.sin() + rng.gauss(0.0, 5.0)),
        aqi_category: category_for(aqi).to_string(),
    }
}

fn write_parquet(path: &Path, rows: &[Measurement]) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch date")?;
    let strings = |f: fn(&Measurement) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let floats = |f: fn(&Measurement) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let dates: ArrayRef = Arc::new(Date32Array::from(
        rows.iter()
            .map(|m| m.date.signed_duration_since(epoch).num_days() as i32)
            .collect::<Vec<_>>(),
    ));

    let columns: Vec<ArrayRef> = vec![
        strings(|m| m.city.as_str()),
        dates,
        floats(|m| m.aqi),
        floats(|m| m.pm25),
        floats(|m| m.pm10),
        floats(|m| m.no2),
        floats(|m| m.so2),
        floats(|m| m.co),
        floats(|m| m.o3),
        strings(|m| m.aqi_category.as_str()),
    ];
    let fields: Vec<Field> = REQUIRED_COLUMNS
        .iter()
        .zip(&columns)
        .map(|(name, col)| Field::new(*name, col.data_type().clone(), false))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let output_path = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "india_city_aqi_2015_2023.csv".to_string()),
    );
    let first = NaiveDate::from_ymd_opt(2015, 1, 1).context("start date")?;
    let last = NaiveDate::from_ymd_opt(2023, 12, 31).context("end date")?;

    let mut rng = SimpleRng::new(42);
    let mut rows = Vec::new();
    for &(city, base, swing) in &CITY_PROFILES {
        for date in first.iter_days().take_while(|d| *d <= last) {
            let year_index = (date.year() - first.year()) as f64;
            rows.push(synthesize(city, base, swing, date, year_index, &mut rng));
        }
    }

    let is_parquet = output_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));

    let count = rows.len();
    if is_parquet {
        write_parquet(&output_path, &rows)?;
    } else {
        let file = std::fs::File::create(&output_path).context("creating output file")?;
        write_csv(&FilteredSeries::from_rows(rows), file)?;
    }

    log::info!("Wrote {count} rows to {}", output_path.display());
    println!(
        "Wrote {count} measurements ({} cities, {first} to {last}) to {}",
        CITY_PROFILES.len(),
        output_path.display()
    );
    Ok(())
}
