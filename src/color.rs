use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use aqi_dashboard::data::aggregate::HealthStatus;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

fn hsl(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    to_color32(rgb)
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| hsl((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

// ---------------------------------------------------------------------------
// Health bands
// ---------------------------------------------------------------------------

/// Fixed colour per health band, green through purple.
pub fn health_color(status: HealthStatus) -> Color32 {
    match status {
        HealthStatus::Good => hsl(130.0, 0.60, 0.45),
        HealthStatus::Moderate => hsl(52.0, 0.85, 0.50),
        HealthStatus::UnhealthySensitive => hsl(28.0, 0.90, 0.52),
        HealthStatus::VeryUnhealthy => hsl(0.0, 0.75, 0.50),
        HealthStatus::Hazardous => hsl(290.0, 0.55, 0.38),
    }
}

/// Colour for a dataset category label, matched to the closest health band
/// by name. Unrecognised labels are grey.
pub fn category_color(category: &str) -> Color32 {
    let lower = category.to_ascii_lowercase();
    let status = if lower.contains("hazard") || lower.contains("severe") {
        HealthStatus::Hazardous
    } else if lower.contains("very") {
        HealthStatus::VeryUnhealthy
    } else if lower.contains("unhealthy") || lower.contains("poor") {
        HealthStatus::UnhealthySensitive
    } else if lower.contains("moderate") || lower.contains("satisfactory") {
        HealthStatus::Moderate
    } else if lower.contains("good") {
        HealthStatus::Good
    } else {
        return Color32::GRAY;
    };
    health_color(status)
}

// ---------------------------------------------------------------------------
// Correlation heatmap scale
// ---------------------------------------------------------------------------

/// Diverging scale: -1 blue, 0 white, +1 red.  `NaN` cells are grey.
pub fn correlation_color(r: f64) -> Color32 {
    if r.is_nan() {
        return Color32::from_gray(110);
    }
    let t = r.clamp(-1.0, 1.0) as f32;
    let white = LinSrgb::new(1.0, 1.0, 1.0);
    let end = if t < 0.0 {
        LinSrgb::new(0.05, 0.20, 0.75)
    } else {
        LinSrgb::new(0.75, 0.05, 0.05)
    };
    let mixed = white.mix(end, t.abs());
    let rgb: Srgb = mixed.into_color();
    to_color32(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_len_and_distinct() {
        let p = generate_palette(6);
        assert_eq!(p.len(), 6);
        assert_ne!(p[0], p[3]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_category_color_matches_band() {
        assert_eq!(category_color("Good"), health_color(HealthStatus::Good));
        assert_eq!(
            category_color("Very Unhealthy"),
            health_color(HealthStatus::VeryUnhealthy)
        );
        assert_eq!(category_color("???"), Color32::GRAY);
    }

    #[test]
    fn test_correlation_scale_ends() {
        assert_eq!(correlation_color(0.0), Color32::WHITE);
        assert_ne!(correlation_color(1.0), correlation_color(-1.0));
        assert_eq!(correlation_color(f64::NAN), Color32::from_gray(110));
    }
}
