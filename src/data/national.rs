use std::collections::HashMap;

use super::model::Dataset;

/// A city the map knows how to place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityInfo {
    pub name: &'static str,
    pub landmark: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

const fn city(
    name: &'static str,
    landmark: &'static str,
    latitude: f64,
    longitude: f64,
) -> CityInfo {
    CityInfo {
        name,
        landmark,
        latitude,
        longitude,
    }
}

/// Display coordinates and landmark captions, in map legend order.
pub const CITIES: &[CityInfo] = &[
    city("Delhi", "India Gate", 28.6139, 77.2090),
    city("Mumbai", "Gateway of India", 19.0760, 72.8777),
    city("Jaipur", "Hawa Mahal", 26.9124, 75.7873),
    city("Agra", "Taj Mahal", 27.1767, 78.0081),
    city("Kolkata", "Howrah Bridge", 22.5726, 88.3639),
    city("Chennai", "Marina Temple", 13.0827, 80.2707),
    city("Bengaluru", "Lalbagh Garden", 12.9716, 77.5946),
    city("Hyderabad", "Charminar", 17.3850, 78.4867),
    city("Pune", "Shaniwar Wada", 18.5204, 73.8567),
    city("Ahmedabad", "Sabarmati Ashram", 23.0225, 72.5714),
    city("Lucknow", "Bara Imambara", 26.8467, 80.9462),
    city("Varanasi", "Ganga Ghats", 25.3176, 82.9739),
    city("Amritsar", "Golden Temple", 31.6340, 74.8723),
    city("Goa", "Beach Paradise", 15.2993, 74.1240),
    city("Indore", "Street Food Hub", 22.7196, 75.8577),
];

pub fn city_info(name: &str) -> Option<&'static CityInfo> {
    CITIES.iter().find(|c| c.name == name)
}

/// Header caption for a city; unknown cities get a generic one.
pub fn landmark(name: &str) -> &'static str {
    city_info(name).map_or("Famous City Spot", |c| c.landmark)
}

/// One map marker: a city's mean AQI over its whole history.
#[derive(Debug, Clone, PartialEq)]
pub struct CityAverage {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub mean_aqi: f64,
    pub observations: usize,
}

/// Full-history mean AQI for every mapped city present in `dataset`.
///
/// Independent of any selection. Cities without coordinates are left off
/// the map, as are mapped cities with no rows.
pub fn city_averages(dataset: &Dataset) -> Vec<CityAverage> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for m in dataset.rows() {
        let slot = totals.entry(m.city.as_str()).or_insert((0.0, 0));
        slot.0 += m.aqi;
        slot.1 += 1;
    }

    let unmapped: Vec<&str> = totals
        .keys()
        .copied()
        .filter(|name| city_info(name).is_none())
        .collect();
    if !unmapped.is_empty() {
        log::debug!("no map coordinates for {unmapped:?}");
    }

    CITIES
        .iter()
        .filter_map(|info| {
            let &(sum, count) = totals.get(info.name)?;
            Some(CityAverage {
                city: info.name.to_string(),
                latitude: info.latitude,
                longitude: info.longitude,
                mean_aqi: sum / count as f64,
                observations: count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::test_support::{day, measurement};

    #[test]
    fn test_city_averages_use_full_history_in_table_order() {
        let ds = Dataset::from_rows(vec![
            measurement("Mumbai", day(2015, 1, 1), 100.0, "Moderate"),
            measurement("Delhi", day(2015, 1, 1), 300.0, "Very Unhealthy"),
            measurement("Delhi", day(2023, 12, 31), 100.0, "Moderate"),
            measurement("Springfield", day(2020, 1, 1), 10.0, "Good"),
        ]);
        let avgs = city_averages(&ds);
        assert_eq!(avgs.len(), 2);
        assert_eq!(avgs[0].city, "Delhi");
        assert_eq!(avgs[0].mean_aqi, 200.0);
        assert_eq!(avgs[0].observations, 2);
        assert_eq!(avgs[0].latitude, 28.6139);
        assert_eq!(avgs[1].city, "Mumbai");
    }

    #[test]
    fn test_landmark_fallback() {
        assert_eq!(landmark("Agra"), "Taj Mahal");
        assert_eq!(landmark("Springfield"), "Famous City Spot");
    }

    #[test]
    fn test_city_table_names_are_unique() {
        let mut names: Vec<&str> = CITIES.iter().map(|c| c.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CITIES.len());
    }
}
