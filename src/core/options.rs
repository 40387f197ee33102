use serde::Serialize;

use crate::models::{CityArea, Sport};

/// A city with the areas known for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAreas {
    pub city: String,
    pub areas: Vec<String>,
}

/// Values offered by the city/area/category selectors
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub cities: Vec<CityAreas>,
    pub categories: Vec<String>,
}

impl FilterOptions {
    /// Areas for one city, empty when the city is unknown
    pub fn areas_for(&self, city: &str) -> &[String] {
        self.cities
            .iter()
            .find(|c| c.city == city)
            .map(|c| c.areas.as_slice())
            .unwrap_or(&[])
    }
}

/// Group city records into distinct cities and areas, keeping first-seen order
pub fn filter_options(cities: &[CityArea], sports: &[Sport]) -> FilterOptions {
    let mut grouped: Vec<CityAreas> = Vec::new();

    for record in cities {
        match grouped.iter_mut().find(|c| c.city == record.city) {
            Some(entry) => {
                if !entry.areas.contains(&record.area) {
                    entry.areas.push(record.area.clone());
                }
            }
            None => grouped.push(CityAreas {
                city: record.city.clone(),
                areas: vec![record.area.clone()],
            }),
        }
    }

    FilterOptions {
        cities: grouped,
        categories: sports.iter().map(|s| s.name.clone()).collect(),
    }
}
