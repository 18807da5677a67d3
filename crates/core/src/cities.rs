//! Static city directory used to resolve feed origins and power city search.
//!
//! The directory is loaded once at startup from a JSON array of city records
//! and is read-only afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Maximum number of matches returned by [`CityDirectory::search`].
pub const MAX_CITY_MATCHES: usize = 3;

/// City-directory error type.
#[derive(Debug, thiserror::Error)]
pub enum CityDirectoryError {
    #[error("Failed to read city list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse city list {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One record of the static city list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(rename = "city")]
    pub name: String,
    #[serde(default)]
    pub state_id: String,
    #[serde(default)]
    pub state_name: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    #[serde(default)]
    pub population: i64,
}

impl City {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// In-memory list of cities with exact and fuzzy lookup.
#[derive(Debug, Clone, Default)]
pub struct CityDirectory {
    cities: Vec<City>,
}

impl CityDirectory {
    pub fn new(cities: Vec<City>) -> Self {
        Self { cities }
    }

    /// Load the directory from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CityDirectoryError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| CityDirectoryError::Io {
            path: shown.clone(),
            source,
        })?;
        let cities: Vec<City> =
            serde_json::from_slice(&bytes).map_err(|source| CityDirectoryError::Parse {
                path: shown.clone(),
                source,
            })?;
        tracing::info!(path = %shown, count = cities.len(), "City directory loaded");
        Ok(Self::new(cities))
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// First city whose name matches exactly.
    pub fn find_exact(&self, name: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.name == name)
    }

    /// Up to [`MAX_CITY_MATCHES`] cities whose name contains the query's
    /// characters in order (case-insensitive), best first.
    ///
    /// Ranking is by edit distance between query and name; ties go to the
    /// larger population.
    pub fn search(&self, query: &str) -> Vec<&City> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(usize, &City)> = self
            .cities
            .iter()
            .filter_map(|city| {
                let name = city.name.to_lowercase();
                is_subsequence(&query, &name)
                    .then(|| (strsim::levenshtein(&query, &name), city))
            })
            .collect();

        ranked.sort_by(|(da, a), (db, b)| da.cmp(db).then(b.population.cmp(&a.population)));
        ranked
            .into_iter()
            .take(MAX_CITY_MATCHES)
            .map(|(_, city)| city)
            .collect()
    }
}

/// Whether every char of `needle` appears in `haystack` in order.
fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut chars = haystack.chars();
    needle.chars().all(|n| chars.any(|h| h == n))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn city(name: &str, population: i64) -> City {
        City {
            name: name.to_string(),
            state_id: "CA".to_string(),
            state_name: "California".to_string(),
            latitude: 37.77,
            longitude: -122.42,
            population,
        }
    }

    fn directory() -> CityDirectory {
        CityDirectory::new(vec![
            city("San Francisco", 800_000),
            city("San Fernando", 24_000),
            city("Santa Fe", 88_000),
            city("Sacramento", 500_000),
            city("Fresno", 540_000),
        ])
    }

    #[test]
    fn test_is_subsequence() {
        assert!(is_subsequence("sf", "san francisco"));
        assert!(!is_subsequence("fs", "san f"));
        assert!(is_subsequence("", "anything"));
    }

    #[test]
    fn test_find_exact_is_case_sensitive() {
        let dir = directory();
        assert_eq!(dir.find_exact("Fresno").unwrap().population, 540_000);
        assert!(dir.find_exact("fresno").is_none());
    }

    #[test]
    fn test_search_ranks_closest_first() {
        let dir = directory();
        let names: Vec<&str> = dir.search("frncisco").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["San Francisco"]);

        let exact = dir.search("santa fe");
        assert_eq!(exact[0].name, "Santa Fe");
    }

    #[test]
    fn test_search_caps_results() {
        let dir = directory();
        assert_eq!(dir.search("s").len(), MAX_CITY_MATCHES);
    }

    #[test]
    fn test_search_blank_query_matches_nothing() {
        assert!(directory().search("   ").is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"city":"Portland","state_id":"OR","state_name":"Oregon","lat":45.52,"lng":-122.68,"population":650000,"timezone":"America/Los_Angeles"}}]"#
        )
        .unwrap();

        let dir = CityDirectory::load(file.path()).unwrap();
        assert_eq!(dir.len(), 1);
        let portland = dir.find_exact("Portland").unwrap();
        assert_eq!(portland.coordinate().latitude, 45.52);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            CityDirectory::load(file.path()),
            Err(CityDirectoryError::Parse { .. })
        ));
    }
}
