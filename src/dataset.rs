//! Cafe dataset module
//!
//! Static mapping from lowercase city name to an ordered list of cafe names.
//! Populated once at startup (built-in fixture or TOML file) and read-only
//! for the lifetime of the process.

use serde::Deserialize;
use std::collections::HashMap;

/// Immutable city-to-cafes mapping.
///
/// Keys are lowercase city names; the per-city list keeps insertion order,
/// which determines which entries survive truncation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    cities: HashMap<String, Vec<String>>,
}

impl Dataset {
    /// Built-in fixture dataset used when no dataset file is configured
    pub fn builtin() -> Self {
        let mut cities = HashMap::new();
        cities.insert(
            "moscow".to_string(),
            vec![
                "Мир кофе".to_string(),
                "Сладкоежка".to_string(),
                "Кофе и завтраки".to_string(),
                "Сытый студент".to_string(),
                "Вилка и ложка".to_string(),
            ],
        );
        cities.insert(
            "tula".to_string(),
            vec![
                "Тульский пряник".to_string(),
                "Чайная у кремля".to_string(),
                "Кофейня на набережной".to_string(),
            ],
        );
        Self { cities }
    }

    /// Parse a dataset from TOML text of the form `city = ["name", ...]`.
    ///
    /// City keys are normalized to lowercase.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        let parsed: HashMap<String, Vec<String>> = toml::from_str(raw)?;
        let cities = parsed
            .into_iter()
            .map(|(city, cafes)| (city.to_lowercase(), cafes))
            .collect();
        Ok(Self { cities })
    }

    /// Load a dataset from a TOML file
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read dataset file '{path}': {e}"))?;
        let dataset = Self::from_toml_str(&raw)
            .map_err(|e| format!("Failed to parse dataset file '{path}': {e}"))?;
        Ok(dataset)
    }

    /// Cafe names for a city, in dataset order.
    ///
    /// Lookup is case-sensitive: keys are lowercase, so "Moscow" is unknown.
    pub fn cafes(&self, city: &str) -> Option<&[String]> {
        self.cities.get(city).map(Vec::as_slice)
    }

    pub fn city_count(&self) -> usize {
        self.cities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_cities() {
        let dataset = Dataset::builtin();
        assert!(dataset.cafes("moscow").is_some());
        assert!(dataset.cafes("tula").is_some());
        assert_eq!(dataset.city_count(), 2);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let dataset = Dataset::builtin();
        assert!(dataset.cafes("Moscow").is_none());
        assert!(dataset.cafes("omsk").is_none());
    }

    #[test]
    fn test_order_preserved() {
        let dataset = Dataset::builtin();
        let cafes = dataset.cafes("moscow").unwrap();
        assert_eq!(cafes[0], "Мир кофе");
        assert_eq!(cafes[1], "Сладкоежка");
    }

    #[test]
    fn test_from_toml_str() {
        let raw = r#"
            Piter = ["Чайная ложка", "Север"]
            kazan = ["Дом чая"]
        "#;
        let dataset = Dataset::from_toml_str(raw).unwrap();
        // Keys are lowercased on load
        let cafes: Vec<&str> = dataset
            .cafes("piter")
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(cafes, vec!["Чайная ложка", "Север"]);
        assert_eq!(dataset.cafes("kazan").unwrap().len(), 1);
        assert!(dataset.cafes("Piter").is_none());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        assert!(Dataset::from_toml_str("moscow = 42").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("cafe_finder_dataset_test.toml");
        std::fs::write(&path, "samara = [\"Кофейня №1\", \"Булочная\"]").unwrap();

        let dataset = Dataset::load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(dataset.cafes("samara").unwrap().len(), 2);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Dataset::load_from_file("/nonexistent/cafes.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read dataset file"));
    }

    #[test]
    fn test_load_from_unparseable_file() {
        let path = std::env::temp_dir().join("cafe_finder_dataset_bad.toml");
        std::fs::write(&path, "samara = 42").unwrap();

        let err = Dataset::load_from_file(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse dataset file"));

        std::fs::remove_file(&path).ok();
    }
}
