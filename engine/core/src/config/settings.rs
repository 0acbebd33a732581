//! Dotted-path lookups over the raw configuration table

use serde::de::DeserializeOwned;

/// Raw TOML configuration with typed, defaulted lookups
///
/// Keys are addressed as `section.key` (any depth). A missing key or a value
/// of the wrong type yields the caller's default; the latter is logged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    root: toml::Table,
}

impl Settings {
    /// Wrap an already parsed table
    #[must_use]
    pub fn new(root: toml::Table) -> Self {
        Self { root }
    }

    /// Parse TOML text
    ///
    /// # Errors
    ///
    /// Returns the TOML syntax error.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        Ok(Self::new(text.parse::<toml::Table>()?))
    }

    /// The value at `path`, if present
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&toml::Value> {
        let mut segments = path.split('.');
        let mut value = self.root.get(segments.next()?)?;
        for segment in segments {
            value = value.get(segment)?;
        }
        Some(value)
    }

    /// Whether `path` is present
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// The value at `path` as `T`, or `default`
    pub fn get_or<T: DeserializeOwned>(&self, path: &str, default: T) -> T {
        let Some(value) = self.get(path) else {
            return default;
        };
        match value.clone().try_into::<T>() {
            Ok(typed) => typed,
            Err(error) => {
                tracing::warn!(path, error = %error, "Config value has the wrong type, using default");
                default
            }
        }
    }

    /// The table at `path`, if present and a table
    #[must_use]
    pub fn section(&self, path: &str) -> Option<&toml::Table> {
        self.get(path).and_then(toml::Value::as_table)
    }

    /// The whole table
    #[must_use]
    pub fn table(&self) -> &toml::Table {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"
        [pet]
        name = "Mochi"

        [behavior]
        energy_decay_working = 3
        encourage_probability = 0.5

        [behavior.durations]
        rest_secs = 12.5
    "#;

    #[test]
    fn test_dotted_lookup() {
        let settings = Settings::parse(SAMPLE).unwrap();
        assert_eq!(settings.get_or("pet.name", String::new()), "Mochi");
        assert_eq!(settings.get_or("behavior.durations.rest_secs", 0.0), 12.5);
        assert!(settings.contains("behavior.durations"));
        assert!(settings.section("behavior").is_some());
    }

    #[test]
    fn test_integers_widen_to_floats() {
        let settings = Settings::parse(SAMPLE).unwrap();
        assert_eq!(settings.get_or("behavior.energy_decay_working", 2.0_f64), 3.0);
    }

    #[test]
    fn test_missing_or_mistyped_falls_back() {
        let settings = Settings::parse(SAMPLE).unwrap();
        assert_eq!(settings.get_or("behavior.missing", 7_u64), 7);
        assert_eq!(settings.get_or("pet.name.deeper", 1_u8), 1);
        assert_eq!(settings.get_or("pet.name", 5_u32), 5);
        assert_eq!(settings.get(""), None);
    }

    #[test]
    fn test_empty_settings() {
        let settings = Settings::default();
        assert!(settings.table().is_empty());
        assert_eq!(settings.get_or("daemon.greeting_context", "greeting".to_string()), "greeting");
    }
}
