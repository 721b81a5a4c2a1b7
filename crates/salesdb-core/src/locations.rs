use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::UnknownLocation;
use crate::ConfigError;

/// A physical business site as stored in the `locations` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    /// Square location id, e.g. `"L5WST6KFZBT10"`.
    pub external_id: String,
}

/// Maps external (Square) location ids to internal ids.
pub trait LocationResolver {
    /// # Errors
    ///
    /// Returns [`UnknownLocation`] when no location carries `external_id`.
    fn resolve(&self, external_id: &str) -> Result<i64, UnknownLocation>;
}

/// Read-only snapshot of the location registry, shared by every
/// per-location pipeline of a run.
#[derive(Debug, Clone, Default)]
pub struct LocationCache {
    by_external_id: HashMap<String, i64>,
    by_id: HashMap<i64, Location>,
}

impl LocationCache {
    #[must_use]
    pub fn new(locations: impl IntoIterator<Item = Location>) -> Self {
        let mut cache = Self::default();
        for location in locations {
            cache
                .by_external_id
                .insert(location.external_id.clone(), location.id);
            cache.by_id.insert(location.id, location);
        }
        cache
    }

    #[must_use]
    pub fn get(&self, id: i64) -> Option<&Location> {
        self.by_id.get(&id)
    }

    /// Locations ordered by internal id.
    #[must_use]
    pub fn locations(&self) -> Vec<&Location> {
        let mut all: Vec<&Location> = self.by_id.values().collect();
        all.sort_by_key(|l| l.id);
        all
    }
}

impl LocationResolver for LocationCache {
    fn resolve(&self, external_id: &str) -> Result<i64, UnknownLocation> {
        self.by_external_id
            .get(external_id)
            .copied()
            .ok_or_else(|| UnknownLocation {
                external_location_id: external_id.to_string(),
            })
    }
}

/// One entry of the locations seed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub name: String,
    pub external_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationsFile {
    pub locations: Vec<LocationConfig>,
}

/// Load and validate the locations seed file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_locations(path: &Path) -> Result<LocationsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LocationsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let locations_file: LocationsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::LocationsFileParse)?;

    validate_locations(&locations_file)?;

    Ok(locations_file)
}

fn validate_locations(locations_file: &LocationsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_external_ids = HashSet::new();

    for location in &locations_file.locations {
        if location.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "location name must be non-empty".to_string(),
            ));
        }

        if location.external_id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "location '{}' has an empty external_id",
                location.name
            )));
        }

        if !seen_names.insert(location.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate location name: '{}'",
                location.name
            )));
        }

        if !seen_external_ids.insert(location.external_id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate external_id '{}' (location '{}')",
                location.external_id, location.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "locations_test.rs"]
mod tests;
