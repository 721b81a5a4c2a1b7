use super::*;

fn location(id: i64, name: &str, external_id: &str) -> Location {
    Location {
        id,
        name: name.to_string(),
        external_id: external_id.to_string(),
    }
}

fn entry(name: &str, external_id: &str) -> LocationConfig {
    LocationConfig {
        name: name.to_string(),
        external_id: external_id.to_string(),
    }
}

#[test]
fn cache_resolves_known_external_id() {
    let cache = LocationCache::new([
        location(1, "Downtown", "LQ984N07EKF0R"),
        location(2, "Northside", "L5WST6KFZBT10"),
    ]);
    assert_eq!(cache.resolve("L5WST6KFZBT10").unwrap(), 2);
    assert_eq!(cache.locations().len(), 2);
}

#[test]
fn cache_rejects_unknown_external_id() {
    let cache = LocationCache::new([location(1, "Downtown", "LQ984N07EKF0R")]);
    let err = cache.resolve("NOPE").unwrap_err();
    assert_eq!(err.external_location_id, "NOPE");
}

#[test]
fn cache_lists_locations_in_id_order() {
    let cache = LocationCache::new([
        location(3, "Airport", "C"),
        location(1, "Downtown", "A"),
        location(2, "Northside", "B"),
    ]);
    let ids: Vec<i64> = cache.locations().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(cache.get(2).map(|l| l.name.as_str()), Some("Northside"));
}

#[test]
fn empty_cache() {
    let cache = LocationCache::default();
    assert!(cache.locations().is_empty());
    assert!(cache.resolve("A").is_err());
}

#[test]
fn validate_accepts_distinct_locations() {
    let file = LocationsFile {
        locations: vec![entry("Downtown", "A"), entry("Northside", "B")],
    };
    assert!(validate_locations(&file).is_ok());
}

#[test]
fn validate_rejects_empty_name() {
    let file = LocationsFile {
        locations: vec![entry("  ", "A")],
    };
    let err = validate_locations(&file).unwrap_err();
    assert!(err.to_string().contains("non-empty"));
}

#[test]
fn validate_rejects_empty_external_id() {
    let file = LocationsFile {
        locations: vec![entry("Downtown", "")],
    };
    let err = validate_locations(&file).unwrap_err();
    assert!(err.to_string().contains("empty external_id"));
}

#[test]
fn validate_rejects_duplicate_names_case_insensitively() {
    let file = LocationsFile {
        locations: vec![entry("Downtown", "A"), entry("downtown", "B")],
    };
    let err = validate_locations(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate location name"));
}

#[test]
fn validate_rejects_duplicate_external_ids() {
    let file = LocationsFile {
        locations: vec![entry("Downtown", "A"), entry("Northside", "A")],
    };
    let err = validate_locations(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate external_id"));
}

#[test]
fn load_locations_reports_missing_file() {
    let err = load_locations(Path::new("/nonexistent/locations.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::LocationsFileIo { .. }));
}

#[test]
fn locations_file_parses_from_yaml() {
    let yaml = "locations:\n  - name: Downtown\n    external_id: LQ984N07EKF0R\n";
    let file: LocationsFile = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(file.locations.len(), 1);
    assert_eq!(file.locations[0].external_id, "LQ984N07EKF0R");
}

#[test]
fn repository_locations_file_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join("config")
        .join("locations.yaml");
    let file = load_locations(&path).expect("failed to load config/locations.yaml");
    assert!(!file.locations.is_empty());
}
