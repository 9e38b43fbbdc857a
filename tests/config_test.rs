//! The configuration shipped in `config/` loads for every environment

use std::path::PathBuf;

use nutrition_migrator::config::ConfigManager;

fn shipped_config_dir() -> Option<PathBuf> {
    Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config"))
}

#[test]
fn test_shipped_config_loads_for_each_environment() {
    for environment in ["development", "test", "production"] {
        let manager =
            ConfigManager::load_from_directory_with_env(shipped_config_dir(), environment)
                .unwrap_or_else(|e| panic!("{environment}: {e}"));
        assert_eq!(manager.environment(), environment);
        assert_eq!(manager.config().providers.legacy_tag, "spoonacular");
        assert_eq!(manager.config().providers.new_tag, "edamam");
    }
}

#[test]
fn test_environment_sections_override_base() {
    let test = ConfigManager::load_from_directory_with_env(shipped_config_dir(), "test").unwrap();
    assert_eq!(test.config().database.url, "sqlite::memory:");
    assert_eq!(test.config().migration.max_concurrent_workers, 2);
    assert_eq!(test.config().migration.batch_timeout_seconds, Some(30));

    let production =
        ConfigManager::load_from_directory_with_env(shipped_config_dir(), "production").unwrap();
    assert_eq!(production.config().migration.max_concurrent_workers, 16);
    assert_eq!(production.config().translation.timeout_seconds, 5);
    assert!(production.config().is_production_environment());
}
