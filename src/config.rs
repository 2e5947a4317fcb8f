use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Careguide";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upper bound on suggestions returned by the engine.
pub const MAX_SUGGESTIONS: usize = 3;

/// Upcoming appointments shown on the dashboard overview.
pub const OVERVIEW_UPCOMING_LIMIT: usize = 5;

/// Newest patients shown on the dashboard overview.
pub const OVERVIEW_RECENT_PATIENTS_LIMIT: usize = 5;

/// Overrides the data directory (tests, portable installs).
pub const DATA_DIR_ENV: &str = "CAREGUIDE_DATA_DIR";

const DATABASE_FILE: &str = "careguide.db";

/// Tracing filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,careguide_lib=debug"
}

/// Get the application data directory.
/// `$CAREGUIDE_DATA_DIR` when set, otherwise ~/Careguide/.
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the record store.
pub fn database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("careguide.db"));
    }

    #[test]
    fn app_name_is_careguide() {
        assert_eq!(APP_NAME, "Careguide");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn suggestion_cap_is_three() {
        assert_eq!(MAX_SUGGESTIONS, 3);
    }

    #[test]
    fn log_filter_mentions_crate() {
        assert!(default_log_filter().contains("careguide_lib"));
    }
}
