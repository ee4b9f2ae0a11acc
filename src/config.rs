use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MedRemind";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Storage slot holding the serialized medication list. Kept verbatim from
/// earlier releases so existing data files keep loading.
pub const MEDICATION_BLOB_KEY: &str = "medremind_meds";

/// Default assistant endpoint (local Ollama-compatible server).
pub const DEFAULT_ASSISTANT_URL: &str = "http://localhost:11434";
pub const DEFAULT_ASSISTANT_MODEL: &str = "llama3.2";

/// Get the application data directory
/// ~/MedRemind/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("MedRemind")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

/// Assistant base URL, overridable via MEDREMIND_ASSISTANT_URL.
pub fn assistant_url() -> String {
    std::env::var("MEDREMIND_ASSISTANT_URL").unwrap_or_else(|_| DEFAULT_ASSISTANT_URL.to_string())
}

/// Assistant model name, overridable via MEDREMIND_ASSISTANT_MODEL.
pub fn assistant_model() -> String {
    std::env::var("MEDREMIND_ASSISTANT_MODEL")
        .unwrap_or_else(|_| DEFAULT_ASSISTANT_MODEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("MedRemind"));
    }

    #[test]
    fn app_name_is_medremind() {
        assert_eq!(APP_NAME, "MedRemind");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn default_log_filter_names_crate() {
        assert_eq!(default_log_filter(), "medremind=info");
    }
}
