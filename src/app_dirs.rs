use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "studyforge";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where logs and other runtime state live
    pub fn state_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
                .unwrap_or_else(|| std::env::temp_dir().join(APP_NAME))
        }
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir().join(format!("{APP_NAME}.log"))
    }

    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| Self::state_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_lives_in_state_dir() {
        let log = AppDirs::log_path();
        assert_eq!(log.parent(), Some(AppDirs::state_dir().as_path()));
        assert_eq!(log.file_name().and_then(|n| n.to_str()), Some("studyforge.log"));
    }

    #[test]
    fn config_file_name() {
        assert!(AppDirs::config_path().ends_with("config.json"));
    }
}
