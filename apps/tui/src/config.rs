use color_eyre::eyre::{eyre, WrapErr};
use dotenv::dotenv;
use monsoon_radial::PageConfig;
use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "RADIAL_CONFIG";
pub const DATA_DIR_ENV: &str = "RADIAL_DATA_DIR";
pub const LOG_FILE_ENV: &str = "RADIAL_LOG_FILE";

const DEFAULT_LOG_FILE: &str = "monsoon-radial.log";

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub page: PageConfig,
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
}

/// Initializes the application configuration from `.env` and the process
/// environment. Without `RADIAL_CONFIG` the built-in monsoon page is used.
pub fn init_app_config() -> color_eyre::eyre::Result<AppConfig> {
    // Load environment variables from .env file
    dotenv().ok();

    let page = match env::var(CONFIG_ENV) {
        Ok(path) if !path.trim().is_empty() => load_page_config(Path::new(&path))?,
        _ => PageConfig::monsoon_default(),
    };

    if page.charts.is_empty() {
        return Err(eyre!("Page configuration has no charts"));
    }

    Ok(AppConfig {
        page,
        data_dir: get_data_dir(),
        log_file: get_log_file(),
    })
}

pub fn load_page_config(path: &Path) -> color_eyre::eyre::Result<PageConfig> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read chart config {}", path.display()))?;
    PageConfig::from_json(&text)
        .wrap_err_with(|| format!("Failed to parse chart config {}", path.display()))
}

/// Gets the directory CSV paths are resolved against
pub fn get_data_dir() -> PathBuf {
    env::var(DATA_DIR_ENV).map_or_else(|_| PathBuf::from("."), PathBuf::from)
}

/// Gets the log file used while the terminal UI owns the screen
pub fn get_log_file() -> PathBuf {
    env::var(LOG_FILE_ENV).map_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from)
}

/// Where a series' CSV lives; absolute paths are kept as they are.
pub fn resolve_data_path(data_dir: &Path, csv_file: &str) -> PathBuf {
    let path = Path::new(csv_file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{load_page_config, resolve_data_path};
    use std::io::Write;
    use std::path::{Path, PathBuf};

    #[test]
    fn relative_series_paths_join_the_data_dir() {
        assert_eq!(
            resolve_data_path(Path::new("data"), "ISM_historic.csv"),
            PathBuf::from("data/ISM_historic.csv")
        );
    }

    #[test]
    fn absolute_series_paths_are_kept() {
        let absolute = std::env::temp_dir().join("ISM_future.csv");
        let absolute_text = absolute.to_string_lossy().to_string();
        assert_eq!(resolve_data_path(Path::new("data"), &absolute_text), absolute);
    }

    #[test]
    fn page_config_is_read_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"charts": [{{"svgId": "a", "sliderId": "b", "labelId": "c", "playId": "d", "csvFile": "x.csv"}}]}}"#
        )
        .unwrap();

        let page = load_page_config(file.path()).unwrap();
        assert_eq!(page.charts.len(), 1);
        assert_eq!(page.charts[0].series[0].csv_file, "x.csv");
    }

    #[test]
    fn unreadable_config_names_the_file() {
        let error = load_page_config(Path::new("/definitely/missing/charts.json")).unwrap_err();
        assert!(format!("{error}").contains("/definitely/missing/charts.json"));
    }
}
