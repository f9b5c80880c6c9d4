use std::fs;
use std::path::PathBuf;

const DATA_DIR: &str = ".usecase_portal";
const DATA_DIR_ENV: &str = "USECASE_PORTAL_DATA_DIR";

/// Get data directory path
///
/// `USECASE_PORTAL_DATA_DIR` wins over `~/.usecase_portal`. The directory is
/// created if it does not exist yet.
pub fn get_data_dir() -> Result<PathBuf, String> {
    let data_dir = match std::env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => {
            let home = dirs::home_dir().ok_or("Failed to get user home directory")?;
            home.join(DATA_DIR)
        }
    };

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)
            .map_err(|e| format!("Failed to create data directory: {}", e))?;
    }

    Ok(data_dir)
}
