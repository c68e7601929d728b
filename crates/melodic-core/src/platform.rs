use std::path::PathBuf;

const APP_DIR: &str = "melodic";

/// Overrides `data_dir()` entirely when set.
pub const DATA_DIR_ENV: &str = "MELODIC_DATA_DIR";

/// `~/.local/share/melodic` on unix (macOS included, not Application Support).
/// Windows prefers a portable `data/` folder next to the executable.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }

    #[cfg(windows)]
    {
        if let Some(portable) = beside_exe("data") {
            return portable;
        }
    }

    if cfg!(unix) {
        under_home(&[".local", "share"])
    } else {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

/// `~/.config/melodic` on unix. On Windows a `config.toml` next to the
/// executable makes that folder the config dir.
pub fn config_dir() -> PathBuf {
    #[cfg(windows)]
    {
        if let Some(dir) = beside_exe("config.toml").and_then(|p| p.parent().map(PathBuf::from)) {
            return dir;
        }
    }

    if cfg!(unix) {
        under_home(&[".config"])
    } else {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

/// Directory holding the durable store snapshots (`<key>.json`).
pub fn store_dir() -> PathBuf {
    data_dir().join("store")
}

pub fn log_file() -> PathBuf {
    data_dir().join("melodic.log")
}

fn under_home(parts: &[&str]) -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
    path.extend(parts);
    path.join(APP_DIR)
}

#[cfg(windows)]
fn beside_exe(name: &str) -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let candidate = exe_path.parent()?.join(name);
    candidate.exists().then_some(candidate)
}
