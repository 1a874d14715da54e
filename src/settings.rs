// Process-wide locations and names, built once in main and handed to each component

use std::path::{Path, PathBuf};

use crate::services::autostart::LaunchCommand;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_TASK_NAME: &str = "TempFolderApp";
const INSTALL_DIR_NAME: &str = "TempFolder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub config_path: PathBuf,
    pub install_dir: PathBuf,
    pub task_name: String,
    pub preference_path: PathBuf,
    pub log_dir: PathBuf,
    pub executable: PathBuf,
}

impl AgentSettings {
    pub fn new(config_path: impl Into<PathBuf>, install_dir: impl Into<PathBuf>, executable: impl Into<PathBuf>) -> Self {
        let install_dir = install_dir.into();
        Self {
            config_path: config_path.into(),
            preference_path: install_dir.join("startup.json"),
            log_dir: install_dir.join("logs"),
            install_dir,
            task_name: DEFAULT_TASK_NAME.to_string(),
            executable: executable.into(),
        }
    }

    /// Reads the optional config path argument (program name already stripped).
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        let config_path = args
            .into_iter()
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let executable = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("tempsweep"));
        Self::new(config_path, default_install_dir(), executable)
    }

    /// The auto-start entry relaunches this executable on the same config file.
    pub fn launch_command(&self) -> LaunchCommand {
        let config = absolute(&self.config_path);
        LaunchCommand {
            executable: self.executable.clone(),
            args: vec![config.display().to_string()],
        }
    }
}

pub fn default_install_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:\\").join(INSTALL_DIR_NAME)
    } else {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(INSTALL_DIR_NAME)
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_live_under_install_dir() {
        let settings = AgentSettings::new("conf.json", "/srv/TempFolder", "/usr/bin/tempsweep");

        assert_eq!(settings.preference_path, PathBuf::from("/srv/TempFolder/startup.json"));
        assert_eq!(settings.log_dir, PathBuf::from("/srv/TempFolder/logs"));
        assert_eq!(settings.task_name, DEFAULT_TASK_NAME);
    }

    #[test]
    fn config_path_defaults_to_config_json() {
        let settings = AgentSettings::from_args(Vec::new());
        assert_eq!(settings.config_path, PathBuf::from(DEFAULT_CONFIG_FILE));

        let settings = AgentSettings::from_args(vec!["/etc/tempsweep.json".to_string()]);
        assert_eq!(settings.config_path, PathBuf::from("/etc/tempsweep.json"));
    }

    #[test]
    fn launch_command_uses_an_absolute_config_path() {
        let settings = AgentSettings::new("conf.json", "/srv/TempFolder", "/usr/bin/tempsweep");
        let launch = settings.launch_command();

        assert_eq!(launch.executable, PathBuf::from("/usr/bin/tempsweep"));
        assert!(Path::new(&launch.args[0]).is_absolute());
        assert!(launch.args[0].ends_with("conf.json"));
    }
}
