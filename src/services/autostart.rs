// OS auto-start registration (Task Scheduler on Windows, systemd user unit elsewhere)

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::command_runner::{run_command, CommandOutput};

/// The program line an auto-start entry launches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub executable: PathBuf,
    pub args: Vec<String>,
}

impl LaunchCommand {
    fn quoted(&self) -> String {
        std::iter::once(self.executable.display().to_string())
            .chain(self.args.iter().cloned())
            .map(|part| format!("\"{}\"", part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Narrow port over the OS auto-start facility.
#[async_trait]
pub trait AutoStartRegistry: Send + Sync {
    /// Creates or overwrites the named entry. True only if the OS tool exited with 0.
    async fn create(&self, name: &str, launch: &LaunchCommand) -> bool;

    /// Any query failure reads as "absent".
    async fn exists(&self, name: &str) -> bool;
}

fn log_output(action: &str, name: &str, output: &CommandOutput) {
    let stdout = output.stdout.trim();
    let stderr = output.stderr.trim();
    if output.success() {
        tracing::info!(name, stdout, stderr, "{} succeeded", action);
    } else {
        tracing::warn!(name, code = ?output.code, stdout, stderr, "{} failed", action);
    }
}

/// Windows Task Scheduler entry triggered at logon, through `schtasks.exe`.
#[derive(Debug, Clone)]
pub struct TaskSchedulerRegistry {
    elevated: bool,
}

impl TaskSchedulerRegistry {
    pub fn new(elevated: bool) -> Self {
        Self { elevated }
    }

    pub fn create_args(&self, name: &str, launch: &LaunchCommand) -> Vec<String> {
        let mut args = vec![
            "/Create".to_string(),
            "/F".to_string(),
            "/TN".to_string(),
            name.to_string(),
            "/TR".to_string(),
            launch.quoted(),
            "/SC".to_string(),
            "ONLOGON".to_string(),
        ];
        // Highest run level can only be requested from an elevated process.
        if self.elevated {
            args.extend(["/RL".to_string(), "HIGHEST".to_string()]);
        }
        args
    }
}

#[async_trait]
impl AutoStartRegistry for TaskSchedulerRegistry {
    async fn create(&self, name: &str, launch: &LaunchCommand) -> bool {
        match run_command("schtasks", self.create_args(name, launch)).await {
            Ok(output) => {
                log_output("schtasks /Create", name, &output);
                output.success()
            }
            Err(e) => {
                tracing::warn!("Failed to run schtasks: {}", e);
                false
            }
        }
    }

    async fn exists(&self, name: &str) -> bool {
        match run_command("schtasks", ["/Query", "/TN", name]).await {
            Ok(output) => output.success(),
            Err(e) => {
                tracing::debug!("schtasks query failed, assuming no task: {}", e);
                false
            }
        }
    }
}

/// systemd user unit enabled for the login session.
#[derive(Debug, Clone)]
pub struct SystemdUserRegistry {
    unit_dir: PathBuf,
    systemctl: String,
}

impl SystemdUserRegistry {
    pub fn new(unit_dir: impl Into<PathBuf>) -> Self {
        Self {
            unit_dir: unit_dir.into(),
            systemctl: "systemctl".to_string(),
        }
    }

    /// Uses another `systemctl` binary (a wrapper, or a different install path).
    pub fn with_systemctl(mut self, program: impl Into<String>) -> Self {
        self.systemctl = program.into();
        self
    }

    /// `~/.config/systemd/user`
    pub fn for_current_user() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        Self::new(base.join("systemd").join("user"))
    }

    pub fn unit_path(&self, name: &str) -> PathBuf {
        self.unit_dir.join(Self::unit_name(name))
    }

    fn unit_name(name: &str) -> String {
        format!("{}.service", name)
    }

    pub fn unit_contents(name: &str, launch: &LaunchCommand) -> String {
        format!(
            "[Unit]\n\
             Description={name} periodic folder cleanup\n\
             \n\
             [Service]\n\
             Type=simple\n\
             ExecStart={exec}\n\
             Restart=on-failure\n\
             \n\
             [Install]\n\
             WantedBy=default.target\n",
            name = name,
            exec = launch.quoted(),
        )
    }

    fn write_unit(&self, name: &str, launch: &LaunchCommand) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.unit_dir)?;
        let path = self.unit_path(name);
        fs::write(&path, Self::unit_contents(name, launch))?;
        Ok(path)
    }

    fn unit_dir(&self) -> &Path {
        &self.unit_dir
    }
}

#[async_trait]
impl AutoStartRegistry for SystemdUserRegistry {
    async fn create(&self, name: &str, launch: &LaunchCommand) -> bool {
        let unit = match self.write_unit(name, launch) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Failed to write unit file in {}: {}", self.unit_dir().display(), e);
                return false;
            }
        };
        tracing::debug!("Wrote {}", unit.display());

        // A failed reload is logged only; `enable` decides the outcome.
        match run_command(&self.systemctl, ["--user", "daemon-reload"]).await {
            Ok(output) => log_output("systemctl --user daemon-reload", name, &output),
            Err(e) => tracing::warn!("Failed to run systemctl daemon-reload: {}", e),
        }

        let unit_name = Self::unit_name(name);
        match run_command(&self.systemctl, ["--user", "enable", unit_name.as_str()]).await {
            Ok(output) => {
                log_output("systemctl --user enable", name, &output);
                output.success()
            }
            Err(e) => {
                tracing::warn!("Failed to run systemctl: {}", e);
                false
            }
        }
    }

    async fn exists(&self, name: &str) -> bool {
        if !self.unit_path(name).is_file() {
            return false;
        }
        let unit_name = Self::unit_name(name);
        match run_command(&self.systemctl, ["--user", "is-enabled", "--quiet", unit_name.as_str()]).await {
            Ok(output) => output.success(),
            Err(e) => {
                tracing::debug!("systemctl query failed, assuming no unit: {}", e);
                false
            }
        }
    }
}

/// The registry matching the host OS.
pub fn platform_registry(elevated: bool) -> Box<dyn AutoStartRegistry> {
    if cfg!(windows) {
        Box::new(TaskSchedulerRegistry::new(elevated))
    } else {
        Box::new(SystemdUserRegistry::for_current_user())
    }
}
