//! gasc.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::types::FrameworkInfo;

/// Placeholder in the daemon command template replaced by the task's port.
pub const PORT_PLACEHOLDER: &str = "{port}";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GascConfig {
    pub framework: FrameworkConfig,
    pub instance: InstanceConfig,
    pub daemon: DaemonConfig,
    pub tool: ToolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Framework name; derived from the tool command when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub user: String,
    pub master: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Number of daemons to launch.
    pub count: u32,
    /// CPU share per daemon.
    pub cpus: f64,
    /// Memory per daemon in megabytes.
    pub memory_mb: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Command run on the node; `{port}` is replaced by the task's port.
    pub command: String,
    /// Port of task 0; task `n` listens on `base_port + n`.
    pub base_port: u16,
    pub name_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Shell command run once every daemon is up.
    pub command: String,
    /// Host list written before the tool starts.
    pub hosts_file: String,
    /// Stop the run when the tool exits.
    pub stop_on_exit: bool,
    /// Keep a started tool running after the event stream ends, and end
    /// the run when it exits.
    pub wait_on_eof: bool,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            name: None,
            user: String::new(),
            master: "127.0.0.1:5050".to_string(),
        }
    }
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            count: 5,
            cpus: 1.0,
            memory_mb: 128,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            command: "/usr/sbin/sshd -p {port} -D -f /etc/ssh/sshd_config".to_string(),
            base_port: 8000,
            name_prefix: "gasc daemon #".to_string(),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            command: "mpirun -n 512 ./helloworld".to_string(),
            hosts_file: "hosts.txt".to_string(),
            stop_on_exit: true,
            wait_on_eof: false,
        }
    }
}

impl GascConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configurations the scheduler cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.instance.count == 0 {
            return Err(ConfigError::Invalid(
                "instance.count must be at least 1".to_string(),
            ));
        }
        if !(self.instance.cpus.is_finite() && self.instance.cpus > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "instance.cpus must be positive, got {}",
                self.instance.cpus
            )));
        }
        if self.instance.memory_mb <= 0 {
            return Err(ConfigError::Invalid(format!(
                "instance.memory_mb must be positive, got {}",
                self.instance.memory_mb
            )));
        }
        if !self.daemon.command.contains(PORT_PLACEHOLDER) {
            return Err(ConfigError::Invalid(format!(
                "daemon.command must contain {PORT_PLACEHOLDER}"
            )));
        }
        if self.tool.command.trim().is_empty() {
            return Err(ConfigError::Invalid("tool.command is empty".to_string()));
        }
        if self.tool.hosts_file.trim().is_empty() {
            return Err(ConfigError::Invalid("tool.hosts_file is empty".to_string()));
        }
        Ok(())
    }

    /// The framework identity sent when the driver starts.
    pub fn framework_info(&self) -> FrameworkInfo {
        let name = self
            .framework
            .name
            .clone()
            .unwrap_or_else(|| format!("gasc: {}", self.tool.command));
        FrameworkInfo {
            user: self.framework.user.clone(),
            name,
            master: self.framework.master.clone(),
        }
    }
}
