//! Registers the bridge in the host application's configuration.
//!
//! The host (a desktop client) launches MCP servers listed under
//! `mcpServers` in its `claude_desktop_config.json`. [`Installer::install`]
//! adds or replaces one entry that runs `<binary> connect --url <url>`,
//! leaving every other member of the file untouched.

use crate::error::{Error, Result};
use serde_json::{Map, Value, json};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default key of the entry written under `mcpServers`.
pub const DEFAULT_SERVER_KEY: &str = "vertex-ai-rag";

/// File name of the host configuration.
pub const HOST_CONFIG_FILE: &str = "claude_desktop_config.json";

/// Location of the host configuration on this platform.
///
/// `<config dir>/Claude/claude_desktop_config.json`, where the config dir is
/// the roaming AppData folder on Windows, `~/Library/Application Support` on
/// macOS and `$XDG_CONFIG_HOME` (or `~/.config`) elsewhere. The file need not
/// exist.
pub fn config_path_by_os() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| Error::Install("could not determine the home directory".to_string()))?;
    Ok(dirs.config_dir().join("Claude").join(HOST_CONFIG_FILE))
}

/// Updates the host configuration file.
#[derive(Debug, Clone)]
pub struct Installer {
    config_path: Option<PathBuf>,
    server_key: String,
}

impl Default for Installer {
    fn default() -> Self {
        Self {
            config_path: None,
            server_key: DEFAULT_SERVER_KEY.to_string(),
        }
    }
}

impl Installer {
    /// Installer targeting the platform default path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Target an explicit file instead of the platform default.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Use a different `mcpServers` key.
    pub fn with_server_key(mut self, key: impl Into<String>) -> Self {
        self.server_key = key.into();
        self
    }

    /// The file that will be written.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => config_path_by_os(),
        }
    }

    /// Add or replace the bridge entry.
    ///
    /// # Arguments
    ///
    /// * `server_url` - SSE endpoint passed to `connect --url`
    /// * `profile` - profile exported to the bridge's environment
    /// * `binary_path` - absolute path of the bridge executable
    ///
    /// # Returns
    ///
    /// The path of the file that was written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Install`] if the directory cannot be created, the
    /// existing file is unreadable or not valid JSON, or the write fails.
    #[tracing::instrument(skip(self, binary_path), fields(key = %self.server_key))]
    pub fn install(&self, server_url: &str, profile: &str, binary_path: &Path) -> Result<PathBuf> {
        let path = self.config_path()?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_private_dir(dir).map_err(|e| {
                Error::Install(format!("failed to create config directory {}: {}", dir.display(), e))
            })?;
        }

        let mut root = read_host_config(&path)?;
        let servers = root
            .entry("mcpServers")
            .or_insert_with(|| Value::Object(Map::new()));
        if !servers.is_object() {
            *servers = Value::Object(Map::new());
        }
        if let Value::Object(servers) = servers {
            servers.insert(self.server_key.clone(), self.entry(server_url, profile, binary_path));
        }

        write_host_config(&path, &root)?;
        tracing::info!(path = %path.display(), "Host configuration updated");
        Ok(path)
    }

    fn entry(&self, server_url: &str, profile: &str, binary_path: &Path) -> Value {
        json!({
            "command": binary_path.to_string_lossy(),
            "args": ["connect", "--url", server_url],
            "env": {
                "AWS_PROFILE": profile,
                "MCP_BRIDGE_PROFILE": profile,
            }
        })
    }
}

fn read_host_config(path: &Path) -> Result<Map<String, Value>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(Error::Install(format!(
                "no permission to read config file: {}",
                path.display()
            )));
        }
        Err(e) => return Err(Error::Install(format!("failed to read config file: {}", e))),
    };

    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(&data) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(_) => Err(Error::Install(format!(
            "config file is not a JSON object: {}",
            path.display()
        ))),
        Err(e) => Err(Error::Install(format!("failed to parse config file JSON: {}", e))),
    }
}

fn write_host_config(path: &Path, root: &Map<String, Value>) -> Result<()> {
    let data = serde_json::to_vec_pretty(root)
        .map_err(|e| Error::Serialization(format!("failed to encode config: {}", e)))?;

    write_private_file(path, &data).map_err(|e| {
        if e.kind() == ErrorKind::PermissionDenied {
            Error::Install(format!("no permission to write config file: {}", path.display()))
        } else {
            Error::Install(format!("failed to write config file: {}", e))
        }
    })
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(data)
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, data)
}
