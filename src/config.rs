use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    /// The machine catalog. Fixed at deployment time; edit the config
    /// file and restart to change it.
    #[serde(default = "default_machines")]
    pub machines: Vec<MachineConfig>,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/labres.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Default: true for production safety. Set to false for local
    /// development without HTTPS.
    pub secure_cookies: bool,

    /// Idle session lifetime in minutes.
    pub session_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8701,
            cors_allowed_origins: vec![
                "http://localhost:8701".to_string(),
                "http://127.0.0.1:8701".to_string(),
            ],
            secure_cookies: true,
            session_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Stable short code, e.g. "S2IF-1"
    pub id: String,

    /// Free-text hardware description shown on the availability board
    pub specification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations) - higher = more CPU work
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

/// The seven lab computers of the S2 Informatics residency pool.
fn default_machines() -> Vec<MachineConfig> {
    let specs = [
        (
            "S2IF-1",
            "Quadro RTX 6000 | 12th Gen Intel(R) Core(TM) i9-12900 3.20 GHz | RAM 32GB",
        ),
        (
            "S2IF-2",
            "RTX 3070 | Intel(R) Core(TM) i7-3770 CPU @ 3.40 GHz | RAM 8GB",
        ),
        (
            "S2IF-5",
            "NVIDIA GeForce GT 430 | Intel(R) Core(TM) i7-3770 CPU @ 3.40 GHz | RAM 8GB",
        ),
        (
            "S2IF-6",
            "NVIDIA GeForce GT 430 | Intel(R) Core(TM) i7-3770 CPU @ 3.40 GHz | RAM 8GB",
        ),
        (
            "S2IF-7",
            "Intel UHD Graphics 770 | 12th Gen Intel(R) Core(TM) i5-12500 3.00 GHz | RAM 16GB",
        ),
        (
            "S2IF-8",
            "Intel UHD Graphics 770 | 12th Gen Intel(R) Core(TM) i5-12500 3.00 GHz | RAM 16GB",
        ),
        (
            "S2IF-9",
            "Intel UHD Graphics 770 | 12th Gen Intel(R) Core(TM) i5-12500 3.00 GHz | RAM 16GB",
        ),
    ];

    specs
        .into_iter()
        .map(|(id, specification)| MachineConfig {
            id: id.to_string(),
            specification: specification.to_string(),
        })
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            machines: default_machines(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("labres").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".labres").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.machines.is_empty() {
            anyhow::bail!("Machine catalog cannot be empty");
        }

        let mut seen = HashSet::new();
        for machine in &self.machines {
            if machine.id.trim().is_empty() {
                anyhow::bail!("Machine id cannot be empty");
            }
            if !seen.insert(machine.id.as_str()) {
                anyhow::bail!("Duplicate machine id in catalog: {}", machine.id);
            }
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("min_db_connections cannot exceed max_db_connections");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.machines.len(), 7);
        assert_eq!(config.machines[0].id, "S2IF-1");
    }

    #[test]
    fn duplicate_machine_ids_rejected() {
        let mut config = Config::default();
        config.machines.push(MachineConfig {
            id: "S2IF-1".to_string(),
            specification: "dup".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("[general]\nlog_level = \"debug\"\n").unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.port, 8701);
        assert_eq!(config.machines.len(), 7);
    }
}
