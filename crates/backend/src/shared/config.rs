use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Fallback when no config.toml is found next to the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[database]
path = "target/db/pos.db"
"#;

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
}

/// Загрузка config.toml, лежащего рядом с исполняемым файлом.
/// Если файла нет — используется встроенная конфигурация по умолчанию.
pub fn load_config() -> anyhow::Result<Config> {
    if let Some(dir) = exe_dir() {
        let path = dir.join("config.toml");
        if path.exists() {
            tracing::info!("Loading config from: {}", path.display());
            let contents = std::fs::read_to_string(&path)?;
            return Ok(toml::from_str(&contents)?);
        }
        tracing::warn!("config.toml not found at: {}", path.display());
    }

    tracing::info!("Using default embedded configuration");
    Ok(toml::from_str(DEFAULT_CONFIG)?)
}

/// Путь к файлу БД. Относительные пути разрешаются от каталога
/// исполняемого файла, чтобы сервис находил базу независимо от CWD.
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let raw = Path::new(&config.database.path);
    if raw.is_absolute() {
        return Ok(raw.to_path_buf());
    }
    match exe_dir() {
        Some(dir) => Ok(dir.join(raw)),
        None => Ok(raw.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "target/db/pos.db");
    }

    #[test]
    fn test_absolute_database_path_passes_through() {
        let config = Config {
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                path: "/var/lib/pos/pos.db".into(),
            },
        };
        assert_eq!(
            get_database_path(&config).unwrap(),
            PathBuf::from("/var/lib/pos/pos.db")
        );
    }
}
