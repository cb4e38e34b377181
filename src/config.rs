use crate::errors::ReguiError;
use std::path::Path;
use std::time::Duration;

/// Ruta por defecto del archivo de configuración, relativa al directorio de trabajo.
pub const DEFAULT_CONFIG_PATH: &str = "regui.conf";

/// Configuración de la aplicación.
///
/// Se arma a partir de los valores por defecto, luego se pisan con las líneas
/// `clave=valor` del archivo de configuración y por último con las variables
/// de entorno `REGUI_*`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Host con el que se completa el formulario de conexión.
    pub host: String,
    /// Puerto con el que se completa el formulario de conexión.
    pub port: u16,
    /// Cada cuánto se consultan las métricas del servidor.
    pub poll_interval: Duration,
    pub connect_timeout: Duration,
    /// Timeout de lectura/escritura de cada comando.
    pub command_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            poll_interval: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde `REGUI_CONFIG` (o `regui.conf`) y aplica
    /// las variables de entorno.
    ///
    /// Si el archivo no existe se usan los valores por defecto.
    ///
    /// # Errores
    /// Retorna `ReguiError::Config` si algún valor del archivo o del entorno
    /// no puede interpretarse.
    pub fn load() -> Result<Self, ReguiError> {
        let path =
            std::env::var("REGUI_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Lee un archivo `clave=valor`. Un archivo inexistente equivale a uno vacío.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReguiError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                log::info!("Configuración leída de {}", path.display());
                Self::parse(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!(
                    "No existe {}, se usan valores por defecto",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(ReguiError::Io(e)),
        }
    }

    /// Interpreta el contenido de un archivo de configuración.
    ///
    /// Las líneas vacías y las que empiezan con `#` se ignoran, igual que las
    /// claves desconocidas.
    pub fn parse(contents: &str) -> Result<Self, ReguiError> {
        let mut config = Self::default();

        for (number, raw_line) in contents.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ReguiError::Config(format!(
                    "line {}: expected key=value, got '{}'",
                    number + 1,
                    line
                )));
            };

            config.set(key.trim(), value.trim())?;
        }

        Ok(config)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ReguiError> {
        match key {
            "host" => {
                if value.is_empty() {
                    return Err(ReguiError::Config("host cannot be empty".to_string()));
                }
                self.host = value.to_string();
            }
            "port" => self.port = parse_port(value)?,
            "poll_interval_ms" => self.poll_interval = parse_millis(key, value)?,
            "connect_timeout_ms" => self.connect_timeout = parse_millis(key, value)?,
            "command_timeout_ms" => self.command_timeout = parse_millis(key, value)?,
            other => log::warn!("Clave de configuración desconocida: {}", other),
        }
        Ok(())
    }

    /// Aplica `REGUI_HOST`, `REGUI_PORT` y `REGUI_POLL_INTERVAL_MS` usando
    /// `lookup` para leer cada variable.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ReguiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        const OVERRIDES: [(&str, &str); 3] = [
            ("REGUI_HOST", "host"),
            ("REGUI_PORT", "port"),
            ("REGUI_POLL_INTERVAL_MS", "poll_interval_ms"),
        ];

        for (variable, key) in OVERRIDES {
            if let Some(value) = lookup(variable) {
                self.set(key, value.trim())?;
            }
        }
        Ok(())
    }
}

/// Convierte el texto de un puerto en `u16`, rechazando el puerto 0.
pub fn parse_port(value: &str) -> Result<u16, ReguiError> {
    match value.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ReguiError::Config(format!("invalid port '{}'", value))),
        Ok(port) => Ok(port),
    }
}

fn parse_millis(key: &str, value: &str) -> Result<Duration, ReguiError> {
    match value.parse::<u64>() {
        Ok(0) | Err(_) => Err(ReguiError::Config(format!(
            "{} must be a positive number of milliseconds, got '{}'",
            key, value
        ))),
        Ok(ms) => Ok(Duration::from_millis(ms)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.port, 6379);
    }

    #[test]
    fn test_parse_reads_known_keys() {
        let contents = "# servidor de pruebas\nhost = redis.local\nport=6380\n\npoll_interval_ms=500\ncommand_timeout_ms=250\n";
        let config = AppConfig::parse(contents).unwrap();

        assert_eq!(config.host, "redis.local");
        assert_eq!(config.port, 6380);
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.command_timeout, Duration::from_millis(250));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let config = AppConfig::parse("theme=dark\nport=7000").unwrap();
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(matches!(
            AppConfig::parse("host localhost"),
            Err(ReguiError::Config(_))
        ));
        assert!(matches!(
            AppConfig::parse("port=abc"),
            Err(ReguiError::Config(_))
        ));
        assert!(matches!(
            AppConfig::parse("poll_interval_ms=0"),
            Err(ReguiError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = AppConfig::parse("host=from-file\nport=6380").unwrap();
        let env: HashMap<&str, &str> = [("REGUI_HOST", "from-env"), ("REGUI_POLL_INTERVAL_MS", "1000")]
            .into_iter()
            .collect();

        config
            .apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.host, "from-env");
        assert_eq!(config.port, 6380);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let config = AppConfig::from_file("/nonexistent/regui-test.conf").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port(" 6379 ").unwrap(), 6379);
        assert!(parse_port("0").is_err());
        assert!(parse_port("70000").is_err());
        assert!(parse_port("").is_err());
    }
}
