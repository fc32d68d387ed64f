use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const ENV_VAR: &str = "BIRD_TARGETS_ENV";
const HOST_VAR: &str = "BIRD_TARGETS_HOST";
const PORT_VAR: &str = "BIRD_TARGETS_PORT";
const LOG_LEVEL_VAR: &str = "BIRD_TARGETS_LOG_LEVEL";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Deployment stage. Selects how log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Server and logging settings for the `serve` command.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let telemetry = TelemetryConfig::load();

        let host = env_or(HOST_VAR, DEFAULT_HOST);
        let port = match env::var(PORT_VAR) {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            server: ServerConfig { host, port },
            telemetry,
        })
    }
}

/// Where the map server binds.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Log filter and rendering. Loading never fails, so offline commands ignore server settings.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub log_level: String,
    pub environment: AppEnvironment,
}

impl TelemetryConfig {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Self {
            log_level: env_or(LOG_LEVEL_VAR, DEFAULT_LOG_LEVEL),
            environment: env::var(ENV_VAR)
                .map(|raw| AppEnvironment::from_str(&raw))
                .unwrap_or_default(),
        }
    }

    /// Colored output is only for interactive development.
    pub fn ansi(&self) -> bool {
        self.environment == AppEnvironment::Development
    }

    /// Production lines drop the module target.
    pub fn show_target(&self) -> bool {
        self.environment != AppEnvironment::Production
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "{PORT_VAR} must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "{HOST_VAR} must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    fn env_lock() -> MutexGuard<'static, ()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        let guard = GUARD
            .get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env mutex poisoned");
        for key in [ENV_VAR, HOST_VAR, PORT_VAR, LOG_LEVEL_VAR] {
            env::remove_var(key);
        }
        guard
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_lock();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.environment, AppEnvironment::Development);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_lock();
        env::set_var(HOST_VAR, "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8000));
        env::remove_var(HOST_VAR);
    }

    #[test]
    fn rejects_non_numeric_port() {
        let _lock = env_lock();
        env::set_var(PORT_VAR, "eighty");
        let error = AppConfig::load().expect_err("port must be numeric");
        assert!(matches!(error, ConfigError::InvalidPort));
        env::remove_var(PORT_VAR);
    }

    #[test]
    fn telemetry_ignores_server_settings() {
        let _lock = env_lock();
        env::set_var(PORT_VAR, "eighty");
        env::set_var(LOG_LEVEL_VAR, "debug");
        let telemetry = TelemetryConfig::load();
        assert_eq!(telemetry.log_level, "debug");
        env::remove_var(PORT_VAR);
        env::remove_var(LOG_LEVEL_VAR);
    }

    #[test]
    fn environment_selects_log_rendering() {
        let _lock = env_lock();
        env::set_var(ENV_VAR, " PROD ");
        let production = TelemetryConfig::load();
        assert_eq!(production.environment, AppEnvironment::Production);
        assert!(!production.ansi());
        assert!(!production.show_target());

        env::set_var(ENV_VAR, "ci");
        let test = TelemetryConfig::load();
        assert!(!test.ansi());
        assert!(test.show_target());

        env::set_var(ENV_VAR, "staging");
        let development = TelemetryConfig::load();
        assert_eq!(development.environment, AppEnvironment::Development);
        assert!(development.ansi());
        env::remove_var(ENV_VAR);
    }
}
