use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GeneratorSettings {
    /// Fixed seed for reproducible runs; OS entropy when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_interval_ms() -> u64 {
    2_500
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh.interval_ms)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid server.bind '{}': {}", self.server.bind, e))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.refresh.interval_ms > 0,
            "refresh.interval_ms must be greater than zero"
        );
        self.bind_addr()?;
        Ok(())
    }
}

/// `config/dashboard.{toml,...}` if present, overridden by `DASHBOARD__SECTION__KEY`.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let dashboard: DashboardConfig = settings.try_deserialize()?;
    dashboard.validate()?;
    Ok(dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> anyhow::Result<DashboardConfig> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let dashboard: DashboardConfig = settings.try_deserialize()?;
        dashboard.validate()?;
        Ok(dashboard)
    }

    #[test]
    fn test_defaults_when_empty() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.refresh_interval(), Duration::from_millis(2_500));
        assert_eq!(cfg.generator.seed, None);
        assert_eq!(cfg.bind_addr().unwrap().port(), 8080);
        assert_eq!(cfg.logging.filter, "info");
    }

    #[test]
    fn test_overrides() {
        let cfg = parse(
            r#"
            [refresh]
            interval_ms = 500

            [generator]
            seed = 42

            [server]
            bind = "127.0.0.1:9090"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.refresh_interval(), Duration::from_millis(500));
        assert_eq!(cfg.generator.seed, Some(42));
        assert_eq!(cfg.bind_addr().unwrap().to_string(), "127.0.0.1:9090");
    }

    #[test]
    fn test_rejects_zero_interval() {
        assert!(parse("[refresh]\ninterval_ms = 0").is_err());
    }

    #[test]
    fn test_rejects_bad_bind() {
        assert!(parse("[server]\nbind = \"not-an-address\"").is_err());
    }
}
