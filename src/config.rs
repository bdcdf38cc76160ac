use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WORKERS: usize = 10;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl Config {
    pub fn new(port: u16, workers: usize) -> Self {
        Self { port, workers }
    }

    /// Loads configuration from the environment (`NETC_PORT`,
    /// `NETC_WORKERS`), falling back to defaults for anything unset
    /// or unparsable.
    pub fn load() -> Self {
        let port = std::env::var("NETC_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let workers = std::env::var("NETC_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_WORKERS);
        Self { port, workers }
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let cfg = serde_yaml::from_str(&contents)?;
        Ok(cfg)
    }

    /// The server binds all local interfaces; only the port is configurable.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
