use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No Cloudflare API token configured (set CLOUDFLARE_API_TOKEN or run 'cloudflare-speed configure')")]
    MissingToken,

    #[error("Unknown speed setting '{0}' (expected speed_brain, fonts, early_hints or 0rtt)")]
    UnknownSetting(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
