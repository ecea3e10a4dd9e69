use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "catchmybus")]
#[command(about = "Bus schedule lookup service for Kerala")]
pub struct Config {
    /// Port to run the HTTP server on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// JSON snapshot the store is loaded from and written back to
    #[arg(long, env = "DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Sample data loaded when the store starts out empty
    #[arg(long, env = "SEED_FILE")]
    pub seed_file: Option<PathBuf>,

    /// Comma-separated list of origins allowed by CORS
    #[arg(
        long,
        env = "CORS_ORIGIN",
        value_delimiter = ',',
        default_value = "http://localhost:5173,http://localhost:3000"
    )]
    pub cors_origin: Vec<String>,

    #[arg(
        long,
        env = "GEOCODER_URL",
        default_value = "https://nominatim.openstreetmap.org/search"
    )]
    pub geocoder_url: String,

    /// Appended to every place name before geocoding
    #[arg(long, env = "GEOCODER_REGION", default_value = "Kerala, India")]
    pub geocoder_region: String,

    #[arg(long, env = "GEOCODER_USER_AGENT", default_value = "CatchMyBus/1.0")]
    pub geocoder_user_agent: String,

    #[arg(long, env = "GEOCODER_TIMEOUT_SECS", default_value = "10")]
    pub geocoder_timeout_secs: u64,
}

impl Config {
    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoder_timeout_secs)
    }

    pub fn cors_origins(&self) -> impl Iterator<Item = &str> {
        self.cors_origin
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
    }
}
