use config::{Config, ConfigError, Environment};
use lazy_static::lazy_static;
use serde::Deserialize;

fn default_service_name() -> String {
    "vizzarjobs".into()
}

fn default_listen_port() -> String {
    "8000".into()
}

fn default_pool_max_connections() -> u32 {
    5
}

fn default_session_ttl_hours() -> i32 {
    24 * 7
}

#[derive(Deserialize, Debug)]
pub struct Settings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: String,
    pub database_url: String,
    #[serde(default = "default_pool_max_connections")]
    pub database_pool_max_connections: u32,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i32,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let conf = Config::builder()
            .add_source(Environment::default())
            .build()?;
        conf.try_deserialize()
    }
}

lazy_static! {
    pub static ref settings: Settings = Settings::new().expect("improperly configured");
}
