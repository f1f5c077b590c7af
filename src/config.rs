use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    /// Base URL of the web client, used to build certificate verification links.
    pub client_url: String,
    /// External certificate renderer. When unset, a local artifact path is recorded instead.
    pub renderer_url: Option<String>,
    /// Webhook for resubmission-required notifications. When unset, events are only logged.
    pub notifier_webhook_url: Option<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            client_url: env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            renderer_url: env::var("RENDERER_URL").ok(),
            notifier_webhook_url: env::var("NOTIFIER_WEBHOOK_URL").ok(),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
