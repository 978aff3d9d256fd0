//! Configuration for Vector Search API

use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_vector_search::{OpenAIConfig, SearchSettings};

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub openai: OpenAIConfig,
    pub search: SearchSettings,
}

impl Config {
    /// Load everything from the environment.
    ///
    /// Fails on the first missing secret or unparsable value.
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let openai = OpenAIConfig::from_env()?;
        let search = SearchSettings::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            openai,
            search,
        })
    }
}
