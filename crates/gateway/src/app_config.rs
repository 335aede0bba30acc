//! Application configuration loading.

use quotron_core::Config;

/// Load configuration from `.env` and environment variables.
pub fn load_config() -> Config {
    quotron_core::config::load_dotenv();
    Config::from_env()
}
