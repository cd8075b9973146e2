use crate::gesture::SwipeConfig;
use crate::feed::date_key::DateKey;

#[derive(Debug)]
pub struct Config {
    pub api_config: APIConfig,
    pub swipe_config: SwipeConfig,
    pub debug_config: DebugConfig,
    pub loki_url: Option<String>,
}

#[derive(Debug)]
pub struct APIConfig {
    /// Also the base of `/static/images/`
    pub base_url: String,
    pub max_retries: u32,
}

#[derive(Debug)]
pub struct DebugConfig {
    pub start_date: Option<DateKey>,
}
