use crate::config::model::{APIConfig, Config, DebugConfig};
use crate::feed::date_key::DateKey;
use crate::gesture::SwipeConfig;
use std::env;
use std::str::FromStr;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_MAX_RETRIES: u32 = 3;

pub fn load_config() -> Config {
    load_config_from(|name| env::var(name).ok())
}

/// Same as [`load_config`], reading variables through `lookup`
pub fn load_config_from(lookup: impl Fn(&str) -> Option<String>) -> Config {
    let defaults = SwipeConfig::default();

    let base_url = lookup("EVENTS_API_URL")
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        panic!("Invalid config 'EVENTS_API_URL'. Expected an http(s) URL.");
    }

    Config {
        api_config: APIConfig {
            base_url,
            max_retries: load_number_config(&lookup, "API_MAX_RETRIES")
                .unwrap_or(DEFAULT_MAX_RETRIES),
        },
        swipe_config: SwipeConfig {
            threshold: load_distance_config(&lookup, "SWIPE_THRESHOLD")
                .unwrap_or(defaults.threshold),
            active_offset_x: load_distance_config(&lookup, "SWIPE_ACTIVE_OFFSET_X")
                .unwrap_or(defaults.active_offset_x),
            fail_offset_y: load_distance_config(&lookup, "SWIPE_FAIL_OFFSET_Y")
                .unwrap_or(defaults.fail_offset_y),
        },
        debug_config: DebugConfig {
            start_date: load_date_config(&lookup, "DEBUG_START_DATE"),
        },
        loki_url: lookup("LOKI_URL").filter(|url| !url.trim().is_empty()),
    }
}

fn load_number_config<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    lookup(name).map(|value| {
        value.trim().parse().unwrap_or_else(|_| {
            panic!("Invalid config '{}'. Expected a non-negative integer.", name)
        })
    })
}

fn load_distance_config(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<f32> {
    lookup(name).map(|value| match value.trim().parse::<f32>() {
        Ok(distance) if distance.is_finite() && distance >= 0.0 => distance,
        _ => panic!("Invalid config '{}'. Expected a non-negative number.", name),
    })
}

fn load_date_config(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<DateKey> {
    lookup(name).map(|value| {
        DateKey::parse(&value)
            .unwrap_or_else(|_| panic!("Invalid config '{}'. Expected YYYY-MM-DD.", name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        load_config_from(|name| vars.get(name).cloned())
    }

    #[test_log::test]
    fn should_use_defaults() {
        let config = load(&[]);

        assert_eq!(config.api_config.base_url, DEFAULT_API_URL);
        assert_eq!(config.api_config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.swipe_config, SwipeConfig::default());
        assert_eq!(config.debug_config.start_date, None);
        assert_eq!(config.loki_url, None);
    }

    #[test_log::test]
    fn should_read_overrides() {
        let config = load(&[
            ("EVENTS_API_URL", "http://192.168.0.131:8000"),
            ("API_MAX_RETRIES", "0"),
            ("SWIPE_THRESHOLD", "80"),
            ("DEBUG_START_DATE", "2025-03-10"),
        ]);

        assert_eq!(config.api_config.base_url, "http://192.168.0.131:8000");
        assert_eq!(config.api_config.max_retries, 0);
        assert_eq!(config.swipe_config.threshold, 80.0);
        assert_eq!(config.debug_config.start_date, DateKey::from_ymd(2025, 3, 10));
    }

    #[test]
    #[should_panic(expected = "SWIPE_THRESHOLD")]
    fn negative_threshold_should_panic() {
        load(&[("SWIPE_THRESHOLD", "-5")]);
    }

    #[test]
    #[should_panic(expected = "API_MAX_RETRIES")]
    fn non_numeric_retries_should_panic() {
        load(&[("API_MAX_RETRIES", "many")]);
    }

    #[test]
    #[should_panic(expected = "EVENTS_API_URL")]
    fn url_without_scheme_should_panic() {
        load(&[("EVENTS_API_URL", "192.168.0.131:8000")]);
    }
}
