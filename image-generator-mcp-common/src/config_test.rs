//! Tests for the configuration module.
//!
//! Configuration is built through `Config::from_lookup` with a map-backed
//! lookup so no test mutates the process environment.

use std::collections::HashMap;

use proptest::prelude::*;

use crate::config::{Config, DEFAULT_API_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_SIZE, DEFAULT_PORT};
use crate::error::ConfigError;

fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|name| map.get(name).cloned())
}

/// Strategy for generating plausible API keys
fn api_key_strategy() -> impl Strategy<Value = String> {
    "sk-[A-Za-z0-9]{16,48}"
}

/// Strategy for generating valid port numbers
fn port_strategy() -> impl Strategy<Value = u16> {
    1024u16..65535u16
}

#[cfg(test)]
mod config_logic_tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults_apply_when_only_api_key_is_set() {
        let config = load(&[("OPENAI_API_KEY", "sk-test")]).unwrap();

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.image_size, DEFAULT_IMAGE_SIZE);
        assert_eq!(config.output_base, None);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn missing_api_key_still_loads() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn missing_api_key_is_reported_on_demand() {
        let config = load(&[]).unwrap();
        let err = config.require_api_key().unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "OPENAI_API_KEY"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = load(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert_eq!(config.api_key, None);
        assert!(matches!(config.require_api_key(), Err(ConfigError::MissingEnvVar(_))));
    }

    #[test]
    fn require_api_key_returns_configured_key() {
        let config = load(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn overrides_are_honoured() {
        let config = load(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:9999/v1"),
            ("OPENAI_IMAGE_MODEL", "gpt-image-1"),
            ("OPENAI_IMAGE_SIZE", "512x512"),
            ("IMAGE_OUTPUT_BASE", "/srv/images"),
            ("PORT", "3000"),
        ])
        .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:9999/v1");
        assert_eq!(config.image_model, "gpt-image-1");
        assert_eq!(config.image_size, "512x512");
        assert_eq!(config.output_base, Some(PathBuf::from("/srv/images")));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = load(&[("OPENAI_API_KEY", "sk-test"), ("PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name, _) if name == "PORT"));
    }

    #[test]
    fn invalid_size_is_rejected() {
        for size in ["1024", "x1024", "0x0", "big"] {
            let err = load(&[("OPENAI_API_KEY", "sk-test"), ("OPENAI_IMAGE_SIZE", size)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue(ref name, _) if name == "OPENAI_IMAGE_SIZE"),
                "size {} should be rejected",
                size
            );
        }
    }

    #[test]
    fn images_endpoint_formats_correctly() {
        let config = load(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.images_endpoint(), "https://api.openai.com/v1/images/generations");
    }

    #[test]
    fn images_endpoint_tolerates_trailing_slash() {
        let config = load(&[("OPENAI_API_KEY", "sk-test"), ("OPENAI_BASE_URL", "http://mock/v1/")]).unwrap();
        assert_eq!(config.images_endpoint(), "http://mock/v1/images/generations");
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = load(&[("OPENAI_API_KEY", "sk-super-secret")]).unwrap();
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("sk-super-secret"));
        assert!(debug_str.contains("redacted"));
        assert!(debug_str.contains(DEFAULT_IMAGE_MODEL));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        /// Any non-blank API key is carried through unchanged.
        #[test]
        fn config_preserves_api_key(api_key in api_key_strategy()) {
            let config = load(&[("OPENAI_API_KEY", api_key.as_str())]).unwrap();
            prop_assert_eq!(config.api_key, Some(api_key));
        }

        /// Any valid port string parses to the same number.
        #[test]
        fn config_preserves_port(port in port_strategy()) {
            let port_str = port.to_string();
            let config = load(&[("OPENAI_API_KEY", "sk-test"), ("PORT", port_str.as_str())]).unwrap();
            prop_assert_eq!(config.port, port);
        }

        /// Any positive WIDTHxHEIGHT pair is accepted verbatim.
        #[test]
        fn config_accepts_well_formed_sizes(w in 1u32..4096, h in 1u32..4096) {
            let size = format!("{}x{}", w, h);
            let config = load(&[("OPENAI_API_KEY", "sk-test"), ("OPENAI_IMAGE_SIZE", size.as_str())]).unwrap();
            prop_assert_eq!(config.image_size, size);
        }

        /// The endpoint always ends with the images path and starts with the base URL.
        #[test]
        fn images_endpoint_extends_base_url(host in "[a-z]{3,12}") {
            let base = format!("https://{}.example.com/v1", host);
            let config = load(&[("OPENAI_API_KEY", "sk-test"), ("OPENAI_BASE_URL", base.as_str())]).unwrap();
            let endpoint = config.images_endpoint();
            prop_assert!(endpoint.starts_with(&base));
            prop_assert!(endpoint.ends_with("/images/generations"));
        }
    }
}
