use std::collections::BTreeMap;

use anyhow::{anyhow, Context};
use models::heating_cooling::HeatingCooling;

const DEFAULT_PORT: u16 = 3030;
const DEFAULT_MODE_MAPPING: &str = "0:Off,1:Heat,2:Cool,3:Heat_Cool";
const DEFAULT_VALID_MODES: &str = "0,1";

#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Base of the backend's secret-protected API, ending in `/`.
    pub api_base: String,
    pub secret: String,
    pub port: u16,
    /// Accessory mode to backend mode name.
    pub mode_mapping: BTreeMap<HeatingCooling, String>,
    /// Target modes the accessory may select.
    pub valid_modes: Vec<HeatingCooling>,
}

impl BridgeConfig {
    /// Reads `NIDO_*` variables from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut api_base = var("NIDO_API_BASE").context("NIDO_API_BASE is not set")?;
        if !api_base.ends_with('/') {
            api_base.push('/');
        }
        let secret = var("NIDO_API_SECRET").context("NIDO_API_SECRET is not set")?;
        let port = match var("NIDO_BRIDGE_PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("invalid NIDO_BRIDGE_PORT {port:?}"))?,
            None => DEFAULT_PORT,
        };
        let mode_mapping = parse_mode_mapping(
            var("NIDO_MODE_MAPPING")
                .as_deref()
                .unwrap_or(DEFAULT_MODE_MAPPING),
        )?;
        let valid_modes = parse_valid_modes(
            var("NIDO_VALID_MODES")
                .as_deref()
                .unwrap_or(DEFAULT_VALID_MODES),
        )?;

        Ok(BridgeConfig {
            api_base,
            secret,
            port,
            mode_mapping,
            valid_modes,
        })
    }

    /// Backend name for `mode`, if the accessory may select it.
    pub fn backend_mode(&self, mode: HeatingCooling) -> Option<&str> {
        if !self.valid_modes.contains(&mode) {
            return None;
        }
        self.mode_mapping.get(&mode).map(String::as_str)
    }
}

fn parse_mode(value: &str) -> anyhow::Result<HeatingCooling> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(HeatingCooling::from_value)
        .ok_or_else(|| anyhow!("{value:?} is not a heating/cooling mode"))
}

/// Parses `value:Name` pairs, e.g. `0:Off,1:Heat`.
fn parse_mode_mapping(mapping: &str) -> anyhow::Result<BTreeMap<HeatingCooling, String>> {
    mapping
        .split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| -> anyhow::Result<(HeatingCooling, String)> {
            let (mode, name) = pair
                .split_once(':')
                .ok_or_else(|| anyhow!("mode mapping entry {pair:?} has no `:`"))?;
            Ok((parse_mode(mode)?, name.trim().to_string()))
        })
        .collect()
}

fn parse_valid_modes(modes: &str) -> anyhow::Result<Vec<HeatingCooling>> {
    modes
        .split(',')
        .filter(|mode| !mode.trim().is_empty())
        .map(parse_mode)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults() {
        let config = BridgeConfig::from_vars(vars(&[
            ("NIDO_API_BASE", "http://nido.local/api_local"),
            ("NIDO_API_SECRET", "abc"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "http://nido.local/api_local/");
        assert_eq!(config.port, 3030);
        assert_eq!(config.backend_mode(HeatingCooling::Heat), Some("Heat"));
        assert_eq!(config.backend_mode(HeatingCooling::Auto), None);
    }

    #[test]
    fn custom_mapping() {
        let config = BridgeConfig::from_vars(vars(&[
            ("NIDO_API_BASE", "http://nido.local/api_local/"),
            ("NIDO_API_SECRET", "abc"),
            ("NIDO_BRIDGE_PORT", "8080"),
            ("NIDO_MODE_MAPPING", "0:Off, 3:Heat_Cool"),
            ("NIDO_VALID_MODES", "0,3"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend_mode(HeatingCooling::Auto), Some("Heat_Cool"));
        assert_eq!(config.backend_mode(HeatingCooling::Heat), None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(BridgeConfig::from_vars(vars(&[("NIDO_API_SECRET", "abc")])).is_err());
        assert!(BridgeConfig::from_vars(vars(&[
            ("NIDO_API_BASE", "http://nido.local/"),
            ("NIDO_API_SECRET", "abc"),
            ("NIDO_MODE_MAPPING", "7:Fan"),
        ]))
        .is_err());
        assert!(BridgeConfig::from_vars(vars(&[
            ("NIDO_API_BASE", "http://nido.local/"),
            ("NIDO_API_SECRET", "abc"),
            ("NIDO_BRIDGE_PORT", "http"),
        ]))
        .is_err());
    }
}
