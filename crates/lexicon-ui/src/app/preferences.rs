//! Configuration overrides persisted in the browser.

use gloo::console;
use gloo::storage::{LocalStorage, Storage};

use crate::config::UiConfig;

pub(crate) const CONFIG_KEY: &str = "lexicon.config";

/// Defaults merged with the JSON stored under [`CONFIG_KEY`].
///
/// Unreadable or invalid overrides are logged and ignored.
pub(crate) fn load_config() -> UiConfig {
    let raw = match LocalStorage::raw().get_item(CONFIG_KEY) {
        Ok(Some(raw)) if !raw.trim().is_empty() => raw,
        Ok(_) => return UiConfig::default(),
        Err(err) => {
            console::error!("storage operation failed", "get", CONFIG_KEY, err);
            return UiConfig::default();
        }
    };
    match UiConfig::from_json(&raw) {
        Ok(config) => config,
        Err(err) => {
            console::warn!("ignoring stored configuration", CONFIG_KEY, err.to_string());
            UiConfig::default()
        }
    }
}
