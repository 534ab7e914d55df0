use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

pub const SETTINGS_FILE: &str = "sandbox.toml";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub public_url: Option<String>,
    pub auto_pay_after_polls: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8787".into(),
            public_url: None,
            auto_pay_after_polls: None,
        }
    }
}

impl Settings {
    /// Base URL the sandbox pay links point at.
    pub fn public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.server_bind))
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
                settings.server_bind = v.to_string();
            }
            if let Some(v) = file_cfg.get("public_url").and_then(toml::Value::as_str) {
                settings.public_url = Some(v.to_string());
            }
            if let Some(v) = file_cfg
                .get("auto_pay_after_polls")
                .and_then(toml::Value::as_integer)
            {
                settings.auto_pay_after_polls =
                    u32::try_from(v).ok().filter(|polls| *polls > 0);
            }
        }
    }

    if let Some(v) = env("SANDBOX_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("SANDBOX_PUBLIC_URL") {
        settings.public_url = Some(v);
    }

    if let Some(v) = env("APP__AUTO_PAY_AFTER_POLLS") {
        settings.auto_pay_after_polls = v.parse::<u32>().ok().filter(|polls| *polls > 0);
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
