use std::{collections::HashMap, fs};

use shared::protocol::DEFAULT_OUTPUT_BASE;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub output_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            output_base: DEFAULT_OUTPUT_BASE.into(),
        }
    }
}

/// Defaults, overridden by `painter.toml` in the working directory, then by
/// `PAINTER_SERVER_URL` / `PAINTER_OUTPUT_BASE` environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("painter.toml") {
        apply_file_config(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("PAINTER_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("PAINTER_OUTPUT_BASE") {
        settings.output_base = v;
    }

    settings
}

fn apply_file_config(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("server_url") {
            settings.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("output_base") {
            settings.output_base = v.clone();
        }
    }
}
