use std::env;
use std::fs;
use std::path::Path;

use furnish_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, OutputFormat};

struct Field<'a> {
    key_path: &'static str,
    value: String,
    env_keys: &'static [&'static str],
    flag: Option<(&'static str, bool)>,
    doc: Option<&'a Value>,
    path: Option<&'a Path>,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure("config", &error, OutputFormat::Text),
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let doc = config_file_doc.as_ref();
    let path = config_file_path.as_deref();
    let overrides = &options.overrides;

    let fields = [
        Field {
            key_path: "catalog.base_url",
            value: config.catalog.base_url.clone(),
            env_keys: &["FURNISH_CATALOG_BASE_URL"],
            flag: Some(("--base-url", overrides.catalog_base_url.is_some())),
            doc,
            path,
        },
        Field {
            key_path: "catalog.timeout_secs",
            value: config.catalog.timeout_secs.to_string(),
            env_keys: &["FURNISH_CATALOG_TIMEOUT_SECS"],
            flag: Some(("--timeout-secs", overrides.catalog_timeout_secs.is_some())),
            doc,
            path,
        },
        Field {
            key_path: "search.debounce_ms",
            value: config.search.debounce_ms.to_string(),
            env_keys: &["FURNISH_SEARCH_DEBOUNCE_MS"],
            flag: Some(("--debounce-ms", overrides.search_debounce_ms.is_some())),
            doc,
            path,
        },
        Field {
            key_path: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["FURNISH_LOGGING_LEVEL", "FURNISH_LOG_LEVEL"],
            flag: Some(("--log-level", overrides.log_level.is_some())),
            doc,
            path,
        },
        Field {
            key_path: "logging.format",
            value: format!("{:?}", config.logging.format).to_ascii_lowercase(),
            env_keys: &["FURNISH_LOGGING_FORMAT", "FURNISH_LOG_FORMAT"],
            flag: None,
            doc,
            path,
        },
    ];

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];
    lines.extend(
        fields.iter().map(|field| render_line(field.key_path, &field.value, field_source(field))),
    );

    CommandResult::text(lines.join("\n"))
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(field: &Field<'_>) -> String {
    if let Some((flag, true)) = field.flag {
        return format!("flag ({flag})");
    }

    if let Some(env_key) = field.env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = field.doc {
        if contains_path(doc, field.key_path) {
            let file_path = field
                .path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::contains_path;

    #[test]
    fn contains_path_walks_nested_tables() {
        let doc: toml::Value = "[catalog]\nbase_url = \"http://shop.test/api\"\n"
            .parse()
            .expect("valid toml");

        assert!(contains_path(&doc, "catalog.base_url"));
        assert!(!contains_path(&doc, "catalog.timeout_secs"));
        assert!(!contains_path(&doc, "search.debounce_ms"));
    }
}
