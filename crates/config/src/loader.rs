use std::{
    fmt::Write,
    path::Path,
    sync::LazyLock,
};

use indoc::indoc;
use regex::{Captures, Regex};
use serde::Deserialize;
use toml::Value;

use crate::{Config, error::Error};

const API_KEY_FIELD: &str = "api_key";

static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*env\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder regex should be valid")
});

pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
    let path = path.as_ref().to_path_buf();
    let content = std::fs::read_to_string(&path)?;
    let mut raw_config: Value = toml::from_str(&content)?;

    expand_dynamic_strings(&mut Vec::new(), &mut raw_config)?;

    let config = Config::deserialize(raw_config)?;
    validate(&config)?;

    log::debug!(
        "Loaded configuration from {} with {} provider(s)",
        path.display(),
        config.llm.providers.len()
    );

    Ok(config)
}

pub(crate) fn validate(config: &Config) -> crate::Result<()> {
    if !config.llm.has_providers() {
        return Err(Error::Validation(
            indoc! {r#"
                No LLM providers configured. At least one provider is required, for example:

                  [llm.providers.claude]
                  type = "anthropic"
                  model = "claude-sonnet-4-20250514"
                  api_key = "{{ env.ANTHROPIC_API_KEY }}"
            "#}
            .to_string(),
        ));
    }

    for (id, provider) in &config.llm.providers {
        let api = provider.config();

        if api.model.trim().is_empty() {
            return Err(Error::Validation(format!("provider '{id}' has an empty model name")));
        }

        if let Some(temperature) = api.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(Error::Validation(format!(
                "provider '{id}' has temperature {temperature}, expected a value between 0 and 2"
            )));
        }

        if api.max_tokens == Some(0) {
            return Err(Error::Validation(format!("provider '{id}' has max_tokens set to zero")));
        }
    }

    if config.server.health.enabled && !config.server.health.path.starts_with('/') {
        return Err(Error::Validation(format!(
            "health endpoint path must start with '/', got '{}'",
            config.server.health.path
        )));
    }

    Ok(())
}

fn expand_dynamic_strings(path: &mut Vec<Result<String, usize>>, value: &mut Value) -> crate::Result<()> {
    match value {
        Value::String(s) => {
            if let Some(expanded) = expand_env(s).map_err(|reason| Error::EnvVarSubstitution {
                path: format_path(path),
                reason,
            })? {
                *s = expanded;
            }
        }
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                path.push(Err(i));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Table(map) => {
            let mut unresolved_credentials = Vec::new();

            for (key, value) in map.iter_mut() {
                path.push(Ok(key.clone()));

                match expand_dynamic_strings(path, value) {
                    // A missing credential only disables calls to its provider.
                    Err(Error::EnvVarSubstitution { path: field, reason }) if key == API_KEY_FIELD => {
                        log::warn!("Leaving {field} unset: {reason}");
                        unresolved_credentials.push(key.clone());
                    }
                    result => result?,
                }

                path.pop();
            }

            for key in unresolved_credentials {
                map.remove(&key);
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}

/// Replaces every `{{ env.NAME }}` placeholder. Returns `None` when the string has none.
fn expand_env(input: &str) -> Result<Option<String>, String> {
    if !ENV_PLACEHOLDER.is_match(input) {
        return Ok(None);
    }

    let mut missing = None;

    let expanded = ENV_PLACEHOLDER.replace_all(input, |captures: &Captures<'_>| {
        let name = &captures[1];

        match std::env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(format!("environment variable not found: `{name}`")),
        None => Ok(Some(expanded.into_owned())),
    }
}

fn format_path(path: &[Result<String, usize>]) -> String {
    let mut p = String::new();

    for segment in path {
        match segment {
            Ok(s) => {
                p.push_str(s);
                p.push('.');
            }
            Err(i) => {
                let _ = write!(p, "[{i}]");
            }
        }
    }

    if p.ends_with('.') {
        p.pop();
    }

    p
}
