use anyhow::Result;
use regex::Regex;
use std::env;
use tracing::{debug, warn};

/// `${VAR}` or `${VAR:-fallback}`. Bare `$VAR` is left alone because
/// index symbols such as `$SPX.X` use a leading dollar.
const PLACEHOLDER: &str = r"\$\{(\w+)(?::-([^}]*))?\}";

/// Substitute environment variables in the format `${VAR_NAME}` or
/// `${VAR_NAME:-default}`
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(PLACEHOLDER)?;
    let mut missing_vars = Vec::new();

    let result = re.replace_all(content, |caps: &regex::Captures<'_>| {
        let var_name = &caps[1];
        match (env::var(var_name), caps.get(2)) {
            (Ok(value), _) => {
                debug!("Substituting environment variable: {} = \"{}\"", var_name, value);
                value
            }
            (Err(_), Some(fallback)) => {
                debug!("Environment variable '{}' not set, using inline default", var_name);
                fallback.as_str().to_string()
            }
            (Err(_), None) => {
                warn!("Environment variable '{}' not set", var_name);
                missing_vars.push(var_name.to_string());
                // Keep the placeholder; the validator reports it
                caps[0].to_string()
            }
        }
    });

    if !missing_vars.is_empty() {
        debug!("Environment variables not set: {:?}", missing_vars);
    }

    Ok(result.into_owned())
}

/// Get environment variable with a default value
pub fn get_env_or_default(var_name: &str, default: &str) -> String {
    match env::var(var_name) {
        Ok(value) => {
            debug!("Using environment variable: {} = \"{}\"", var_name, value);
            value
        }
        Err(_) => {
            debug!(
                "Environment variable '{}' not set, using default: \"{}\"",
                var_name, default
            );
            default.to_string()
        }
    }
}

/// Check if a string contains unresolved `${...}` placeholders
pub fn has_unresolved_env_vars(content: &str) -> bool {
    Regex::new(PLACEHOLDER)
        .map(|re| re.is_match(content))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_set_variable() {
        env::set_var("GEX_TEST_ARCHIVE_DIR", "/tmp/gex");
        let out = substitute_env_vars("path: \"${GEX_TEST_ARCHIVE_DIR}/spx.jsonl\"").unwrap();
        assert_eq!(out, "path: \"/tmp/gex/spx.jsonl\"");
    }

    #[test]
    fn test_inline_default_used_when_unset() {
        env::remove_var("GEX_TEST_UNSET_PORT");
        let out = substitute_env_vars("port: ${GEX_TEST_UNSET_PORT:-9100}").unwrap();
        assert_eq!(out, "port: 9100");
    }

    #[test]
    fn test_missing_variable_keeps_placeholder() {
        env::remove_var("GEX_TEST_MISSING");
        let out = substitute_env_vars("symbol: ${GEX_TEST_MISSING}").unwrap();
        assert_eq!(out, "symbol: ${GEX_TEST_MISSING}");
        assert!(has_unresolved_env_vars(&out));
    }

    #[test]
    fn test_dollar_symbols_are_untouched() {
        let out = substitute_env_vars("symbol: \"$SPX.X\"").unwrap();
        assert_eq!(out, "symbol: \"$SPX.X\"");
        assert!(!has_unresolved_env_vars(&out));
    }

    #[test]
    fn test_get_env_or_default() {
        env::remove_var("GEX_TEST_DEFAULTED");
        assert_eq!(get_env_or_default("GEX_TEST_DEFAULTED", "x"), "x");
    }
}
