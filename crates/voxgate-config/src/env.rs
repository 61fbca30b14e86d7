use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Matches `{{ env.VAR }}` and `{{ env.VAR | default("fallback") }}`
fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
    })
}

/// Expand `{{ env.VAR }}` placeholders in raw TOML text
///
/// `{{ env.VAR | default("x") }}` falls back to `x` when `VAR` is unset.
/// Comment lines are copied through untouched so commented-out secrets
/// never have to exist in the environment.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut lines = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
        } else {
            lines.push(expand_line(line)?);
        }
    }

    let mut output = lines.join("\n");
    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

fn expand_line(line: &str) -> Result<String, String> {
    let mut expanded = String::with_capacity(line.len());
    let mut cursor = 0;

    for captures in placeholder().captures_iter(line) {
        let Some(whole) = captures.get(0) else { continue };

        expanded.push_str(&line[cursor..whole.start()]);
        expanded.push_str(&resolve(&captures)?);
        cursor = whole.end();
    }

    expanded.push_str(&line[cursor..]);
    Ok(expanded)
}

fn resolve(captures: &Captures<'_>) -> Result<String, String> {
    let key = captures.get(1).map_or("", |m| m.as_str());
    let fallback = captures.get(2).map(|m| m.as_str());

    let Some(var_name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(var_name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback.to_string()),
        (Err(_), None) => Err(format!("environment variable not found: `{var_name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_placeholders() {
        let input = "key = \"value\"";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn expands_several_vars_across_lines() {
        let vars = [("VOX_KEY_1", Some("one")), ("VOX_KEY_2", Some("two"))];
        temp_env::with_vars(vars, || {
            let result = expand_env("a = \"{{ env.VOX_KEY_1 }}\"\nb = \"{{env.VOX_KEY_2}}\"\n").unwrap();
            assert_eq!(result, "a = \"one\"\nb = \"two\"\n");
        });
    }

    #[test]
    fn missing_var_is_an_error() {
        temp_env::with_var_unset("VOX_MISSING", || {
            let err = expand_env("key = \"{{ env.VOX_MISSING }}\"").unwrap_err();
            assert!(err.contains("VOX_MISSING"));
        });
    }

    #[test]
    fn default_used_when_var_missing() {
        temp_env::with_var_unset("VOX_OPTIONAL", || {
            let result = expand_env("key = \"{{ env.VOX_OPTIONAL | default(\"\") }}\"").unwrap();
            assert_eq!(result, "key = \"\"");
        });
    }

    #[test]
    fn default_ignored_when_var_present() {
        temp_env::with_var("VOX_OPTIONAL", Some("actual"), || {
            let result = expand_env("key = \"{{ env.VOX_OPTIONAL | default(\"fallback\") }}\"").unwrap();
            assert_eq!(result, "key = \"actual\"");
        });
    }

    #[test]
    fn unsupported_scope() {
        let err = expand_env("key = \"{{ file.SECRET }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn comment_lines_are_not_expanded() {
        temp_env::with_var_unset("VOX_MISSING", || {
            let input = "  # api_key = \"{{ env.VOX_MISSING }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
