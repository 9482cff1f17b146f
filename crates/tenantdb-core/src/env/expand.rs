//! `%VAR%` / `$VAR` / `${VAR}` expansion
//!
//! Undefined variables are left exactly as written. Connection-string
//! templates rely on this: `%db%` and `%server%` survive expansion unless the
//! environment happens to define `db` or `server`.

use super::traits::Environment;

/// Expand environment-variable references in `input`
pub fn expand_env_vars(input: &str, env: &dyn Environment) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(['%', '$']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let consumed = if tail.starts_with('%') {
            expand_percent(tail, env, &mut out)
        } else {
            expand_dollar(tail, env, &mut out)
        };
        rest = &tail[consumed..];
    }

    out.push_str(rest);
    out
}

/// `tail` starts with '%'. Returns how many bytes were consumed.
fn expand_percent(tail: &str, env: &dyn Environment, out: &mut String) -> usize {
    let Some(close) = tail[1..].find('%').map(|i| i + 1) else {
        out.push('%');
        return 1;
    };

    let name = &tail[1..close];
    if !name.is_empty() {
        if let Some(value) = env.var(name) {
            out.push_str(&value);
            return close + 1;
        }
    }

    // Unknown: keep the opening '%' and the name, rescan from the closing one
    out.push_str(&tail[..close]);
    close
}

/// `tail` starts with '$'. Returns how many bytes were consumed.
fn expand_dollar(tail: &str, env: &dyn Environment, out: &mut String) -> usize {
    let body = &tail[1..];

    if let Some(braced) = body.strip_prefix('{') {
        if let Some(close) = braced.find('}') {
            let name = &braced[..close];
            let whole = close + 3;
            if is_var_name(name) {
                if let Some(value) = env.var(name) {
                    out.push_str(&value);
                    return whole;
                }
            }
            out.push_str(&tail[..whole]);
            return whole;
        }
        out.push('$');
        return 1;
    }

    let len = var_name_len(body);
    if len == 0 {
        out.push('$');
        return 1;
    }

    match env.var(&body[..len]) {
        Some(value) => out.push_str(&value),
        None => out.push_str(&tail[..len + 1]),
    }
    len + 1
}

fn var_name_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn is_var_name(s: &str) -> bool {
    !s.is_empty() && var_name_len(s) == s.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MemoryEnvironment;

    fn env() -> MemoryEnvironment {
        MemoryEnvironment::with_vars([
            ("DB_HOST", "sql01.internal"),
            ("DB_PASSWORD", "s3cret"),
            ("EMPTY", ""),
        ])
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(expand_env_vars("", &env()), "");
    }

    #[test]
    fn test_percent_style() {
        assert_eq!(
            expand_env_vars("Server=%DB_HOST%;Password=%DB_PASSWORD%", &env()),
            "Server=sql01.internal;Password=s3cret"
        );
    }

    #[test]
    fn test_dollar_styles() {
        assert_eq!(expand_env_vars("host=$DB_HOST;", &env()), "host=sql01.internal;");
        assert_eq!(expand_env_vars("host=${DB_HOST}x", &env()), "host=sql01.internalx");
        assert_eq!(expand_env_vars("[$EMPTY]", &env()), "[]");
    }

    #[test]
    fn test_unknown_variables_are_left_alone() {
        assert_eq!(
            expand_env_vars("Database=%db%;Server=%server%", &env()),
            "Database=%db%;Server=%server%"
        );
        assert_eq!(expand_env_vars("$UNSET and ${UNSET}", &env()), "$UNSET and ${UNSET}");
    }

    #[test]
    fn test_stray_markers() {
        assert_eq!(expand_env_vars("100%", &env()), "100%");
        assert_eq!(expand_env_vars("%%DB_HOST%", &env()), "%sql01.internal");
        assert_eq!(expand_env_vars("pa$$word", &env()), "pa$$word");
        assert_eq!(expand_env_vars("cost: $5", &env()), "cost: $5");
        assert_eq!(expand_env_vars("${unclosed", &env()), "${unclosed");
        assert_eq!(expand_env_vars("${not valid}", &env()), "${not valid}");
    }

    #[test]
    fn test_unknown_then_known() {
        // Scanning restarts at the closing marker of an unknown name
        assert_eq!(expand_env_vars("%nope%DB_HOST%", &env()), "%nopesql01.internal");
        assert_eq!(expand_env_vars("%nope%%DB_HOST%", &env()), "%nope%sql01.internal");
    }
}
