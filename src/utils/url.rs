//! Endpoint URL helpers.

/// Path of the chat completion endpoint, relative to the API base URL.
pub const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Strip trailing slashes so endpoint paths can be appended safely.
pub fn normalize_base_url(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

/// Join `base_url` and `endpoint` with exactly one slash between them.
///
/// ```
/// use parlance::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8080/v1/", "/chat/completions"),
///     "http://localhost:8080/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        normalize_base_url(base_url),
        endpoint.trim_start_matches('/')
    )
}

/// Checks that a base URL is usable before any request is made.
pub fn validate_base_url(base_url: &str) -> Result<(), String> {
    let trimmed = base_url.trim();
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| format!("base URL must start with http:// or https://, got: {base_url}"))?;
    if normalize_base_url(rest).is_empty() {
        return Err(format!("base URL has no host: {base_url}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_every_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://api.openai.com/v1///"),
            "https://api.openai.com/v1"
        );
        assert_eq!(normalize_base_url("https://api.openai.com"), "https://api.openai.com");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn construct_joins_with_single_slash() {
        for base in ["https://api.openai.com/v1", "https://api.openai.com/v1//"] {
            for endpoint in [CHAT_COMPLETIONS_PATH, "/chat/completions", "///chat/completions"] {
                assert_eq!(
                    construct_api_url(base, endpoint),
                    "https://api.openai.com/v1/chat/completions"
                );
            }
        }
    }

    #[test]
    fn validate_accepts_http_and_https() {
        assert!(validate_base_url("https://api.openai.com/v1").is_ok());
        assert!(validate_base_url("http://localhost:11434/v1/").is_ok());
    }

    #[test]
    fn validate_rejects_missing_scheme_or_host() {
        assert!(validate_base_url("api.openai.com/v1").is_err());
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("https://").is_err());
        assert!(validate_base_url("").is_err());
    }
}
