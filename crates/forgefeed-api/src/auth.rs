// OAuth authorize URL construction for the web login flow

const AUTHORIZE_BASE: &str = "https://forgefeed.dev/login/oauth/authorize";

/// Scopes requested at sign-in. The client asks for everything the app
/// can ever need up front; the backend prunes what the account rejects.
pub const DEFAULT_SCOPES: &[&str] = &[
    "repo",
    "repo:status",
    "public_repo",
    "notifications",
    "user",
    "gist",
    "workflow",
    "read:org",
];

/// Build the authorize URL the login screen opens in a browser.
pub fn authorize_url(client_id: &str, redirect_uri: &str, scopes: &[&str]) -> String {
    authorize_url_at(AUTHORIZE_BASE, client_id, redirect_uri, scopes)
}

/// Same, against a custom authorize endpoint (self-hosted forges)
pub fn authorize_url_at(
    base: &str,
    client_id: &str,
    redirect_uri: &str,
    scopes: &[&str],
) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&scope={}",
        base,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&scopes.join(" "))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_encodes_params() {
        let url = authorize_url_at(
            "https://example.dev/authorize",
            "abc123",
            "forgefeed://oauth/callback",
            &["repo", "user"],
        );

        assert!(url.starts_with("https://example.dev/authorize?client_id=abc123"));
        assert!(url.contains("redirect_uri=forgefeed%3A%2F%2Foauth%2Fcallback"));
        assert!(url.contains("scope=repo%20user"));
    }

    #[test]
    fn test_default_scopes_include_repo_and_user() {
        assert!(DEFAULT_SCOPES.contains(&"repo"));
        assert!(DEFAULT_SCOPES.contains(&"user"));
    }
}
