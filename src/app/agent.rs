//! User-agent sniffing for programmatic clients.

/// Substrings that mark a user agent as a CLI or HTTP library.
const CLI_SIGNATURES: &[&str] = &[
    "curl",
    "wget",
    "powershell",
    "httpie",
    "python-requests",
    "python-urllib",
    "go-http-client",
    "fetch",
    "aria2",
    "http_client",
    "winhttp",
    "axios",
    "node-fetch",
];

/// True when the user agent looks like a command-line or library client.
pub fn is_cli_user_agent(user_agent: &str) -> bool {
    if user_agent.is_empty() {
        return false;
    }
    let ua = user_agent.to_ascii_lowercase();
    CLI_SIGNATURES.iter().any(|sig| ua.contains(sig))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_agents() {
        assert!(is_cli_user_agent("curl/7.80.0"));
        assert!(is_cli_user_agent("Wget/1.21"));
        assert!(is_cli_user_agent("python-requests/2.31"));
        assert!(is_cli_user_agent("Go-http-client/1.1"));
    }

    #[test]
    fn test_browsers_and_empty() {
        assert!(!is_cli_user_agent(""));
        assert!(!is_cli_user_agent(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36"
        ));
    }
}
