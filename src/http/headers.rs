//! Reply header normalization.
//!
//! Header keys supplied by a hook are canonicalized to `Word-Word` casing
//! before the reply is written, and every reply carries the fixed `Server`
//! identification header.

/// Canonical key of the server identification header.
pub const SERVER: &str = "Server";

/// Capitalize each `-`-separated segment of a header key.
pub fn canonicalize(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Canonicalize every supplied key and insert the `Server` header,
/// overwriting any caller-supplied value for it.
pub fn normalize(headers: Vec<(String, String)>, server_token: &str) -> Vec<(String, String)> {
    let mut normalized: Vec<(String, String)> = headers
        .into_iter()
        .map(|(name, value)| (canonicalize(&name), value))
        .collect();
    normalized.retain(|(name, _)| name != SERVER);
    normalized.push((SERVER.to_string(), server_token.to_string()));
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_mixed_case_keys() {
        assert_eq!(canonicalize("cONTENT-lENGTH"), "Content-Length");
        assert_eq!(canonicalize("content-type"), "Content-Type");
        assert_eq!(canonicalize("x-request-id"), "X-Request-Id");
        assert_eq!(canonicalize("string"), "String");
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let once = canonicalize("aCCEPT-eNCODING");
        assert_eq!(canonicalize(&once), once);
    }

    #[test]
    fn normalize_keeps_values_and_appends_server() {
        let headers = vec![
            ("cONTENT-lENGTH".to_string(), "10".to_string()),
            ("string".to_string(), "hello world".to_string()),
        ];
        let normalized = normalize(headers, "git-relay/0.1.0");
        assert_eq!(
            normalized,
            vec![
                ("Content-Length".to_string(), "10".to_string()),
                ("String".to_string(), "hello world".to_string()),
                ("Server".to_string(), "git-relay/0.1.0".to_string()),
            ]
        );
    }

    #[test]
    fn normalize_overwrites_caller_server_header() {
        let headers = vec![("sErVeR".to_string(), "impostor/9".to_string())];
        let normalized = normalize(headers, "git-relay/0.1.0");
        assert_eq!(
            normalized,
            vec![("Server".to_string(), "git-relay/0.1.0".to_string())]
        );
    }
}
