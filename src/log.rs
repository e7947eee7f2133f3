use std::sync::OnceLock;

fn reveal_secrets() -> bool {
    static REVEAL_SECRETS_CACHE: OnceLock<bool> = OnceLock::new();

    *REVEAL_SECRETS_CACHE.get_or_init(|| {
        std::env::var("ADMINRPC_REVEAL_SECRETS")
            .map(|v| {
                let val = v.to_lowercase();
                val == "true" || val == "1"
            })
            .unwrap_or(false)
    })
}

/// Masks a secret (session token, account name) showing only start and end
/// characters. If ADMINRPC_REVEAL_SECRETS is true, returns the original string.
pub fn mask_string(s: &str) -> String {
    if reveal_secrets() {
        return s.to_string();
    }

    if s.len() <= 12 {
        return "***".to_string();
    }

    format!("{}...{}", &s[0..4], &s[s.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_are_fully_masked() {
        assert_eq!(mask_string("admin"), "***");
        assert_eq!(mask_string(""), "***");
    }

    #[test]
    fn long_values_keep_head_and_tail() {
        assert_eq!(mask_string("0123456789abcdef"), "0123...cdef");
    }
}
