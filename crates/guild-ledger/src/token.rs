//! Deregistration token generation.

use rand::distributions::Alphanumeric;
use rand::Rng;

use guild_db::models::DEREGISTRATION_TOKEN_LEN;

/// Generate a random deregistration token.
///
/// Case-sensitive alphanumerics, fixed length: enough entropy that the
/// token can serve as a capability in deregistration links.
#[must_use]
pub fn generate_deregistration_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DEREGISTRATION_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_has_fixed_length() {
        assert_eq!(
            generate_deregistration_token().len(),
            DEREGISTRATION_TOKEN_LEN
        );
    }

    #[test]
    fn test_token_is_alphanumeric() {
        let token = generate_deregistration_token();
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_differ() {
        assert_ne!(
            generate_deregistration_token(),
            generate_deregistration_token()
        );
    }
}
