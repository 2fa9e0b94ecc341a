use actix_session::Session;
use actix_web::HttpResponse;
use rand::Rng;

const SESSION_KEY: &str = "csrf_token";

/// Current form token for this session, minted on first use.
pub fn get_or_create_token(session: &Session) -> String {
    if let Ok(Some(token)) = session.get::<String>(SESSION_KEY) {
        return token;
    }
    rotate_token(session)
}

/// Replace the session token. Called after login so a pre-login token cannot be replayed.
pub fn rotate_token(session: &Session) -> String {
    let token = generate_token();
    if let Err(e) = session.insert(SESSION_KEY, &token) {
        log::warn!("Could not store CSRF token in session: {e}");
    }
    token
}

/// Compare a submitted form token with the session token; 403 on mismatch.
pub fn validate_csrf(session: &Session, submitted: &str) -> Result<(), HttpResponse> {
    let stored = session
        .get::<String>(SESSION_KEY)
        .unwrap_or(None)
        .unwrap_or_default();
    if !tokens_match(&stored, submitted) {
        return Err(HttpResponse::Forbidden().body("Form security check failed. Reload the page and try again."));
    }
    Ok(())
}

fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

fn tokens_match(stored: &str, submitted: &str) -> bool {
    if stored.is_empty() || stored.len() != submitted.len() {
        return false;
    }
    stored
        .bytes()
        .zip(submitted.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_64_hex_chars() {
        let t = generate_token();
        assert_eq!(t.len(), 64);
        assert!(t.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(t, generate_token());
    }

    #[test]
    fn empty_session_token_never_matches() {
        assert!(!tokens_match("", ""));
    }

    #[test]
    fn match_requires_identical_tokens() {
        assert!(tokens_match("abc123", "abc123"));
        assert!(!tokens_match("abc123", "abc124"));
        assert!(!tokens_match("abc123", "abc1234"));
    }
}
