use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use secrecy::SecretString;

/// Source of the bearer token attached to every request.
///
/// Decouples the transport from whichever identity provider issued the
/// session. Returning `None` means "not signed in"; the client then fails
/// the request before anything goes on the wire.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Option<SecretString>;
}

/// A fixed token, typically resolved from config, env, or the keyring.
#[derive(Debug, Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }
}

impl From<String> for StaticToken {
    fn from(token: String) -> Self {
        Self(SecretString::from(token))
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Option<SecretString> {
        Some(self.0.clone())
    }
}

/// A token that can be swapped while requests are in flight.
///
/// Models an identity-provider session: `set` after sign-in or refresh,
/// `clear` on sign-out. Readers never block.
#[derive(Debug, Default)]
pub struct SessionToken {
    current: ArcSwapOption<SecretString>,
}

impl SessionToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(token: SecretString) -> Self {
        let session = Self::new();
        session.set(token);
        session
    }

    pub fn set(&self, token: SecretString) {
        self.current.store(Some(Arc::new(token)));
    }

    pub fn clear(&self) {
        self.current.store(None);
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.load().is_some()
    }
}

#[async_trait]
impl TokenProvider for SessionToken {
    async fn token(&self) -> Option<SecretString> {
        self.current.load_full().map(|t| (*t).clone())
    }
}

/// Anonymous access. Every request fails with `Error::NotAuthenticated`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

#[async_trait]
impl TokenProvider for NoToken {
    async fn token(&self) -> Option<SecretString> {
        None
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn session_token_follows_sign_in_and_out() {
        let session = SessionToken::new();
        assert!(!session.is_signed_in());
        assert!(tokio_test::block_on(session.token()).is_none());

        session.set(SecretString::from("abc".to_owned()));
        let token = tokio_test::block_on(session.token());
        assert_eq!(token.as_ref().map(|t| t.expose_secret()), Some("abc"));

        session.clear();
        assert!(tokio_test::block_on(session.token()).is_none());
    }

    #[test]
    fn static_and_anonymous_providers() {
        let fixed = StaticToken::from("tok".to_owned());
        let token = tokio_test::block_on(fixed.token());
        assert_eq!(token.as_ref().map(|t| t.expose_secret()), Some("tok"));
        assert!(tokio_test::block_on(NoToken.token()).is_none());
    }
}
