//! The `ItCrypto` client: one logged-in identity plus a resolver.

use it_crypto_core::{AccessLog, SignedLog};

use crate::error::{ItCryptoError, Result};
use crate::identity::{AuthenticatedUser, RemoteUser};
use crate::resolver::UserResolver;

/// Configuration for the client.
#[derive(Debug, Clone, Default)]
pub struct ItCryptoConfig {
    /// PEM of the CA that remote identities must be signed by.
    pub trust_anchor: Option<String>,
}

impl ItCryptoConfig {
    /// Set the CA certificate (PEM) used by
    /// [`ItCrypto::import_remote_user`].
    pub fn with_trust_anchor(mut self, pem: impl Into<String>) -> Self {
        self.trust_anchor = Some(pem.into());
        self
    }
}

/// Convenience wrapper around the signing, sharing and decryption
/// operations of a single logged-in user.
///
/// Every operation checks its preconditions first and reports a missing
/// login or resolver as an authorization error.
pub struct ItCrypto {
    config: ItCryptoConfig,
    user: Option<AuthenticatedUser>,
    resolver: Option<Box<dyn UserResolver + Send + Sync>>,
}

impl ItCrypto {
    /// Create a client with nobody logged in and no resolver.
    pub fn new(config: ItCryptoConfig) -> Self {
        Self {
            config,
            user: None,
            resolver: None,
        }
    }

    pub fn config(&self) -> &ItCryptoConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────

    /// Log in from PEM certificates and PKCS#8 private keys.
    ///
    /// On failure the previous login, if any, is kept.
    pub fn login(
        &mut self,
        id: &str,
        encryption_certificate: &str,
        verification_certificate: &str,
        decryption_key: &str,
        signing_key: &str,
    ) -> Result<()> {
        let user = AuthenticatedUser::import(
            id,
            encryption_certificate,
            verification_certificate,
            decryption_key,
            signing_key,
        )?;
        self.login_user(user);
        Ok(())
    }

    /// Log in with an existing identity.
    pub fn login_user(&mut self, user: AuthenticatedUser) {
        tracing::debug!(user = user.id(), "logged in");
        self.user = Some(user);
    }

    /// Forget the logged-in identity.
    pub fn logout(&mut self) {
        self.user = None;
    }

    /// The logged-in identity, if any.
    pub fn current_user(&self) -> Option<&AuthenticatedUser> {
        self.user.as_ref()
    }

    /// Set the resolver used to look up creators and monitors on decryption.
    pub fn set_resolver(&mut self, resolver: impl UserResolver + Send + Sync + 'static) {
        self.resolver = Some(Box::new(resolver));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Sign `log` as the logged-in user.
    pub fn sign_log(&self, log: &AccessLog) -> Result<SignedLog> {
        self.require_user("Before you can sign data you need to login a user")?
            .sign_log(log)
    }

    /// Share `log` with `receivers` as the logged-in user.
    pub fn encrypt_log(&self, log: &SignedLog, receivers: &[RemoteUser]) -> Result<String> {
        self.require_user("Before you can encrypt you need to login a user")?
            .encrypt_log(log, receivers)
    }

    /// Decrypt and verify `jwe` as the logged-in user.
    pub fn decrypt_log(&self, jwe: &str) -> Result<SignedLog> {
        let user = self.require_user("Before you can decrypt you need to login a user")?;
        let resolver = self.resolver.as_deref().ok_or_else(|| {
            ItCryptoError::authorization("Before you can decrypt you need to provide a resolver")
        })?;
        user.decrypt_log(jwe, resolver)
    }

    /// Import a remote identity, checking its certificates against the
    /// configured trust anchor.
    pub fn import_remote_user(
        &self,
        id: &str,
        encryption_certificate: &str,
        verification_certificate: &str,
        is_monitor: bool,
    ) -> Result<RemoteUser> {
        let anchor = self.config.trust_anchor.as_deref().ok_or_else(|| {
            ItCryptoError::authorization(
                "Before you can import users you need to configure a trust anchor",
            )
        })?;
        RemoteUser::import(
            id,
            encryption_certificate,
            verification_certificate,
            is_monitor,
            anchor,
        )
    }

    fn require_user(&self, message: &str) -> Result<&AuthenticatedUser> {
        self.user
            .as_ref()
            .ok_or_else(|| ItCryptoError::authorization(message))
    }
}

impl Default for ItCrypto {
    fn default() -> Self {
        Self::new(ItCryptoConfig::default())
    }
}
