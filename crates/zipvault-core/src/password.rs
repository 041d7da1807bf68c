//! Scoped archive password.

use zeroize::Zeroizing;

/// Secret used to encrypt or decrypt archive entries.
///
/// The bytes live in a [`Zeroizing`] buffer and are wiped when the value is
/// dropped. `Debug` never prints the secret.
///
/// # Examples
///
/// ```
/// use zipvault_core::ArchivePassword;
///
/// let password = ArchivePassword::new("secret");
/// assert_eq!(password.expose(), "secret");
/// assert_eq!(format!("{password:?}"), "ArchivePassword(***)");
/// ```
#[derive(Clone)]
pub struct ArchivePassword(Zeroizing<String>);

impl ArchivePassword {
    /// Wraps a secret string.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Returns the secret for handing to the codec.
    ///
    /// Keep the borrow short; do not copy the returned value into long-lived
    /// state.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the secret as bytes for decryption.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns `true` if the secret is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for ArchivePassword {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

impl From<&str> for ArchivePassword {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl std::fmt::Debug for ArchivePassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ArchivePassword(***)")
    }
}
