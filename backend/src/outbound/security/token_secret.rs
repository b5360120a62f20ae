//! Loading the token signing secret.
//!
//! The secret is read from a file so it can be mounted from a secret store.
//! Debug builds, or deployments that opt in explicitly, fall back to a random
//! per-process secret; every token is then invalidated on restart.

use std::path::{Path, PathBuf};

use rand::RngCore;
use rand::rngs::OsRng;
use tracing::warn;
use zeroize::Zeroizing;

/// Minimum accepted secret length in bytes.
pub const TOKEN_SECRET_MIN_LEN: usize = 32;
const EPHEMERAL_SECRET_LEN: usize = 64;

/// Build mode for secret validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate missing or short secrets and emit warnings.
    Debug,
    /// Release builds require a readable secret of adequate length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sresta_backend::outbound::security::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Secret bytes used to sign tokens. Zeroed on drop.
pub struct TokenSecret(Zeroizing<Vec<u8>>);

impl TokenSecret {
    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Generate a random secret for this process only.
    pub fn ephemeral() -> Self {
        let mut bytes = vec![0_u8; EPHEMERAL_SECRET_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl std::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenSecret(..)")
    }
}

/// Errors raised while loading the token secret.
#[derive(thiserror::Error, Debug)]
pub enum TokenSecretError {
    /// No secret file was configured and ephemeral secrets are not allowed.
    #[error("no token secret file configured; set SRESTA_TOKEN_SECRET_FILE")]
    NotConfigured,
    /// Reading the secret file failed.
    #[error("failed to read token secret at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The secret file exists but is too short for release builds.
    #[error("token secret at {path} too short: need >= {min_len} bytes, got {length}")]
    TooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Load the token secret from `path`.
///
/// # Examples
///
/// ```rust
/// use sresta_backend::outbound::security::{BuildMode, load_token_secret};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let path = std::env::temp_dir().join("sresta_token_secret_example");
/// std::fs::write(&path, vec![b'k'; 48])?;
///
/// let secret = load_token_secret(Some(&path), BuildMode::Release, false)?;
/// assert_eq!(secret.as_bytes().len(), 48);
///
/// std::fs::remove_file(&path)?;
/// # Ok(())
/// # }
/// ```
pub fn load_token_secret(
    path: Option<&Path>,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<TokenSecret, TokenSecretError> {
    let fallback_allowed = mode.is_debug() || allow_ephemeral;
    let Some(path) = path else {
        if fallback_allowed {
            warn!("no token secret file configured; using temporary secret (dev only)");
            return Ok(TokenSecret::ephemeral());
        }
        return Err(TokenSecretError::NotConfigured);
    };

    match std::fs::read(path) {
        Ok(bytes) => {
            let secret = TokenSecret::from_bytes(bytes);
            let length = secret.as_bytes().len();
            if length < TOKEN_SECRET_MIN_LEN {
                if mode.is_debug() {
                    warn!(
                        path = %path.display(),
                        length,
                        "token secret shorter than recommended"
                    );
                } else {
                    return Err(TokenSecretError::TooShort {
                        path: path.to_path_buf(),
                        length,
                        min_len: TOKEN_SECRET_MIN_LEN,
                    });
                }
            }
            Ok(secret)
        }
        Err(error) => {
            if fallback_allowed {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary token secret (dev only)"
                );
                Ok(TokenSecret::ephemeral())
            } else {
                Err(TokenSecretError::Read {
                    path: path.to_path_buf(),
                    source: error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn secret_file(len: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(&vec![b's'; len]).expect("write secret");
        file
    }

    fn missing_path() -> PathBuf {
        let dir = tempfile::tempdir().expect("temp dir");
        dir.path().join("token_secret")
    }

    #[rstest]
    fn reads_secret_file() {
        let file = secret_file(40);
        let secret =
            load_token_secret(Some(file.path()), BuildMode::Release, false).expect("secret");
        assert_eq!(secret.as_bytes(), vec![b's'; 40].as_slice());
    }

    #[rstest]
    #[case(BuildMode::Release, false)]
    #[case(BuildMode::Debug, true)]
    fn short_secrets_fail_only_in_release(#[case] mode: BuildMode, #[case] accepted: bool) {
        let file = secret_file(8);
        let result = load_token_secret(Some(file.path()), mode, false);
        assert_eq!(result.is_ok(), accepted);
    }

    #[rstest]
    #[case(BuildMode::Debug, false, true)]
    #[case(BuildMode::Release, true, true)]
    #[case(BuildMode::Release, false, false)]
    fn missing_file_falls_back_when_allowed(
        #[case] mode: BuildMode,
        #[case] allow_ephemeral: bool,
        #[case] accepted: bool,
    ) {
        let path = missing_path();
        let result = load_token_secret(Some(&path), mode, allow_ephemeral);
        match result {
            Ok(secret) => {
                assert!(accepted);
                assert_eq!(secret.as_bytes().len(), EPHEMERAL_SECRET_LEN);
            }
            Err(error) => {
                assert!(!accepted);
                assert!(matches!(error, TokenSecretError::Read { .. }));
            }
        }
    }

    #[rstest]
    fn release_requires_a_configured_path() {
        let error = load_token_secret(None, BuildMode::Release, false).expect_err("no path");
        assert!(matches!(error, TokenSecretError::NotConfigured));
    }

    #[rstest]
    fn ephemeral_secrets_differ() {
        assert_ne!(
            TokenSecret::ephemeral().as_bytes(),
            TokenSecret::ephemeral().as_bytes()
        );
    }
}
