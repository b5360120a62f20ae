//! Credential adapters: password hashing and signed access tokens.

mod argon2_hasher;
mod jwt_codec;
mod token_secret;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt_codec::JwtTokenCodec;
pub use token_secret::{
    BuildMode, TOKEN_SECRET_MIN_LEN, TokenSecret, TokenSecretError, load_token_secret,
};
