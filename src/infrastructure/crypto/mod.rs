pub mod jwt;
pub mod password;

pub use jwt::{DecodedToken, JwtConfig, TokenCodec, TokenError};
