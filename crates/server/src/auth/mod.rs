mod jwt;

pub use jwt::{create_token, validate_token, Claims, TokenError, ADMIN_ROLE};
