//! Bearer-token authentication

pub mod middleware;
pub mod token;

pub use middleware::jwt_auth_middleware;
pub use token::{AuthUser, Claims, TokenError, TokenService};
