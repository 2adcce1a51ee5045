//! Session tokens, the request gate, and super admin seeding.

pub mod seed;
pub mod session;
pub mod token;

pub use seed::seed_super_admin;
pub use session::{authenticate_token, bearer_token, require_admin, require_super_admin};
pub use token::{TokenError, TokenKeys};
