mod claims;
pub mod extractors;

pub use claims::Claims;
pub use extractors::{AuthUser, JwtKeys};
