//! Authentication and authorization for HumanTic

pub mod capability;
pub mod jwt;
pub mod middleware;

pub use capability::{authorize, has_capability, Capability};
pub use jwt::{Claims, JwtManager};
pub use middleware::{require_auth, AuthState, AuthUser};
