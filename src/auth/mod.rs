// Auth core: token issuing/verification, ceremony state, throttling,
// credential resolution, and the storage-facing gateway.

mod ceremony;
mod gateway;
mod password;
mod rate_limit;
mod resolver;
mod token;

pub use ceremony::{CeremonyKey, CeremonyState, CeremonyStore};
pub use gateway::{parse_transports, IdentityGateway};
pub use password::{hash as hash_password, verify as verify_password};
pub use rate_limit::RateLimiter;
pub use resolver::{clear_session_cookie, session_cookie, AuthResolver, COOKIE_NAME};
pub use token::{TokenError, TokenService};
