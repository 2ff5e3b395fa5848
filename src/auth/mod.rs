//! Authentication and session management

pub mod cookie;
pub mod duration;
pub mod jwt;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod session;

pub use cookie::CookiePolicy;
pub use duration::parse_duration;
pub use jwt::{AccessClaims, IssuedToken, RefreshClaims, TokenCodec, TokenError, TokenPolicy};
pub use ledger::RefreshLedger;
pub use middleware::{authenticate, require_auth, require_role, AuthUser, RoleGuard};
pub use models::{Identity, IdentityClaims, Role, Subteam, Team};
pub use session::{IssuedSession, SessionIssuer};
