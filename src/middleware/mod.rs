/// Middleware module
///
/// Request authentication and static-file hit counting.

mod hit_counter;
mod require_auth;

pub use hit_counter::HitCounter;
pub use require_auth::AuthenticatedUser;
