// handlers/protected/mod.rs - Handlers behind the bearer auth middleware
//
// Every handler here receives the caller's `AuthUser` extension and scopes
// its data access to that user.

pub mod entries;

pub use entries::create as entries_post;
pub use entries::list as entries_get;
