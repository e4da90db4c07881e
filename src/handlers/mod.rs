// handlers/mod.rs - Route handlers by security tier
//
// Public (no auth) -> Protected (bearer auth, resolved through the auth provider)

pub mod public;
pub mod protected;
