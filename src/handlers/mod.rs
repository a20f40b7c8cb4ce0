// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (bearer JWT required, /api/projects and /api/auth)
pub mod public;
pub mod protected;
