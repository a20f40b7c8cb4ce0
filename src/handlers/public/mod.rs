// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service banner and liveness check. Nothing here touches project data.

mod system;

pub use system::{health, root};
