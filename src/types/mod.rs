// keydeck shared type definitions
// Each submodule defines types used across the application.

pub mod credential;
pub mod errors;
pub mod session;
pub mod settings;
pub mod stats;
