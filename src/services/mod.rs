// keydeck services
// Services provide the core functionality: checksums, simulated encryption, credential persistence,
// feature flags, preferences, usage stats and settings.

pub mod checksum;
pub mod credential_store;
pub mod encryption_service;
pub mod feature_flags;
pub mod latency;
pub mod preferences;
pub mod settings_engine;
pub mod usage_stats;
