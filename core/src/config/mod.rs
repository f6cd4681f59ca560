//! # REGISTRY CONFIGURATION
//!
//! **BATCH**: In-memory `RegistryConfig` carrying code (providers, decorators)
//! and data (services, aliases, sharing flags).
//! **DECLARATIVE**: JSON documents lowered into a `RegistryConfig`.

pub mod batch;
pub mod declarative;

pub use batch::RegistryConfig;
pub use declarative::DeclarativeConfig;
