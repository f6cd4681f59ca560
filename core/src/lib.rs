//! # VESSEL CORE LIBRARY
//!
//! **KEYED DEPENDENCY-INJECTION REGISTRY**
//!
//! **ARCHITECTURE**: One owned `Registry` holding services, providers,
//! decorators, aliases and sharing flags
//! **GUARANTEE**: Shared entries are built once and returned by identity
//!
//! ## RESOLUTION PIPELINE
//!
//! 1. **STORED INSTANCE** - Returned as-is when the requested key holds one
//! 2. **ALIAS RESOLUTION** - Requested key mapped to its terminal key
//! 3. **PROVIDER** - Builds the instance, pulling dependencies from the registry
//! 4. **DECORATORS** - Wrap the provider, last registered outermost
//! 5. **SHARING** - Result cached per key according to its shared flag
//!
//! ## USAGE
//!
//! ```rust
//! use vessel::api::*;
//!
//! let mut registry = Registry::new();
//! registry.service("Prefix", String::from("Furniture")).unwrap();
//! registry
//!     .provider_fn("Chair", |registry| {
//!         let prefix = registry.get_as::<String>("Prefix")?;
//!         Ok(instance(format!("{prefix}/chair")))
//!     })
//!     .unwrap();
//! registry.alias("Seat", "Chair").unwrap();
//!
//! let chair = registry.get("Chair").unwrap();
//! let seat = registry.get("Seat").unwrap();
//! assert!(same_instance(&chair, &seat));
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod registry;
pub mod types;
