pub use crate::config::{DeclarativeConfig, RegistryConfig};
pub use crate::errors::{error_codes, RegistryError, RegistryResult};
pub use crate::registry::{Decorator, FnDecorator, FnProvider, Provider, Registry};
pub use crate::types::{downcast_instance, instance, same_instance, Instance};
