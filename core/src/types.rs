//! # VESSEL TYPE DEFINITIONS
//!
//! **CRITICAL**: Core value representation shared by every registry store.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::errors::{RegistryError, RegistryResult};

/// **REGISTRY INSTANCE**
///
/// **PURPOSE**: Type-erased value held by the registry.
/// **GUARANTEE**: Cloning preserves identity, so `Arc::ptr_eq` distinguishes
/// a cached instance from a freshly built one.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Lifts a concrete value into an [`Instance`].
pub fn instance<T>(value: T) -> Instance
where
    T: Any + Send + Sync,
{
    Arc::new(value)
}

/// **TYPED VIEW OF AN INSTANCE**
///
/// **RETURNS**: The same allocation as `Arc<T>`, or `TypeMismatch` naming `key`.
pub fn downcast_instance<T>(key: &str, value: Instance) -> RegistryResult<Arc<T>>
where
    T: Any + Send + Sync,
{
    value
        .downcast::<T>()
        .map_err(|_| RegistryError::TypeMismatch {
            key: key.to_string(),
            expected: type_name::<T>(),
        })
}

/// Identity comparison between two instances.
pub fn same_instance(a: &Instance, b: &Instance) -> bool {
    Arc::ptr_eq(a, b)
}
