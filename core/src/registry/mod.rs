mod aliases;
pub mod resolver;
pub mod types;

pub use resolver::Registry;
pub use types::{Decorator, FnDecorator, FnProvider, Provider};
