//! Kernel of the book catalog: layered settings, the [`Module`] contract every
//! resource implements, and the [`ModuleRegistry`] driving their lifecycle.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
