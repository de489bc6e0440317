pub mod authors;
pub mod books;
pub mod catalog;
pub mod categories;
pub mod common;
pub mod countries;
pub mod openapi;
pub mod reviewers;
pub mod reviews;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

use bookapi_kernel::ModuleRegistry;

pub use catalog::Catalog;

/// Register every catalog module.
///
/// Order matters: migrations run in registration order, so tables referenced
/// by foreign keys are registered first.
pub fn register_all(registry: &mut ModuleRegistry, catalog: &Catalog) {
    registry.register(countries::create_module(catalog.clone()));
    registry.register(categories::create_module(catalog.clone()));
    registry.register(authors::create_module(catalog.clone()));
    registry.register(reviewers::create_module(catalog.clone()));
    registry.register(books::create_module(catalog.clone()));
    registry.register(reviews::create_module(catalog.clone()));
}
