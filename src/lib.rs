//! Book Catalog Application Library
//!
//! Six catalog resources (countries, categories, authors, reviewers, books,
//! reviews) implemented as kernel modules, plus the [`app::Application`]
//! bootstrap shared by the binaries.

pub mod app;
pub mod modules;
pub mod utils;

pub use app::Application;
