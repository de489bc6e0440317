use bookapi_db::SqlitePool;

use super::{
    authors::repository::AuthorRepository, books::repository::BookRepository,
    categories::repository::CategoryRepository, countries::repository::CountryRepository,
    reviewers::repository::ReviewerRepository, reviews::repository::ReviewRepository,
};

/// Every repository over one shared pool; the router state of each module.
///
/// Handlers reach across resources (a book's authors, a reviewer's reviews),
/// so each module holds the whole catalog rather than only its own table.
#[derive(Clone)]
pub struct Catalog {
    pub countries: CountryRepository,
    pub categories: CategoryRepository,
    pub authors: AuthorRepository,
    pub reviewers: ReviewerRepository,
    pub books: BookRepository,
    pub reviews: ReviewRepository,
    pool: SqlitePool,
}

impl Catalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            countries: CountryRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            authors: AuthorRepository::new(pool.clone()),
            reviewers: ReviewerRepository::new(pool.clone()),
            books: BookRepository::new(pool.clone()),
            reviews: ReviewRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
