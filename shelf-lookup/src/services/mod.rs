//! Catalog clients, ranking and resolution

pub mod cover_cache;
pub mod google_books_client;
pub mod open_library_client;
pub mod relevance;
pub mod resolver;
mod transport;

pub use cover_cache::{CoverCache, CoverError};
pub use google_books_client::GoogleBooksClient;
pub use open_library_client::OpenLibraryClient;
pub use resolver::{CandidateAccumulator, Resolver};
pub use transport::build_http_client;
