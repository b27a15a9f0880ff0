pub mod model;
pub mod repo;
pub mod seed;
pub mod sqlite;

pub use model::*;
pub use repo::*;
pub use sqlite::SqliteRepository;
