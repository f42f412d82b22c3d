mod sqlite;
mod tables;

pub use sqlite::Database;
pub use tables::documents::server_timestamp;
