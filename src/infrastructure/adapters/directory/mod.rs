pub mod postgrest_location_directory;
pub mod sqlite_location_directory;

// Re-export main adapters for convenience
pub use postgrest_location_directory::{PostgrestConfig, PostgrestLocationDirectory};
pub use sqlite_location_directory::SqliteLocationDirectory;
