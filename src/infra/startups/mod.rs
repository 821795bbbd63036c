pub mod sqlite_startup_store;

pub use sqlite_startup_store::SqliteStartupStore;
