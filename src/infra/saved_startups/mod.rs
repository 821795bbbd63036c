pub mod sqlite_saved_store;

pub use sqlite_saved_store::SqliteSavedStartupStore;
