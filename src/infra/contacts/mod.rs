pub mod sqlite_contact_store;

pub use sqlite_contact_store::SqliteContactStore;
