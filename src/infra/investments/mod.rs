pub mod sqlite_investment_store;

pub use sqlite_investment_store::SqliteInvestmentStore;
