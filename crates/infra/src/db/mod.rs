//! In-memory database: a shared named store plus per-request sessions.

pub mod context;
pub mod database;
pub mod table;

pub use context::{Change, MyContext};
pub use database::{InMemoryDatabase, Tables};
pub use table::Table;
