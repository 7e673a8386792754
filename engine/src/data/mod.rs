pub mod csv_parser;
pub mod market_data;
pub mod workspace_file;

pub use csv_parser::CandleCsvParser;
pub use market_data::MarketDataStore;
pub use workspace_file::{InMemoryPersistence, JsonFilePersistence, WorkspacePersistence, WorkspaceSnapshot};
