pub mod export;
pub mod quotes;
pub mod storage;

pub use export::ZipExportSink;
pub use quotes::YahooQuoteSource;
pub use storage::LocalStorage;
