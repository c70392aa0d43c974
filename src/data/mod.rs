pub mod curves;
pub mod fit;
pub mod ingest;
pub mod table;
pub mod view;
pub mod x_formatter;
