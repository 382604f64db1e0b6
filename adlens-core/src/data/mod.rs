//! Source reading, schema normalization and fact table construction.

pub mod error;
pub mod fact_table;
pub mod normalize;
pub mod reader;
pub mod schema;

pub use error::DataError;
pub use fact_table::{parse_date, FactTable, FactTableBuilder};
pub use normalize::{adapter_for, normalize_table, ImputationPolicy, PlatformAdapter};
pub use reader::{read_source, ColumnIndex, RawTable, SourceBytes};
pub use schema::{SchemaError, SourceSchema};
