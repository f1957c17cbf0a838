pub mod records_schema;
pub mod records_shared;
