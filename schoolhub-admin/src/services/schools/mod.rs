pub mod schools_hooks;
pub mod schools_schema;
pub mod schools_shared;
