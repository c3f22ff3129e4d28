pub mod memory;
pub mod query;
pub mod run;
