pub mod db;
pub mod fetch;
pub mod ingest;
pub mod process;
pub mod queries;
