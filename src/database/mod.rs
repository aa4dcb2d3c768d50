pub mod manager;
pub mod migrate;
pub mod models;
