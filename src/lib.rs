pub mod config;
pub mod db;
pub mod fetch_error;
pub mod fetcher;
pub mod importers;
pub mod period;
pub mod report;
pub mod services;
pub mod utils;
