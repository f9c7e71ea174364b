pub mod activity;
pub mod alchemy;
pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod pipeline_stats;
