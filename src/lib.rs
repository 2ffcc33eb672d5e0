pub mod catalog;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod rate;
pub mod scoring;
pub mod sharding;
