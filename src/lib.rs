pub mod cli;
pub mod data;
pub mod engine;
pub mod export;
pub mod parsers;
pub mod pipeline;
pub mod server;
