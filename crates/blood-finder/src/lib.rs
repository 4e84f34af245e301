pub mod catalog;
pub mod config;
pub mod criteria;
pub mod error;
pub mod feedback;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod search;
pub mod server;
pub mod voice;
