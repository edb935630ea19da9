pub mod app;
pub mod cli;
pub mod config;
pub mod engine;
pub mod facets;
pub mod loader;
pub mod model;
pub mod output;
pub mod pagination;
pub mod session;
pub mod utils;

#[cfg(test)]
mod tests;
