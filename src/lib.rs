pub mod api;
pub mod config;
pub mod data_models;
pub mod error;
pub mod extract;
pub mod llm;
pub mod page_fetcher;
pub mod pipeline;
pub mod route;
pub mod summarize;
pub mod web_search;
