pub mod aggregate;
pub mod company;
pub mod context;
pub mod filter;
pub mod handlers;
pub mod matcher;
pub mod models;
pub mod pipeline;
