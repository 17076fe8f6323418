pub mod api;
pub mod audit;
pub mod config;
pub mod domain;
pub mod entities;
pub mod error;
pub mod middleware;
pub mod service;
pub mod storage;
pub mod store;

pub use api::create_api_router;
pub use config::Config;
pub use service::AppState;
