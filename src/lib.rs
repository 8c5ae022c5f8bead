pub mod api;
pub mod config;
pub mod dialog;
pub mod error;
pub mod geocode;
pub mod http_client;
pub mod model;
pub mod pagination;
pub mod preferences;
pub mod provider;
pub mod state;
