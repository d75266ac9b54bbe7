pub mod api_client;
pub mod http_client;
pub mod poll;
pub mod provider;
pub mod state;
