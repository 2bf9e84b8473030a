// HTTP surface: chat endpoint, structured match API and health checks

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::AppState;
