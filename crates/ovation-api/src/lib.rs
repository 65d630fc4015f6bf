pub mod analytics;
pub mod auth;
pub mod codes;
pub mod error;
pub mod events;
pub mod export;
pub mod forms;
pub mod moderation;
pub mod password;
pub mod qr;
pub mod reviews;
pub mod routes;
pub mod session;
pub mod stats;

pub use auth::{AppState, AppStateInner};
pub use routes::router;
