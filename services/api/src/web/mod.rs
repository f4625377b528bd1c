pub mod admin;
pub mod channels;
pub mod courses;
pub mod middleware;
pub mod payments;
pub mod rest;
pub mod router;
pub mod state;
pub mod uploads;
pub mod users;

// Re-export what the binaries need to build the server.
pub use rest::ApiDoc;
pub use router::router;
pub use state::AppState;
