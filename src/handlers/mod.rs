pub mod catalog;
pub mod common;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
