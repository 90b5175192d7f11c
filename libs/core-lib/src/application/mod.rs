pub mod client;
pub mod session_manager;
pub mod store;
pub mod sync;
pub mod verifier;
