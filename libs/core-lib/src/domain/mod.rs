pub mod credentials;
pub mod reconcile;
pub mod records;
pub mod role;
pub mod scope;
pub mod session;
pub mod tenant;
