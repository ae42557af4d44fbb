pub mod analysis;
pub mod auth;
pub mod observability;
pub mod persistence;
pub mod storage;
