pub mod catalog;
pub mod generation;
pub mod quiz_store;
pub mod ranking;
pub mod scratch;
pub mod session;
