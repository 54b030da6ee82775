pub mod api;
pub mod clipboard;
pub mod runtime;
pub mod stage;
pub mod storage;
pub mod workflow;
