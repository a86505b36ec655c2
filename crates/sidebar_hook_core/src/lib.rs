pub mod codec;
pub mod config;
pub mod document;
pub mod hooks;
pub mod sidebar;
