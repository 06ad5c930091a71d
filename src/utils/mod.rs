pub mod cover;
pub mod format;
pub mod input;
