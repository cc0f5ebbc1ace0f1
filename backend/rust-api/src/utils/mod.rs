pub mod ids;
pub mod retry;
