pub mod bcb;
pub mod process;
