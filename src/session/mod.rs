pub mod input;
pub mod mode;
pub mod result;
pub mod timer;
