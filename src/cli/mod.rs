pub mod log;
pub mod refresh;
pub mod status;
pub mod visibility;
