pub mod mobile;
pub mod net;
