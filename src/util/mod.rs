// Utility modules

pub mod encode;
