pub mod credits;
pub mod intent;
pub mod message;
