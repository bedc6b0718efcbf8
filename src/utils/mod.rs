pub mod extract;
pub mod meta;
pub mod time;
