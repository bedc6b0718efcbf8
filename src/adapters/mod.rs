pub mod identity;
pub mod text_generation;
