pub mod leaderboard;
pub mod note_parser;
pub mod notes;
pub mod summary;
