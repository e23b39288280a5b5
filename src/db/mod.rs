pub mod articles;
pub mod audit;
pub mod game_results;
pub mod password_reset_tokens;
pub mod quizzes;
pub mod refresh_tokens;
pub mod users;
