pub mod article;
pub mod game_result;
pub mod password_reset_token;
pub mod quiz;
pub mod refresh_token;
pub mod user;

pub use article::Article;
pub use game_result::GameResult;
pub use password_reset_token::PasswordResetToken;
pub use quiz::Quiz;
pub use refresh_token::RefreshToken;
pub use user::User;
