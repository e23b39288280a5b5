pub fn render_welcome(display_name: &str, base_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Welcome to QuizArena</h2>
    <p>Hi {display_name},</p>
    <p>Your account has been created. Jump into the arena:</p>
    <p><a href="{base_url}" style="display: inline-block; padding: 10px 20px; background: #7c3aed; color: white; text-decoration: none; border-radius: 4px;">Play Now</a></p>
    <p style="color: #666; font-size: 14px;">If you didn't expect this email, you can ignore it.</p>
</body>
</html>"#
    )
}

pub fn render_password_reset(reset_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Password Reset</h2>
    <p>A password reset was requested for your QuizArena account.</p>
    <p><a href="{reset_url}" style="display: inline-block; padding: 10px 20px; background: #7c3aed; color: white; text-decoration: none; border-radius: 4px;">Reset Password</a></p>
    <p style="color: #666; font-size: 14px;">This link expires in 30 minutes. If you didn't request this, you can ignore it.</p>
</body>
</html>"#
    )
}
