use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Hash a password using Argon2id (19MB memory, 2 iterations, parallelism 1).
pub fn hash(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(19 * 1024, 2, 1, None).map_err(|e| format!("Invalid params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| format!("Hashing failed: {e}"))
}

/// Verify a password against a hash.
pub fn verify(password: &str, hash: &str) -> Result<bool, String> {
    let parsed = PasswordHash::new(hash).map_err(|e| format!("Invalid hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Check password strength. Each rule gets its own user-facing message so the
/// caller can surface exactly what is missing. Checked in a fixed order:
/// length, uppercase, lowercase, digit.
pub fn validate_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < 12 {
        return Err("Password must be at least 12 characters".to_string());
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err("Password must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain a digit".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let h = hash("Correct-Horse-7").unwrap();
        assert!(verify("Correct-Horse-7", &h).unwrap());
        assert!(!verify("wrong-password-7", &h).unwrap());
    }

    #[test]
    fn strength_rules_reported_in_order() {
        assert_eq!(
            validate_strength("Short1a").unwrap_err(),
            "Password must be at least 12 characters"
        );
        assert_eq!(
            validate_strength("lowercase-only-1").unwrap_err(),
            "Password must contain an uppercase letter"
        );
        assert_eq!(
            validate_strength("UPPERCASE-ONLY-1").unwrap_err(),
            "Password must contain a lowercase letter"
        );
        assert_eq!(
            validate_strength("No-Digits-Here!").unwrap_err(),
            "Password must contain a digit"
        );
        assert!(validate_strength("Acceptable-Pass1").is_ok());
    }
}
