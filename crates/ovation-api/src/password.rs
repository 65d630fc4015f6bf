use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| anyhow!("Corrupt password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub struct StrengthReport {
    pub ok: bool,
    pub message: &'static str,
}

/// Character-class strength score backing the signup strength meter:
/// at least 6 characters, and at least two of upper/lower/digit.
pub fn password_strength(password: &str) -> StrengthReport {
    if password.chars().count() < 6 {
        return StrengthReport {
            ok: false,
            message: "Password must be at least 6 characters long",
        };
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let classes = [has_upper, has_lower, has_digit]
        .into_iter()
        .filter(|b| *b)
        .count();

    if classes < 2 {
        StrengthReport {
            ok: false,
            message: "Password should contain uppercase, lowercase, and numbers",
        }
    } else {
        StrengthReport {
            ok: true,
            message: "Password is strong",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn short_passwords_are_weak() {
        let report = password_strength("abc1");
        assert!(!report.ok);
        assert!(report.message.contains("6 characters"));
    }

    #[test]
    fn single_class_passwords_are_weak() {
        assert!(!password_strength("abcdefgh").ok);
        assert!(!password_strength("12345678").ok);
    }

    #[test]
    fn two_classes_pass() {
        assert!(password_strength("secret1").ok);
        assert!(password_strength("Secrets").ok);
        assert!(password_strength("PASS123").ok);
    }
}
