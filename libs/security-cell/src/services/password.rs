// =====================================================================================
// PASSWORD SECURITY SERVICE - CREDENTIAL HASHING
// =====================================================================================

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use tracing::instrument;

use crate::models::{PasswordStrength, PasswordStrengthResult};

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub struct PasswordSecurityService;

impl PasswordSecurityService {
    #[instrument(skip(password))]
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    #[instrument(skip(password, hash))]
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(hash)?;
        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(password))]
    pub fn validate_password_strength(password: &str) -> PasswordStrengthResult {
        let mut score = 0u8;
        let mut issues = Vec::new();
        let length = password.chars().count();

        if length >= 12 {
            score += 30;
        } else if length >= MIN_PASSWORD_LENGTH {
            score += 20;
            issues.push("Password should be at least 12 characters long".to_string());
        } else {
            issues.push(format!("Password must be at least {} characters long", MIN_PASSWORD_LENGTH));
        }

        if password.chars().any(|c| c.is_lowercase()) {
            score += 15;
        } else {
            issues.push("Password should contain lowercase letters".to_string());
        }

        if password.chars().any(|c| c.is_uppercase()) {
            score += 15;
        } else {
            issues.push("Password should contain uppercase letters".to_string());
        }

        if password.chars().any(|c| c.is_numeric()) {
            score += 15;
        } else {
            issues.push("Password should contain numbers".to_string());
        }

        if password.chars().any(|c| !c.is_alphanumeric()) {
            score += 15;
        } else {
            issues.push("Password should contain special characters".to_string());
        }

        if Self::has_sequential_chars(password) {
            score = score.saturating_sub(20);
            issues.push("Avoid sequential characters (abc, 123)".to_string());
        }

        if Self::has_repeated_chars(password) {
            score = score.saturating_sub(15);
            issues.push("Avoid repeated characters (aaa, 111)".to_string());
        }

        let common_passwords = [
            "password", "123456", "qwerty", "letmein", "welcome", "admin", "111111",
        ];
        let lowered = password.to_lowercase();
        if common_passwords.iter().any(|common| lowered.contains(common)) {
            score = score.saturating_sub(50);
            issues.push("Password contains common patterns".to_string());
        }

        let strength = if length < MIN_PASSWORD_LENGTH {
            PasswordStrength::Weak
        } else {
            match score {
                0..=25 => PasswordStrength::Weak,
                26..=50 => PasswordStrength::Fair,
                51..=75 => PasswordStrength::Good,
                _ => PasswordStrength::Strong,
            }
        };

        PasswordStrengthResult {
            strength,
            score,
            issues,
        }
    }

    fn has_sequential_chars(password: &str) -> bool {
        let chars: Vec<u32> = password.chars().map(|c| c as u32).collect();

        chars.windows(3).any(|window| {
            let ascending = window[1] == window[0] + 1 && window[2] == window[1] + 1;
            let descending = window[0] == window[1] + 1 && window[1] == window[2] + 1;
            ascending || descending
        })
    }

    fn has_repeated_chars(password: &str) -> bool {
        let chars: Vec<char> = password.chars().collect();
        chars.windows(3).any(|window| window[0] == window[1] && window[1] == window[2])
    }
}
