//! Random password generation for new and updated records.

use rand::rngs::OsRng;
use rand::Rng;
use zeroize::Zeroizing;

use crate::errors::{LockerError, Result};

/// Default generated password length.
pub const DEFAULT_LENGTH: usize = 16;

/// Accepted range for generated password lengths.
pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 128;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
abcdefghijklmnopqrstuvwxyz\
0123456789\
!@#$%^&*()_+~`|}{[]:;?><,./-=";

/// Generate a random password of `length` characters from the OS RNG.
pub fn generate_password(length: usize) -> Result<Zeroizing<String>> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(LockerError::Validation(format!(
            "password length must be between {MIN_LENGTH} and {MAX_LENGTH}"
        )));
    }

    let mut rng = OsRng;
    let password: String = (0..length)
        .map(|_| char::from(CHARSET[rng.gen_range(0..CHARSET.len())]))
        .collect();

    Ok(Zeroizing::new(password))
}
