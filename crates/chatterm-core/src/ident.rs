//! Correlation ID generation.

use crate::env::Environment;

/// Length of a correlation ID.
pub const ID_LEN: usize = 5;

const ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Largest multiple of the alphabet size that fits in a byte. Bytes at or
/// above it are rejected so every letter is equally likely.
const REJECT_AT: u8 = 208;

/// Fresh unpredictable correlation ID: [`ID_LEN`] ASCII letters.
pub fn correlation_id<E: Environment>(env: &E) -> String {
    let mut id = String::with_capacity(ID_LEN);
    let mut buf = [0u8; 16];
    while id.len() < ID_LEN {
        env.random_bytes(&mut buf);
        for &b in buf.iter().filter(|&&b| b < REJECT_AT) {
            if id.len() == ID_LEN {
                break;
            }
            id.push(char::from(ALPHABET[usize::from(b) % ALPHABET.len()]));
        }
    }
    id
}
