//! Credential generation and verification for event hosts.

use rand::Rng;

use crate::types::Event;

pub const ACCESS_CODE_LEN: usize = 5;
pub const ADMIN_KEY_LEN: usize = 20;
pub const ADMIN_PIN_LEN: usize = 6;

/// Digits used for access codes and admin PINs.
const DIGIT_CHARS: &[u8] = b"0123456789";

/// Alphabet for admin keys. Ambiguous characters (I, O, l, 0, 1) are
/// left out so a key survives being read aloud or written down.
const KEY_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

/// Generate a candidate access code. Uniqueness is the store's
/// concern; callers retry on collision.
pub fn generate_access_code() -> String {
    random_string(DIGIT_CHARS, ACCESS_CODE_LEN)
}

pub fn generate_admin_key() -> String {
    random_string(KEY_CHARS, ADMIN_KEY_LEN)
}

pub fn generate_admin_pin() -> String {
    random_string(DIGIT_CHARS, ADMIN_PIN_LEN)
}

fn random_string(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

/// Check host credentials against an event. Both factors are
/// compared unconditionally in constant time, so the timing of a
/// rejection does not reveal which factor failed.
///
/// An event stored without a PIN only requires the key.
pub fn verify_credentials(event: &Event, admin_key: &str, admin_pin: &str) -> bool {
    if admin_key.is_empty() {
        return false;
    }
    let key_ok = constant_time_eq(event.admin_key.as_bytes(), admin_key.as_bytes());
    let pin_ok = event.admin_pin.is_empty()
        || constant_time_eq(event.admin_pin.as_bytes(), admin_pin.as_bytes());
    key_ok & pin_ok
}

/// Constant-time byte comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
