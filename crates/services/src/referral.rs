//! Referral codes and ambassador reward amounts.

use rand::Rng;

pub const REFERRAL_CODE_LEN: usize = 8;
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn generate_referral_code() -> String {
    let mut rng = rand::rng();
    (0..REFERRAL_CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

pub fn is_valid_referral_code(code: &str) -> bool {
    code.len() == REFERRAL_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Reward is a floor share of the order total.
pub fn reward_amount(total_paise: u64, reward_rate_bps: u32) -> u64 {
    total_paise * reward_rate_bps as u64 / 10_000
}
