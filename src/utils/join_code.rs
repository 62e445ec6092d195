//! Join codes: the only way into an existing team.
//!
//! Seven lowercase letters gives 26^7 (about 8 billion) codes, so collisions
//! are rare but possible; team creation checks for them and retries.

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

pub const JOIN_CODE_LEN: usize = 7;

lazy_static! {
    static ref JOIN_CODE: Regex = Regex::new(r"^[a-z]{7}$").unwrap();
}

pub fn generate_join_code() -> String {
    let mut rng = rand::thread_rng();
    (0..JOIN_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Whether `code` has the shape of a generated join code.
pub fn is_well_formed(code: &str) -> bool {
    JOIN_CODE.is_match(code)
}
