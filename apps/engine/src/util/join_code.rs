//! Match join codes: 10 characters from the Crockford base32 alphabet,
//! which drops I/L/O/U to stay unambiguous when read aloud.

use rand::Rng;

use crate::domain::state::MatchCode;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const CODE_LEN: usize = 10;

pub fn generate_match_code() -> MatchCode {
    let mut rng = rand::rng();
    let code: String = (0..CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    MatchCode::new(code)
}
