use anyhow::Result;
use rand::Rng;

pub const CODE_LEN: usize = 8;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// One candidate public review code: 8 uppercase letters / digits.
pub fn random_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Generates codes until `taken` reports one free. The retry loop is a
/// correctness requirement, not an optimization; the UNIQUE constraint on
/// events.unique_code still backstops a concurrent insert.
pub fn generate_unique_code<F>(mut taken: F) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    loop {
        let code = random_code();
        if !taken(&code)? {
            return Ok(code);
        }
    }
}
