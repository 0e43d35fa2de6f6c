use rand::Rng;

/// Number of distinct lock codes, "0000" through "9999".
pub const PIN_SPACE: u32 = 10_000;

/// Draws before issuance gives up with `ExhaustedKeyspace`.
pub const PIN_ATTEMPTS: usize = 100;

pub const PIN_LEN: usize = 4;

/// Draws a zero-padded 4-digit code uniformly from the whole keyspace.
pub fn generate_pin<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:0width$}", rng.gen_range(0..PIN_SPACE), width = PIN_LEN)
}

pub fn is_well_formed(code: &str) -> bool {
    code.len() == PIN_LEN && code.bytes().all(|b| b.is_ascii_digit())
}
