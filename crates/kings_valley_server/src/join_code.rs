//! Join code generation.

use kings_valley::JoinCode;
use rand::Rng;

/// Length of a join code.
pub const JOIN_CODE_LEN: usize = 6;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of candidate join codes.
///
/// The registry asks for a fresh candidate until one is free, so an
/// implementation may return duplicates.
pub trait JoinCodeGenerator: Send + Sync {
    /// Returns the next candidate code.
    fn generate(&mut self) -> JoinCode;
}

/// Uniformly random six-character uppercase alphanumeric codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJoinCodes;

impl JoinCodeGenerator for RandomJoinCodes {
    fn generate(&mut self) -> JoinCode {
        let mut rng = rand::thread_rng();
        (0..JOIN_CODE_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

/// Replays a fixed list of codes, cycling when exhausted. For tests.
#[derive(Debug, Clone)]
pub struct ScriptedJoinCodes {
    codes: Vec<JoinCode>,
    next: usize,
}

impl ScriptedJoinCodes {
    /// Creates a generator that yields `codes` in order.
    pub fn new(codes: impl IntoIterator<Item = impl Into<JoinCode>>) -> Self {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }
}

impl JoinCodeGenerator for ScriptedJoinCodes {
    fn generate(&mut self) -> JoinCode {
        if self.codes.is_empty() {
            return RandomJoinCodes.generate();
        }
        let code = self.codes[self.next % self.codes.len()].clone();
        self.next += 1;
        code
    }
}
