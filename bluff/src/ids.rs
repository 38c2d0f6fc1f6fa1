//! Short identifier generation for rooms and clients.
//!
//! Identifiers only need to be unique among live rooms or connections, so
//! callers check each candidate against their own map and draw again on a
//! collision. The source is a trait object so tests can script collisions.

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::VecDeque;

/// Characters that are hard to confuse when read aloud or typed (no I, O, 0, 1).
pub const ID_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const ROOM_ID_LEN: usize = 5;
pub const CLIENT_ID_LEN: usize = 8;

pub trait IdSource: Send {
    /// Returns a candidate identifier of `len` characters. Uniqueness is the
    /// caller's job.
    fn next_id(&mut self, len: usize) -> String;
}

/// Draws characters uniformly from [`ID_ALPHABET`].
#[derive(Debug)]
pub struct RandomIds<R> {
    rng: R,
}

impl<R: Rng> RandomIds<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomIds<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng + Send> IdSource for RandomIds<R> {
    fn next_id(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| ID_ALPHABET[self.rng.random_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }
}

/// Replays a fixed list of identifiers, then falls back to random ones.
#[derive(Debug)]
pub struct ScriptedIds {
    script: VecDeque<String>,
    fallback: RandomIds<StdRng>,
}

impl ScriptedIds {
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: script.into_iter().map(Into::into).collect(),
            fallback: RandomIds::new(StdRng::seed_from_u64(0)),
        }
    }
}

impl IdSource for ScriptedIds {
    fn next_id(&mut self, len: usize) -> String {
        self.script
            .pop_front()
            .unwrap_or_else(|| self.fallback.next_id(len))
    }
}

/// Draws from `source` until `is_taken` rejects nothing.
pub fn unique_id(
    source: &mut dyn IdSource,
    len: usize,
    is_taken: impl Fn(&str) -> bool,
) -> String {
    loop {
        let candidate = source.next_id(len);
        if !is_taken(&candidate) {
            return candidate;
        }
        log::debug!("Identifier {} already in use, drawing again", candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_use_alphabet() {
        let mut ids = RandomIds::new(StdRng::seed_from_u64(3));
        for _ in 0..100 {
            let id = ids.next_id(CLIENT_ID_LEN);
            assert_eq!(id.len(), CLIENT_ID_LEN);
            assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_alphabet_excludes_ambiguous_characters() {
        for c in [b'I', b'O', b'0', b'1'] {
            assert!(!ID_ALPHABET.contains(&c));
        }
    }

    #[test]
    fn test_unique_id_skips_taken() {
        let mut ids = ScriptedIds::new(["AAAAA", "AAAAA", "BBBBB"]);
        let id = unique_id(&mut ids, ROOM_ID_LEN, |candidate| candidate == "AAAAA");
        assert_eq!(id, "BBBBB");
    }

    #[test]
    fn test_scripted_falls_back_to_random() {
        let mut ids = ScriptedIds::new(["ZZZZZ"]);
        assert_eq!(ids.next_id(ROOM_ID_LEN), "ZZZZZ");
        assert_eq!(ids.next_id(ROOM_ID_LEN).len(), ROOM_ID_LEN);
    }
}
