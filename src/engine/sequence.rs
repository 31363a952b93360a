//! Request sequence tokens for ordering fetch completions.

/// Issues monotonically increasing fetch tokens and decides which
/// completions may still be applied.
///
/// A completion is applied only if its token is newer than every token
/// applied before it, so a slow early fetch can never overwrite the result
/// of a later one.
#[derive(Debug, Default, Clone)]
pub struct FetchSequencer {
    issued: u64,
    applied: u64,
}

impl FetchSequencer {
    /// Creates a sequencer that has issued nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: 0,
            applied: 0,
        }
    }

    /// Issues the next token. Tokens start at 1.
    pub fn issue(&mut self) -> u64 {
        self.issued = self.issued.saturating_add(1);
        self.issued
    }

    /// Marks `token` applied if it is newer than the last applied token and
    /// was actually issued. Returns `false` for stale or unknown tokens.
    pub fn accept(&mut self, token: u64) -> bool {
        if token <= self.applied || token > self.issued {
            return false;
        }
        self.applied = token;
        true
    }

    /// Latest issued token, `0` if none.
    #[must_use]
    pub const fn latest_issued(&self) -> u64 {
        self.issued
    }

    /// Latest applied token, `0` if none.
    #[must_use]
    pub const fn latest_applied(&self) -> u64 {
        self.applied
    }
}
