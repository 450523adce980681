/// Classification of a failed price fetch.
///
/// Used by the sync worker to decide whether a failure stays local to
/// one card or ends the whole batch.
///
/// # Behavior Summary
///
/// | Class | Counted as card error? | Batch continues? | Old price kept? |
/// |-------|------------------------|------------------|-----------------|
/// | `Transient` | Yes | Yes | Yes |
/// | `NotFound` | Yes | Yes | Yes |
/// | `Fatal` | Yes | No (abort) | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FetchClass {
    /// Timeout, 5xx, rate limiting or a dropped connection.
    /// The card can be retried on a later run.
    Transient,

    /// The catalogue has no match for this card.
    /// Terminal for the card but not an engine error.
    NotFound,

    /// Authentication failure or malformed request.
    /// Every remaining card would fail the same way.
    Fatal,
}

impl FetchClass {
    /// Whether this failure should abort the enclosing batch.
    pub fn aborts_batch(&self) -> bool {
        matches!(self, FetchClass::Fatal)
    }
}

impl std::fmt::Display for FetchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchClass::Transient => write!(f, "transient"),
            FetchClass::NotFound => write!(f, "not-found"),
            FetchClass::Fatal => write!(f, "fatal"),
        }
    }
}
