use smallvec::SmallVec;
use whitebox_core::Verdict;

struct Rule<T> {
    message: &'static str,
    holds: fn(&T) -> bool,
}

/// Ordered predicates over a validation subject `T`.
pub struct Rules<T> {
    rules: SmallVec<[Rule<T>; 8]>,
}

impl<T> Default for Rules<T> {
    fn default() -> Self { Self { rules: SmallVec::new() } }
}

impl<T> Rules<T> {
    pub fn new() -> Self { Self::default() }

    /// Append a predicate; `message` is reported verbatim when it does not hold.
    pub fn rule(mut self, message: &'static str, holds: fn(&T) -> bool) -> Self {
        self.rules.push(Rule { message, holds });
        self
    }

    pub fn len(&self) -> usize { self.rules.len() }
    pub fn is_empty(&self) -> bool { self.rules.is_empty() }

    /// First failing rule wins; the rest are not evaluated.
    pub fn evaluate(&self, subject: &T) -> Verdict {
        self.rules
            .iter()
            .find(|r| !(r.holds)(subject))
            .map_or(Verdict::Allow, |r| Verdict::Deny(r.message.to_string()))
    }
}
