//! Canned replies used when a generation backend cannot produce text.

use crate::errors::{AppError, AppResult};
use rand::Rng;

const REMOTE_FALLBACKS: [&str; 5] = [
    "I understand you're reaching out. Could you tell me more about what's on your mind?",
    "I'm here to chat. What would you like to talk about?",
    "I'm listening. Feel free to share your thoughts or feelings.",
    "I'm here to support you. What's been going on lately?",
    "I'd love to hear more about what you're experiencing. Would you like to share?",
];

const LOCAL_FALLBACKS: [&str; 5] = [
    "Thank you for sharing that with me. How are you feeling right now?",
    "I'm here with you. Would you like to talk through what's been happening?",
    "That sounds like a lot to carry. What would help you feel a little better today?",
    "It's okay to take things one step at a time. What's on your mind?",
    "I'm listening whenever you're ready to share more.",
];

/// A fixed, non-empty set of replies picked from uniformly at random.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPool {
    responses: Vec<String>,
}

impl FallbackPool {
    /// Builds a pool from `responses`, dropping blank entries.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no non-blank response remains.
    pub fn new<I, S>(responses: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let responses: Vec<String> = responses
            .into_iter()
            .map(Into::into)
            .filter(|r| !r.trim().is_empty())
            .collect();

        if responses.is_empty() {
            return Err(AppError::Config(
                "Fallback pool must contain at least one non-empty response".to_string(),
            ));
        }

        Ok(Self { responses })
    }

    /// Pool for the remote backend.
    pub fn remote_default() -> Self {
        Self::from_static(&REMOTE_FALLBACKS)
    }

    /// Pool for the local backend.
    pub fn local_default() -> Self {
        Self::from_static(&LOCAL_FALLBACKS)
    }

    fn from_static(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    pub fn contains(&self, text: &str) -> bool {
        self.responses.iter().any(|r| r == text)
    }

    /// Picks a response uniformly at random.
    pub fn pick(&self) -> &str {
        self.pick_with(&mut rand::thread_rng())
    }

    pub fn pick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // Non-empty by construction.
        &self.responses[rng.gen_range(0..self.responses.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_empty_pool_is_rejected() {
        assert!(FallbackPool::new(Vec::<String>::new()).is_err());
        assert!(FallbackPool::new(["", "   "]).is_err());
    }

    #[test]
    fn test_blank_entries_are_dropped() {
        let pool = FallbackPool::new(["", "hello", "  "]).unwrap();
        assert_eq!(pool.responses(), ["hello".to_string()]);
        assert_eq!(pool.pick(), "hello");
    }

    #[test]
    fn test_default_pools_are_distinct_and_non_empty() {
        let remote = FallbackPool::remote_default();
        let local = FallbackPool::local_default();

        assert_eq!(remote.responses().len(), 5);
        assert_eq!(local.responses().len(), 5);
        assert!(remote.responses().iter().all(|r| !local.contains(r)));
    }

    #[test]
    fn test_pick_reaches_every_response() {
        let pool = FallbackPool::remote_default();
        let mut rng = StdRng::seed_from_u64(7);

        let seen: HashSet<&str> = (0..500).map(|_| pool.pick_with(&mut rng)).collect();

        assert_eq!(seen.len(), pool.responses().len());
    }
}
