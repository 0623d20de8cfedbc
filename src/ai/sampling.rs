//! Autoregressive decoding for the local backend.
//!
//! Decoding is written against the small [`CausalLm`] trait rather than an
//! ONNX session so the sampling rules can be tested with a scripted model.

use crate::constants::{
    LOCAL_MAX_CONTEXT_TOKENS, LOCAL_MAX_NEW_TOKENS, LOCAL_NO_REPEAT_NGRAM, LOCAL_TEMPERATURE,
    LOCAL_TOP_K, LOCAL_TOP_P,
};
use crate::errors::{AIError, AppResult};
use rand::distributions::WeightedIndex;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// A causal language model plus its tokenizer.
pub trait CausalLm: Send + Sync {
    fn encode(&self, text: &str) -> AppResult<Vec<u32>>;

    fn decode(&self, ids: &[u32]) -> AppResult<String>;

    /// Logits over the vocabulary for the token following `ids`.
    fn next_token_logits(&self, ids: &[u32]) -> AppResult<Vec<f32>>;

    /// Token that ends a turn, if the vocabulary has one.
    fn eos_token_id(&self) -> Option<u32>;
}

/// Decoding parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_new_tokens: usize,
    /// Prompt plus generated tokens never exceed this.
    pub max_context_tokens: usize,
    /// `<= 0.0` means greedy decoding.
    pub temperature: f32,
    /// `0` disables top-k filtering.
    pub top_k: usize,
    pub top_p: f32,
    /// `0` disables the repeat ban.
    pub no_repeat_ngram: usize,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_new_tokens: LOCAL_MAX_NEW_TOKENS,
            max_context_tokens: LOCAL_MAX_CONTEXT_TOKENS,
            temperature: LOCAL_TEMPERATURE,
            top_k: LOCAL_TOP_K,
            top_p: LOCAL_TOP_P,
            no_repeat_ngram: LOCAL_NO_REPEAT_NGRAM,
        }
    }
}

/// Tokens that would complete an n-gram already present in `ids`.
pub fn banned_tokens(ids: &[u32], n: usize) -> HashSet<u32> {
    let mut banned = HashSet::new();
    if n == 0 || ids.len() + 1 < n {
        return banned;
    }
    if n == 1 {
        banned.extend(ids.iter().copied());
        return banned;
    }

    let prefix = &ids[ids.len() - (n - 1)..];
    for window in ids.windows(n) {
        if &window[..n - 1] == prefix {
            banned.insert(window[n - 1]);
        }
    }
    banned
}

/// Picks the next token from `logits`.
///
/// Banned tokens are masked first; then temperature, top-k and top-p are
/// applied in that order. Fails only when every token is masked.
pub fn sample_from_logits<R: Rng + ?Sized>(
    logits: &[f32],
    banned: &HashSet<u32>,
    params: &SamplingParams,
    rng: &mut R,
) -> AppResult<u32> {
    let mut candidates: Vec<(u32, f32)> = logits
        .iter()
        .enumerate()
        .map(|(id, &logit)| (id as u32, logit))
        .filter(|(id, logit)| logit.is_finite() && !banned.contains(id))
        .collect();

    if candidates.is_empty() {
        return Err(AIError::Inference("no token left to sample".to_string()).into());
    }

    // Stable sort keeps the lower id first on ties.
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    if params.temperature <= 0.0 {
        return Ok(candidates[0].0);
    }

    if params.top_k > 0 {
        candidates.truncate(params.top_k);
    }

    let max = candidates[0].1 / params.temperature;
    let mut weights: Vec<f32> = candidates
        .iter()
        .map(|(_, logit)| (logit / params.temperature - max).exp())
        .collect();
    let total: f32 = weights.iter().sum();

    if params.top_p < 1.0 {
        let mut cumulative = 0.0;
        let mut keep = 0;
        for weight in &weights {
            cumulative += weight / total;
            keep += 1;
            if cumulative >= params.top_p {
                break;
            }
        }
        weights.truncate(keep);
    }

    let distribution = WeightedIndex::new(&weights)
        .map_err(|e| AIError::Inference(format!("invalid sampling weights: {e}")))?;
    Ok(candidates[rng.sample(distribution)].0)
}

/// Generates continuation tokens for `prompt_ids`.
///
/// The prompt is cut from the front so prompt and continuation fit in the
/// context window. Only new tokens are returned; decoding stops at the
/// end-of-turn token, which is not included.
pub fn generate_tokens<R: Rng + ?Sized>(
    model: &dyn CausalLm,
    prompt_ids: &[u32],
    params: &SamplingParams,
    rng: &mut R,
) -> AppResult<Vec<u32>> {
    let budget = params
        .max_context_tokens
        .saturating_sub(params.max_new_tokens)
        .max(1);
    let start = prompt_ids.len().saturating_sub(budget);
    let mut ids: Vec<u32> = prompt_ids[start..].to_vec();
    let prompt_len = ids.len();

    if start > 0 {
        debug!("Truncated prompt by {} tokens to fit the context", start);
    }

    let eos = model.eos_token_id();
    while ids.len() - prompt_len < params.max_new_tokens {
        let logits = model.next_token_logits(&ids)?;
        let banned = banned_tokens(&ids, params.no_repeat_ngram);
        let next = sample_from_logits(&logits, &banned, params, rng)?;
        if Some(next) == eos {
            break;
        }
        ids.push(next);
    }

    Ok(ids.split_off(prompt_len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Vocabulary of 6 tokens; always prefers `last + 1`, with 5 as end-of-turn.
    struct CountingModel;

    impl CausalLm for CountingModel {
        fn encode(&self, text: &str) -> AppResult<Vec<u32>> {
            Ok(text.bytes().map(|b| u32::from(b - b'0')).collect())
        }

        fn decode(&self, ids: &[u32]) -> AppResult<String> {
            Ok(ids.iter().map(|id| id.to_string()).collect())
        }

        fn next_token_logits(&self, ids: &[u32]) -> AppResult<Vec<f32>> {
            let next = ids.last().map(|&id| (id + 1).min(5)).unwrap_or(0);
            let mut logits = vec![0.0; 6];
            logits[next as usize] = 10.0;
            Ok(logits)
        }

        fn eos_token_id(&self) -> Option<u32> {
            Some(5)
        }
    }

    fn greedy() -> SamplingParams {
        SamplingParams {
            temperature: 0.0,
            ..SamplingParams::default()
        }
    }

    #[test]
    fn test_banned_tokens_finds_repeated_trigram_completion() {
        // "1 2 3 ... 1 2" => 3 would repeat "1 2 3"
        let banned = banned_tokens(&[1, 2, 3, 4, 1, 2], 3);
        assert_eq!(banned, HashSet::from([3]));
    }

    #[test]
    fn test_banned_tokens_short_or_disabled() {
        assert!(banned_tokens(&[1], 3).is_empty());
        assert!(banned_tokens(&[1, 2, 1, 2], 0).is_empty());
        assert_eq!(banned_tokens(&[4, 4, 7], 1), HashSet::from([4, 7]));
    }

    #[test]
    fn test_greedy_picks_argmax() {
        let mut rng = StdRng::seed_from_u64(1);
        let next = sample_from_logits(&[0.1, 2.0, 1.0], &HashSet::new(), &greedy(), &mut rng);
        assert_eq!(next.unwrap(), 1);
    }

    #[test]
    fn test_banned_token_is_never_sampled() {
        let mut rng = StdRng::seed_from_u64(3);
        let banned = HashSet::from([1]);
        for _ in 0..100 {
            let next =
                sample_from_logits(&[0.0, 50.0, 0.0], &banned, &SamplingParams::default(), &mut rng)
                    .unwrap();
            assert_ne!(next, 1);
        }
    }

    #[test]
    fn test_top_k_one_is_deterministic() {
        let params = SamplingParams {
            top_k: 1,
            ..SamplingParams::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let next = sample_from_logits(&[1.0, 1.5, 1.4], &HashSet::new(), &params, &mut rng);
            assert_eq!(next.unwrap(), 1);
        }
    }

    #[test]
    fn test_top_p_drops_the_tail() {
        // softmax puts ~0.999 on token 0, so a 0.5 nucleus keeps only it.
        let params = SamplingParams {
            temperature: 1.0,
            top_k: 0,
            top_p: 0.5,
            ..SamplingParams::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let next = sample_from_logits(&[10.0, 3.0, 2.0], &HashSet::new(), &params, &mut rng);
            assert_eq!(next.unwrap(), 0);
        }
    }

    #[test]
    fn test_everything_masked_is_an_error() {
        let mut rng = StdRng::seed_from_u64(0);
        let banned = HashSet::from([0, 1]);
        let result = sample_from_logits(&[1.0, 2.0], &banned, &greedy(), &mut rng);
        assert!(matches!(result, Err(AppError::AI(AIError::Inference(_)))));
    }

    #[test]
    fn test_generation_stops_at_eos_and_strips_prompt() {
        let mut rng = StdRng::seed_from_u64(0);
        let model = CountingModel;
        let prompt = model.encode("12").unwrap();

        let generated = generate_tokens(&model, &prompt, &greedy(), &mut rng).unwrap();

        assert_eq!(generated, vec![3, 4]);
        assert_eq!(model.decode(&generated).unwrap(), "34");
    }

    #[test]
    fn test_generation_respects_max_new_tokens() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = SamplingParams {
            max_new_tokens: 1,
            ..greedy()
        };

        let generated = generate_tokens(&CountingModel, &[0], &params, &mut rng).unwrap();
        assert_eq!(generated, vec![1]);
    }

    #[test]
    fn test_long_prompt_is_cut_from_the_front() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = SamplingParams {
            max_new_tokens: 2,
            max_context_tokens: 4,
            ..greedy()
        };

        // Only the last two prompt tokens (3, 4) are kept; 4 leads to eos.
        let generated = generate_tokens(&CountingModel, &[0, 1, 2, 3, 4], &params, &mut rng);
        assert!(generated.unwrap().is_empty());
    }
}
