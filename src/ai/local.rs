//! Local text generation with an ONNX causal language model.
//!
//! The model is owned by a [`ModelProvider`], which loads it on first use and
//! remembers the outcome. A failed load stays failed until
//! [`ModelProvider::reset`] is called, so a missing model costs one filesystem
//! check per process rather than one per request.

use crate::ai::backend::TextGenerator;
use crate::ai::fallback::FallbackPool;
use crate::ai::sampling::{generate_tokens, CausalLm, SamplingParams};
use crate::errors::{AIError, AppResult};
use crate::inference::ModelArtifacts;
use ndarray::Array2;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

const EOS_TOKEN: &str = "<|endoftext|>";

/// A causal LM backed by an ONNX session.
///
/// The graph must take `input_ids` and `attention_mask` of shape
/// `[1, seq]` and return logits of shape `[1, seq, vocab]` first.
pub struct OnnxCausalLm {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    eos_token_id: Option<u32>,
}

impl OnnxCausalLm {
    pub fn load(model_dir: &Path) -> AppResult<Self> {
        let (session, tokenizer) = ModelArtifacts::in_dir(model_dir).load()?;
        let eos_token_id = tokenizer.token_to_id(EOS_TOKEN);
        if eos_token_id.is_none() {
            warn!("Tokenizer has no {} token; generation stops only at the length limit", EOS_TOKEN);
        }
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            eos_token_id,
        })
    }
}

impl CausalLm for OnnxCausalLm {
    fn encode(&self, text: &str) -> AppResult<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| AIError::Inference(format!("tokenization failed: {e}")))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> AppResult<String> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| AIError::Inference(format!("detokenization failed: {e}")).into())
    }

    fn next_token_logits(&self, ids: &[u32]) -> AppResult<Vec<f32>> {
        let seq_len = ids.len();
        let input_ids: Vec<i64> = ids.iter().map(|&id| i64::from(id)).collect();

        let input_ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| AIError::Inference(format!("failed to shape input_ids: {e}")))?;
        let attention_mask_array = Array2::<i64>::ones((1, seq_len));

        let mut session = self
            .session
            .lock()
            .map_err(|e| AIError::Inference(format!("generator session lock poisoned: {e}")))?;

        let input_ids_tensor = TensorRef::from_array_view(&input_ids_array)
            .map_err(|e| AIError::Inference(format!("failed to create input_ids tensor: {e}")))?;
        let attention_mask_tensor = TensorRef::from_array_view(&attention_mask_array).map_err(
            |e| AIError::Inference(format!("failed to create attention_mask tensor: {e}")),
        )?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor
            ])
            .map_err(|e| AIError::Inference(format!("generator inference failed: {e}")))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| AIError::Inference(format!("failed to extract logits: {e}")))?;

        let vocab = shape
            .last()
            .copied()
            .filter(|&v| v > 0)
            .ok_or_else(|| AIError::Inference(format!("unexpected logits shape {shape:?}")))?
            as usize;

        // Last position only.
        let start = data
            .len()
            .checked_sub(vocab)
            .ok_or_else(|| AIError::Inference("logits shorter than vocabulary".to_string()))?;
        Ok(data[start..].to_vec())
    }

    fn eos_token_id(&self) -> Option<u32> {
        self.eos_token_id
    }
}

type Loader = Box<dyn Fn() -> AppResult<Arc<dyn CausalLm>> + Send + Sync>;

enum LoadState {
    Unloaded,
    Ready(Arc<dyn CausalLm>),
    Failed(String),
}

/// Lazily loads a model once and shares it.
pub struct ModelProvider {
    state: Mutex<LoadState>,
    loader: Loader,
}

impl ModelProvider {
    /// Provider that loads an [`OnnxCausalLm`] from `model_dir`.
    pub fn from_dir(model_dir: impl Into<PathBuf>) -> Self {
        let model_dir = model_dir.into();
        Self::with_loader(move || {
            let model: Arc<dyn CausalLm> = Arc::new(OnnxCausalLm::load(&model_dir)?);
            Ok(model)
        })
    }

    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> AppResult<Arc<dyn CausalLm>> + Send + Sync + 'static,
    {
        Self {
            state: Mutex::new(LoadState::Unloaded),
            loader: Box::new(loader),
        }
    }

    /// Returns the model, loading it on the first call.
    ///
    /// Concurrent first callers wait on the lock, so the loader runs once.
    pub fn get(&self) -> AppResult<Arc<dyn CausalLm>> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| AIError::ModelUnavailable(format!("model state lock poisoned: {e}")))?;

        match &*state {
            LoadState::Ready(model) => return Ok(Arc::clone(model)),
            LoadState::Failed(reason) => {
                return Err(AIError::ModelUnavailable(reason.clone()).into())
            }
            LoadState::Unloaded => {}
        }

        match (self.loader)() {
            Ok(model) => {
                info!("Local generation model ready");
                *state = LoadState::Ready(Arc::clone(&model));
                Ok(model)
            }
            Err(e) => {
                warn!("Local generation model failed to load: {}", e);
                *state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Forgets a loaded model or a cached failure.
    pub fn reset(&self) {
        if let Ok(mut state) = self.state.lock() {
            *state = LoadState::Unloaded;
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state.lock().as_deref(), Ok(LoadState::Ready(_)))
    }
}

/// Removes a leading copy of `prompt` from `text`, if the model echoed it.
pub fn strip_prompt_echo(text: &str, prompt: &str) -> String {
    let text = text.trim();
    let prompt = prompt.trim();
    if !prompt.is_empty() {
        if let Some(rest) = text.strip_prefix(prompt) {
            return rest.trim().to_string();
        }
    }
    text.to_string()
}

/// [`TextGenerator`] backed by a local causal LM.
pub struct LocalBackend {
    provider: Arc<ModelProvider>,
    params: SamplingParams,
    fallback: FallbackPool,
}

impl LocalBackend {
    pub fn new(provider: Arc<ModelProvider>) -> Self {
        Self {
            provider,
            params: SamplingParams::default(),
            fallback: FallbackPool::local_default(),
        }
    }

    pub fn with_params(mut self, params: SamplingParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn provider(&self) -> &Arc<ModelProvider> {
        &self.provider
    }
}

impl TextGenerator for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn try_generate(&self, prompt: &str, history: Option<&str>) -> AppResult<String> {
        let model = self.provider.get()?;

        let input = match history.filter(|h| !h.trim().is_empty()) {
            Some(history) => format!("{}\n{}", history.trim_end(), prompt),
            None => prompt.to_string(),
        };

        let mut ids = model.encode(&input)?;
        if let Some(eos) = model.eos_token_id() {
            ids.push(eos);
        }
        debug!("Local prompt is {} tokens", ids.len());

        let generated = generate_tokens(model.as_ref(), &ids, &self.params, &mut rand::thread_rng())?;
        let text = model.decode(&generated)?;
        Ok(strip_prompt_echo(&text, prompt))
    }

    fn fallback_pool(&self) -> &FallbackPool {
        &self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::backend::Generation;
    use crate::errors::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes nothing; emits "ok" then end-of-turn. Vocabulary: 0=o 1=k 2=eos.
    struct TinyModel;

    impl CausalLm for TinyModel {
        fn encode(&self, text: &str) -> AppResult<Vec<u32>> {
            Ok(vec![0; text.len().min(4)])
        }

        fn decode(&self, ids: &[u32]) -> AppResult<String> {
            Ok(ids
                .iter()
                .map(|id| match id {
                    0 => 'o',
                    1 => 'k',
                    _ => '?',
                })
                .collect())
        }

        fn next_token_logits(&self, ids: &[u32]) -> AppResult<Vec<f32>> {
            // After eos: "o"; after "o": "k"; after "k": eos.
            let next = match ids.last() {
                Some(2) => 0,
                Some(0) => 1,
                _ => 2,
            };
            let mut logits = vec![0.0; 3];
            logits[next] = 20.0;
            Ok(logits)
        }

        fn eos_token_id(&self) -> Option<u32> {
            Some(2)
        }
    }

    fn greedy() -> SamplingParams {
        SamplingParams {
            temperature: 0.0,
            no_repeat_ngram: 0,
            ..SamplingParams::default()
        }
    }

    #[test]
    fn test_failed_load_is_cached_until_reset() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let provider = ModelProvider::with_loader(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(AIError::ModelUnavailable("missing artifact model.onnx".to_string()).into())
        });

        assert!(provider.get().is_err());
        assert!(provider.get().is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        provider.reset();
        assert!(provider.get().is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_successful_load_happens_once() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let provider = ModelProvider::with_loader(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let model: Arc<dyn CausalLm> = Arc::new(TinyModel);
            Ok(model)
        });

        assert!(!provider.is_loaded());
        provider.get().unwrap();
        provider.get().unwrap();
        assert!(provider.is_loaded());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_callers_share_one_load() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let provider = ModelProvider::with_loader(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            counter.fetch_add(1, Ordering::SeqCst);
            let model: Arc<dyn CausalLm> = Arc::new(TinyModel);
            Ok(model)
        });

        let results: Vec<bool> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| provider.get().is_ok())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|ok| *ok));
        assert!(provider.is_loaded());
    }

    #[test]
    fn test_concurrent_first_callers_share_one_failure() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let provider = ModelProvider::with_loader(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            counter.fetch_add(1, Ordering::SeqCst);
            Err(AIError::ModelUnavailable("missing artifact model.onnx".to_string()).into())
        });

        let errors: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| provider.get().err().map(|e| e.to_string())))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().expect("every caller should see the failure"))
                .collect()
        });

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(errors.len(), 8);
        assert!(errors.iter().all(|e| e.contains("model.onnx")));
        assert!(!provider.is_loaded());
    }

    #[test]
    fn test_missing_artifacts_route_to_fallback() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let backend = LocalBackend::new(Arc::new(ModelProvider::from_dir(temp_dir.path())));

        match backend.try_generate("hello", None) {
            Err(AppError::AI(AIError::ModelUnavailable(msg))) => assert!(msg.contains("model.onnx")),
            other => panic!("Expected ModelUnavailable, got {:?}", other.map(|_| ())),
        }

        let generation = backend.generate("hello", None);
        assert!(generation.is_fallback());
        assert!(FallbackPool::local_default().contains(generation.text()));
    }

    #[test]
    fn test_generates_from_loaded_model() {
        let provider = ModelProvider::with_loader(|| {
            let model: Arc<dyn CausalLm> = Arc::new(TinyModel);
            Ok(model)
        });
        let backend = LocalBackend::new(Arc::new(provider)).with_params(greedy());

        assert_eq!(
            backend.generate("hi", Some("User: earlier\n")),
            Generation::Generated("ok".to_string())
        );
    }

    #[test]
    fn test_strip_prompt_echo() {
        assert_eq!(strip_prompt_echo("hi there friend", "hi there"), "friend");
        assert_eq!(strip_prompt_echo("  friend ", "hi"), "friend");
        assert_eq!(strip_prompt_echo("hi", ""), "hi");
    }
}
