//! ONNX Runtime and tokenizer loading shared by the local generator and the
//! sentiment classifier.
//!
//! Both expect a directory holding `model.onnx` and `tokenizer.json`. Missing
//! files are reported as [`AIError::ModelUnavailable`] so callers can route to
//! their fallback path instead of treating it as fatal.

use crate::constants::{MODEL_FILE_NAME, TOKENIZER_FILE_NAME};
use crate::errors::{AIError, AppResult};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;
use tracing::{debug, info};

/// Paths of the two artifacts inside a model directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifacts {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

impl ModelArtifacts {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model_path: dir.join(MODEL_FILE_NAME),
            tokenizer_path: dir.join(TOKENIZER_FILE_NAME),
        }
    }

    /// Returns true if both model and tokenizer files exist.
    pub fn is_available(&self) -> bool {
        self.model_path.exists() && self.tokenizer_path.exists()
    }

    /// Fails with `ModelUnavailable` naming the first missing file.
    pub fn ensure_present(&self) -> AppResult<()> {
        for path in [&self.model_path, &self.tokenizer_path] {
            if !path.exists() {
                return Err(AIError::ModelUnavailable(format!(
                    "missing artifact {}",
                    path.display()
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Loads the tokenizer and builds a CPU inference session.
    pub fn load(&self) -> AppResult<(Session, Tokenizer)> {
        self.ensure_present()?;
        debug!("Loading model artifacts from {:?}", self.model_path.parent());

        let tokenizer = Tokenizer::from_file(&self.tokenizer_path).map_err(|e| {
            AIError::ModelUnavailable(format!(
                "failed to load tokenizer from {}: {e}",
                self.tokenizer_path.display()
            ))
        })?;

        let session = Session::builder()
            .map_err(|e| AIError::ModelUnavailable(format!("failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| AIError::ModelUnavailable(format!("failed to set optimization level: {e}")))?
            .with_intra_threads(1)
            .map_err(|e| AIError::ModelUnavailable(format!("failed to set thread count: {e}")))?
            .commit_from_file(&self.model_path)
            .map_err(|e| {
                AIError::ModelUnavailable(format!(
                    "failed to load ONNX model from {}: {e}",
                    self.model_path.display()
                ))
            })?;

        info!("Loaded ONNX model {}", self.model_path.display());
        Ok((session, tokenizer))
    }
}
