use crate::embedder::{ensure_batch_len, Embedder};
use crate::error::{Result, VectorStoreError};
use ndarray::{Array2, Array3, ArrayD, Axis, Ix2, Ix3};
use once_cell::sync::OnceCell;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionInputs};
use ort::value::{DynTensor, Tensor};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokenizers::{Encoding, PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_MODEL_ID: &str = "all-minilm-l6-v2";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum EmbeddingMode {
    Fast,
    Stub,
}

impl EmbeddingMode {
    fn from_env() -> Result<Self> {
        let raw = env::var("RAGCHAT_EMBEDDING_MODE")
            .unwrap_or_else(|_| "fast".to_string())
            .to_ascii_lowercase();
        match raw.as_str() {
            "fast" => Ok(Self::Fast),
            "stub" => Ok(Self::Stub),
            other => Err(VectorStoreError::EmbeddingError(format!(
                "Unsupported RAGCHAT_EMBEDDING_MODE '{other}' (expected 'fast' or 'stub')"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ModelId(String);

impl Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ModelId {
    fn from_raw(model_name: &str) -> Self {
        Self(Self::normalize(model_name))
    }

    fn from_env() -> Self {
        let model_name = env::var("RAGCHAT_EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());
        Self::from_raw(&model_name)
    }

    fn normalize(raw: &str) -> String {
        let model_name = raw.trim().to_ascii_lowercase();
        let model_name = model_name
            .strip_prefix("sentence-transformers/")
            .unwrap_or(&model_name);
        match model_name {
            "minilm" | "all-minilm" => DEFAULT_MODEL_ID.to_string(),
            "bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => "bge-small".to_string(),
            other => other.to_string(),
        }
    }

    /// Built-in specs for models that work without a manifest.
    fn builtin_spec(&self) -> Option<ModelSpec> {
        let (dimension, max_length) = match self.0.as_str() {
            DEFAULT_MODEL_ID => (384, 256),
            "bge-small" => (384, 512),
            _ => return None,
        };
        Some(ModelSpec {
            id: self.clone(),
            onnx_rel_path: PathBuf::from("model.onnx"),
            tokenizer_rel_path: PathBuf::from("tokenizer.json"),
            dimension,
            max_length,
            max_batch: 32,
        })
    }

    fn spec(&self, model_dir: &Path) -> Result<ModelSpec> {
        let specs = load_manifest_specs(model_dir)?;
        if let Some(spec) = specs.get(self) {
            return Ok(spec.clone());
        }
        if let Some(spec) = self.builtin_spec() {
            return Ok(spec);
        }

        let mut available: Vec<String> = specs.keys().map(ToString::to_string).collect();
        available.push(DEFAULT_MODEL_ID.to_string());
        available.push("bge-small".to_string());
        available.sort();
        available.dedup();
        Err(VectorStoreError::EmbeddingError(format!(
            "Unknown embedding model id '{}'. Available: {}",
            self.0,
            available.join(", ")
        )))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ModelSpec {
    id: ModelId,
    onnx_rel_path: PathBuf,
    tokenizer_rel_path: PathBuf,
    dimension: usize,
    max_length: usize,
    max_batch: usize,
}

impl ModelSpec {
    fn assets_in(&self, model_dir: &Path) -> ModelAssets {
        let model_dir = model_dir.join(self.id.to_string());
        ModelAssets {
            model_path: model_dir.join(&self.onnx_rel_path),
            tokenizer_path: model_dir.join(&self.tokenizer_rel_path),
        }
    }
}

struct ModelAssets {
    model_path: PathBuf,
    tokenizer_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ModelsManifest {
    schema_version: u32,
    models: Vec<ManifestModel>,
}

#[derive(Debug, Deserialize)]
struct ManifestModel {
    id: String,
    dimension: usize,
    max_length: usize,
    max_batch: usize,
    #[serde(default)]
    assets: Vec<ManifestAsset>,
}

#[derive(Debug, Deserialize)]
struct ManifestAsset {
    path: String,
}

/// Asset path inside a model directory: relative, no `..`, not empty.
fn manifest_asset_path(model_id: &str, rel: &str) -> Result<PathBuf> {
    let path = Path::new(rel);
    let stays_inside = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    let names_a_file = path.components().any(|c| matches!(c, Component::Normal(_)));
    if stays_inside && names_a_file {
        Ok(path.to_path_buf())
    } else {
        Err(VectorStoreError::EmbeddingError(format!(
            "Invalid models manifest asset path for model '{model_id}': '{rel}' must be a relative path inside the model directory"
        )))
    }
}

/// Specs declared in `<model_dir>/manifest.json`. A missing manifest is not
/// an error; built-in specs cover the default models.
fn load_manifest_specs(model_dir: &Path) -> Result<HashMap<ModelId, ModelSpec>> {
    let manifest_path = model_dir.join("manifest.json");
    if !manifest_path.exists() {
        return Ok(HashMap::new());
    }

    let raw = std::fs::read_to_string(&manifest_path)?;
    let manifest: ModelsManifest = serde_json::from_str(&raw).map_err(|e| {
        VectorStoreError::EmbeddingError(format!(
            "Invalid models manifest {}: {e}",
            manifest_path.display()
        ))
    })?;
    if manifest.schema_version != 1 {
        return Err(VectorStoreError::EmbeddingError(format!(
            "Unsupported models manifest schema_version {} (expected 1)",
            manifest.schema_version
        )));
    }

    manifest
        .models
        .iter()
        .map(|model| -> Result<(ModelId, ModelSpec)> {
            let spec = ModelSpec {
                id: ModelId::from_raw(&model.id),
                onnx_rel_path: model
                    .asset(|name| name.ends_with(".onnx"))?
                    .unwrap_or_else(|| PathBuf::from("model.onnx")),
                tokenizer_rel_path: model
                    .asset(|name| name == "tokenizer.json")?
                    .unwrap_or_else(|| PathBuf::from("tokenizer.json")),
                dimension: model.dimension,
                max_length: model.max_length,
                max_batch: model.max_batch.max(1),
            };
            Ok((spec.id.clone(), spec))
        })
        .collect()
}

impl ManifestModel {
    /// First asset under `<id>/` whose lowercased file name is `wanted`.
    fn asset(&self, wanted: impl Fn(&str) -> bool) -> Result<Option<PathBuf>> {
        let prefix = format!("{}/", self.id);
        self.assets
            .iter()
            .filter_map(|asset| asset.path.strip_prefix(&prefix))
            .find(|rel| {
                Path::new(rel)
                    .file_name()
                    .is_some_and(|name| wanted(&name.to_string_lossy().to_ascii_lowercase()))
            })
            .map(|rel| manifest_asset_path(&self.id, rel))
            .transpose()
    }
}

/// Directory holding `<model-id>/model.onnx` and `<model-id>/tokenizer.json`.
fn model_dir() -> PathBuf {
    env::var("RAGCHAT_MODEL_DIR").map_or_else(|_| PathBuf::from("models"), PathBuf::from)
}

struct OrtBackend {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    max_batch: usize,
    dimension: usize,
}

// One ONNX session per model id for the whole process, shared by every chat.
static BACKENDS: OnceCell<Mutex<HashMap<ModelId, Arc<OrtBackend>>>> = OnceCell::new();

fn shared_backend(spec: &ModelSpec, model_dir: &Path) -> Result<Arc<OrtBackend>> {
    let cache = BACKENDS.get_or_init(|| Mutex::new(HashMap::new()));
    // Loading under the lock keeps concurrent first calls from loading twice.
    let mut guard = cache.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(backend) = guard.get(&spec.id) {
        return Ok(backend.clone());
    }
    let backend = Arc::new(OrtBackend::new(spec, model_dir)?);
    guard.insert(spec.id.clone(), backend.clone());
    Ok(backend)
}

fn ort_error<E: Display>(context: &'static str) -> impl Fn(E) -> VectorStoreError {
    move |e| VectorStoreError::EmbeddingError(format!("{context}: {e}"))
}

impl OrtBackend {
    fn new(spec: &ModelSpec, model_dir: &Path) -> Result<Self> {
        if !tokenizers::utils::parallelism::is_parallelism_configured() {
            tokenizers::utils::parallelism::set_parallelism(false);
        }

        let assets = spec.assets_in(model_dir);
        if !assets.model_path.exists() || !assets.tokenizer_path.exists() {
            return Err(VectorStoreError::EmbeddingError(format!(
                "Model files for '{}' are missing. Expected ONNX at {} and tokenizer at {}. Set RAGCHAT_MODEL_DIR or RAGCHAT_EMBEDDING_MODE=stub.",
                spec.id,
                assets.model_path.display(),
                assets.tokenizer_path.display(),
            )));
        }

        let mut tokenizer = Tokenizer::from_file(&assets.tokenizer_path)
            .map_err(|e| VectorStoreError::EmbeddingError(format!("Tokenizer load failed: {e}")))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..PaddingParams::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: spec.max_length,
                ..TruncationParams::default()
            }))
            .map_err(|e| {
                VectorStoreError::EmbeddingError(format!("Tokenizer truncation failed: {e}"))
            })?;

        let session = Session::builder()
            .map_err(ort_error("ORT session builder"))?
            .with_intra_threads(intra_threads())
            .map_err(ort_error("ORT intra threads"))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort_error("ORT optimization level"))?
            .commit_from_file(&assets.model_path)
            .map_err(ort_error("ONNX model load"))?;

        log::info!(
            "Loaded ONNX model '{}' (dim {}, max_length {}, batch {})",
            spec.id,
            spec.dimension,
            spec.max_length,
            spec.max_batch
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            max_batch: spec.max_batch,
            dimension: spec.dimension,
        })
    }

    fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.max_batch) {
            let encodings = self
                .tokenizer
                .encode_batch(batch.to_vec(), true)
                .map_err(|e| VectorStoreError::EmbeddingError(format!("Tokenization failed: {e}")))?;
            let inputs = BatchInputs::from_encodings(&encodings);
            let output = self.run(&inputs)?;
            vectors.extend(pool_output(output, &inputs.mask, self.dimension)?);
        }
        Ok(vectors)
    }

    fn run(&self, inputs: &BatchInputs) -> Result<ArrayD<f32>> {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);

        let mut feed: HashMap<String, DynTensor> = HashMap::new();
        for input in &session.inputs {
            let array = match input.name.as_str() {
                "input_ids" => &inputs.ids,
                "attention_mask" => &inputs.mask,
                "token_type_ids" => &inputs.type_ids,
                other => {
                    return Err(VectorStoreError::EmbeddingError(format!(
                        "Unsupported ONNX input '{other}'"
                    )))
                }
            };
            let tensor = Tensor::from_array(array.clone().into_dyn())
                .map_err(ort_error("ONNX input tensor"))?;
            feed.insert(input.name.clone(), tensor.upcast());
        }

        let outputs = session
            .run(SessionInputs::from(feed))
            .map_err(ort_error("ONNX forward"))?;
        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(ort_error("ONNX output"))?
            .to_owned();
        Ok(output)
    }
}

fn intra_threads() -> usize {
    // A quarter of the cores, between one and four.
    std::thread::available_parallelism().map_or(1, |n| (n.get() / 4).clamp(1, 4))
}

/// Model inputs for one padded batch, shaped `[batch, tokens]`.
struct BatchInputs {
    ids: Array2<i64>,
    mask: Array2<i64>,
    type_ids: Array2<i64>,
}

impl BatchInputs {
    fn from_encodings(encodings: &[Encoding]) -> Self {
        let rows = encodings.len();
        let cols = encodings.iter().map(Encoding::len).max().unwrap_or(0);
        let field = |values: fn(&Encoding) -> &[u32]| {
            Array2::from_shape_fn((rows, cols), |(row, col)| {
                values(&encodings[row]).get(col).map_or(0, |v| i64::from(*v))
            })
        };
        Self {
            ids: field(Encoding::get_ids),
            mask: field(Encoding::get_attention_mask),
            type_ids: field(Encoding::get_type_ids),
        }
    }
}

/// One normalized vector per batch row. Token states `[batch, tokens,
/// hidden]` are mean-pooled over the attention mask; `[batch, hidden]`
/// outputs are already pooled.
fn pool_output(
    output: ArrayD<f32>,
    mask: &Array2<i64>,
    dimension: usize,
) -> Result<Vec<Vec<f32>>> {
    let shape_error =
        |e: ndarray::ShapeError| VectorStoreError::EmbeddingError(format!("Bad output shape: {e}"));
    let pooled = match output.ndim() {
        2 => output.into_dimensionality::<Ix2>().map_err(shape_error)?,
        3 => mean_pool(&output.into_dimensionality::<Ix3>().map_err(shape_error)?, mask),
        _ => {
            return Err(VectorStoreError::EmbeddingError(format!(
                "Unexpected ONNX output dims: {:?}",
                output.shape()
            )))
        }
    };

    if pooled.ncols() != dimension {
        return Err(VectorStoreError::InvalidDimension {
            expected: dimension,
            actual: pooled.ncols(),
        });
    }
    Ok(pooled
        .outer_iter()
        .map(|row| {
            let mut vec = row.to_vec();
            normalize(&mut vec);
            vec
        })
        .collect())
}

fn mean_pool(hidden: &Array3<f32>, mask: &Array2<i64>) -> Array2<f32> {
    let weights = mask.mapv(|m| if m == 0 { 0.0f32 } else { 1.0 });
    let summed = (hidden * &weights.clone().insert_axis(Axis(2))).sum_axis(Axis(1));
    // Rows without any unmasked token pool to zero.
    let counts = weights
        .sum_axis(Axis(1))
        .mapv(|count| count.max(1.0))
        .insert_axis(Axis(1));
    summed / &counts
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vec {
        *value /= norm;
    }
}

/// Offline embedder: hashed bag of lowercase Unicode words, L2-normalized.
/// Texts sharing words land close together, which is enough for tests and
/// for running without model assets.
#[derive(Clone, Debug)]
struct StubBackend {
    dimension: usize,
}

impl StubBackend {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimension];
        for word in text.unicode_words() {
            let bucket = fnv1a_64(word.to_lowercase().as_bytes()) % self.dimension as u64;
            vec[bucket as usize] += 1.0;
        }
        normalize(&mut vec);
        vec
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

enum EmbeddingBackend {
    Ort(Arc<OrtBackend>),
    Stub(StubBackend),
}

/// Sentence embedding model (ONNX Runtime, or the offline stub)
pub struct EmbeddingModel {
    id: String,
    backend: EmbeddingBackend,
    dimension: usize,
}

impl EmbeddingModel {
    /// Model and mode from `RAGCHAT_EMBEDDING_MODEL` / `RAGCHAT_EMBEDDING_MODE`.
    pub fn new() -> Result<Self> {
        let mode = EmbeddingMode::from_env()?;
        Self::from_mode_and_id(mode, &ModelId::from_env())
    }

    /// Stub embedder with an explicit dimension, independent of the environment.
    #[must_use]
    pub fn stub(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            id: format!("stub-{dimension}"),
            backend: EmbeddingBackend::Stub(StubBackend { dimension }),
            dimension,
        }
    }

    fn from_mode_and_id(mode: EmbeddingMode, id: &ModelId) -> Result<Self> {
        let dir = model_dir();
        let spec = id.spec(&dir)?;

        let backend = match mode {
            EmbeddingMode::Stub => EmbeddingBackend::Stub(StubBackend {
                dimension: spec.dimension,
            }),
            EmbeddingMode::Fast => EmbeddingBackend::Ort(shared_backend(&spec, &dir)?),
        };

        Ok(Self {
            id: spec.id.to_string(),
            backend,
            dimension: spec.dimension,
        })
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub const fn is_stub(&self) -> bool {
        matches!(self.backend, EmbeddingBackend::Stub(_))
    }
}

impl Embedder for EmbeddingModel {
    fn model_id(&self) -> &str {
        &self.id
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let vectors = match &self.backend {
            EmbeddingBackend::Stub(stub) => texts.iter().map(|t| stub.embed(t)).collect(),
            EmbeddingBackend::Ort(backend) => backend.embed_texts(texts)?,
        };
        ensure_batch_len(texts.len(), &vectors)?;
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::squared_l2;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn models_manifest_rejects_path_traversal_assets() {
        let dir = TempDir::new().unwrap();
        let manifest = r#"
{
  "schema_version": 1,
  "models": [
    {"id":"m1","dimension":8,"max_length":16,"max_batch":2,"assets":[{"path":"m1/../evil.onnx"}]}
  ]
}
"#;
        std::fs::write(dir.path().join("manifest.json"), manifest).unwrap();
        let Err(err) = load_manifest_specs(dir.path()) else {
            panic!("expected load_manifest_specs to reject traversal paths");
        };
        assert!(
            err.to_string().contains("Invalid models manifest asset path"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn manifest_declares_custom_models() {
        let dir = TempDir::new().unwrap();
        let manifest = r#"
{
  "schema_version": 1,
  "models": [
    {"id":"tiny","dimension":8,"max_length":16,"max_batch":4,
     "assets":[{"path":"tiny/onnx/model.onnx"},{"path":"tiny/tokenizer.json"}]}
  ]
}
"#;
        std::fs::write(dir.path().join("manifest.json"), manifest).unwrap();
        let spec = ModelId::from_raw("TINY").spec(dir.path()).unwrap();
        assert_eq!(spec.dimension, 8);
        assert_eq!(spec.max_batch, 4);
        assert_eq!(spec.onnx_rel_path, PathBuf::from("onnx/model.onnx"));
        assert_eq!(
            spec.assets_in(dir.path()).model_path,
            dir.path().join("tiny").join("onnx/model.onnx")
        );
    }

    #[test]
    fn unsupported_manifest_schema_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("manifest.json"),
            r#"{"schema_version": 2, "models": []}"#,
        )
        .unwrap();
        assert!(load_manifest_specs(dir.path()).is_err());
    }

    #[test]
    fn builtin_spec_without_manifest() {
        let dir = TempDir::new().unwrap();
        let spec = ModelId::from_raw("sentence-transformers/all-MiniLM-L6-v2")
            .spec(dir.path())
            .unwrap();
        assert_eq!(spec.id.to_string(), DEFAULT_MODEL_ID);
        assert_eq!(spec.dimension, 384);
        assert_eq!(spec.max_length, 256);
    }

    #[test]
    fn unknown_model_lists_available_ids() {
        let dir = TempDir::new().unwrap();
        let err = ModelId::from_raw("nope").spec(dir.path()).unwrap_err();
        assert!(err.to_string().contains(DEFAULT_MODEL_ID), "{err}");
    }

    #[test]
    fn stub_is_deterministic_and_normalized() {
        let model = EmbeddingModel::stub(64);
        let a = model.embed("Hello world").unwrap();
        let b = model.embed("hello   WORLD!").unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn stub_batch_preserves_order() {
        let model = EmbeddingModel::stub(32);
        let batch = model.embed_batch(&["alpha", "beta", "gamma"]).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[1], model.embed("beta").unwrap());
        assert!(model.embed_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn stub_places_shared_words_closer() {
        let model = EmbeddingModel::stub(384);
        let query = model.embed("capital of France").unwrap();
        let related = model.embed("Paris is the capital of France").unwrap();
        let unrelated = model.embed("The Eiffel Tower is in Paris.").unwrap();
        assert!(squared_l2(&query, &related) < 1.2);
        assert!(squared_l2(&query, &unrelated) > 1.2);
    }

    #[test]
    fn stub_of_text_without_words_is_zero() {
        let model = EmbeddingModel::stub(16);
        assert!(model.embed("...").unwrap().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn mean_pool_ignores_masked_tokens() {
        let hidden = ndarray::arr3(&[
            [[1.0f32, 3.0], [3.0, 5.0], [100.0, 100.0]],
            [[0.0, 0.0], [7.0, 7.0], [7.0, 7.0]],
        ]);
        let mask = ndarray::arr2(&[[1i64, 1, 0], [0, 0, 0]]);
        assert_eq!(
            mean_pool(&hidden, &mask),
            ndarray::arr2(&[[2.0f32, 4.0], [0.0, 0.0]])
        );
    }

    #[test]
    fn pooled_output_is_normalized() {
        let hidden = ndarray::Array::from_shape_vec((1, 2, 2), vec![3.0f32, 0.0, 3.0, 0.0])
            .unwrap()
            .into_dyn();
        let out = pool_output(hidden, &ndarray::arr2(&[[1i64, 1]]), 2).unwrap();
        assert_eq!(out, vec![vec![1.0, 0.0]]);
    }

    #[test]
    fn output_dimension_is_checked() {
        let pooled = ndarray::Array::from_shape_vec((1, 3), vec![1.0f32, 0.0, 0.0])
            .unwrap()
            .into_dyn();
        let err = pool_output(pooled, &Array2::zeros((1, 0)), 4).unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::InvalidDimension {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    #[ignore = "Requires ONNX model assets in RAGCHAT_MODEL_DIR"]
    fn onnx_model_embeds_batch() {
        let model = EmbeddingModel::new().unwrap();
        let embeddings = model.embed_batch(&["hello world", "foo bar"]).unwrap();
        assert_eq!(embeddings.len(), 2);
        for emb in embeddings {
            assert_eq!(emb.len(), model.dimension());
        }
    }
}
