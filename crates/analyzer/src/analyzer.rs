// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The analyzer facade.
//!
//! ```text
//!   Upload ──► check ──► GraphLoader ──► ModelInfo ──► profile ──► ProfileReport
//!                                           │
//!                                           └──► CompilerBackend ──► ArtifactCache
//! ```
//!
//! Load and profile faults are folded into reports with `valid == false`.
//! Compilation faults are returned as errors.

use crate::{AnalyzerConfig, AnalyzerError, Fault, Upload};
use board_catalog::{BoardBudget, BoardCatalog};
use codegen::{
    ArtifactCache, CDescriptorBackend, CacheKey, CompiledArtifact, CompilerBackend, ModelDigest,
};
use onnx_ir::{GraphLoader, ModelInfo};
use profiler::{ConvResolution, ModelProfile, ProfileOptions, Resolution};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// ── Requests and reports ───────────────────────────────────────

/// Per-request overrides of the configured profiling defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRequest {
    /// Board identifier; the configured default when `None`.
    pub board: Option<String>,
    pub quantized: Option<bool>,
    pub batch_size: Option<u64>,
    pub input_resolution: Option<Resolution>,
}

/// Outcome of [`Analyzer::load`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LoadReport {
    pub valid: bool,
    pub error: Option<String>,
    pub fault: Option<Fault>,
    pub model_info: Option<ModelInfo>,
}

impl LoadReport {
    fn ok(info: ModelInfo) -> Self {
        Self {
            valid: true,
            error: None,
            fault: None,
            model_info: Some(info),
        }
    }

    fn invalid(err: &AnalyzerError) -> Self {
        Self {
            valid: false,
            error: Some(err.to_string()),
            fault: Some(err.fault()),
            model_info: None,
        }
    }
}

/// Outcome of [`Analyzer::profile`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProfileReport {
    pub valid: bool,
    pub error: Option<String>,
    pub fault: Option<Fault>,
    pub profile: Option<ModelProfile>,
    /// The board identifier as requested, if any. After a fallback this
    /// differs from `profile.board_name`.
    pub requested_board: Option<String>,
    /// Set when the requested board was unknown and the default was used.
    pub board_fell_back: bool,
}

impl ProfileReport {
    fn invalid(err: &AnalyzerError) -> Self {
        Self {
            valid: false,
            error: Some(err.to_string()),
            fault: Some(err.fault()),
            profile: None,
            requested_board: None,
            board_fell_back: false,
        }
    }
}

// ── Analyzer ───────────────────────────────────────────────────

/// Wires loader, profiler, board catalog and compiler backend together.
///
/// An `Analyzer` is `Send + Sync`; share it behind an `Arc` to serve
/// concurrent requests. The only mutable state is the artifact cache and
/// the most recently loaded model.
///
/// # Example
/// ```no_run
/// use analyzer::{Analyzer, AnalyzerConfig, ProfileRequest, Upload};
///
/// # fn example(bytes: Vec<u8>) -> Result<(), analyzer::AnalyzerError> {
/// let analyzer = Analyzer::new(AnalyzerConfig::default())?;
/// let report = analyzer.profile(&Upload::new("model.onnx", bytes), &ProfileRequest::default());
/// if let Some(profile) = report.profile {
///     println!("{}", profile.summary());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Analyzer {
    config: AnalyzerConfig,
    catalog: BoardCatalog,
    defaults: ProfileOptions,
    backend: Arc<dyn CompilerBackend>,
    cache: Arc<ArtifactCache>,
    current: Mutex<Option<Arc<ModelInfo>>>,
}

impl Analyzer {
    /// Creates an analyzer with the C descriptor backend and a fresh cache.
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let catalog = config.build_catalog()?;
        let defaults = config.profile_options()?;
        let cache = Arc::new(ArtifactCache::new(config.cache_capacity));
        tracing::info!(
            "analyzer created: {} boards, default {}, cache capacity {}",
            catalog.len(),
            catalog.default_board().name,
            config.cache_capacity,
        );
        Ok(Self {
            config,
            catalog,
            defaults,
            backend: Arc::new(CDescriptorBackend::new()),
            cache,
            current: Mutex::new(None),
        })
    }

    /// Replaces the compiler backend. Cached artifacts are dropped.
    pub fn with_backend(self, backend: Arc<dyn CompilerBackend>) -> Self {
        tracing::debug!("compiler backend set to '{}'", backend.name());
        self.cache.invalidate_all();
        Self { backend, ..self }
    }

    /// Uses a caller-owned cache, e.g. one shared between analyzers.
    pub fn with_cache(self, cache: Arc<ArtifactCache>) -> Self {
        Self { cache, ..self }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &BoardCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &Arc<ArtifactCache> {
        &self.cache
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    // ── Load ───────────────────────────────────────────────────

    /// Checks, loads and describes an upload.
    ///
    /// On success the model becomes the current model and the artifact
    /// cache is invalidated.
    pub fn load(&self, upload: &Upload) -> LoadReport {
        match self.extract(upload) {
            Ok(info) => {
                *self.current_model() = Some(Arc::new(info.clone()));
                self.cache.invalidate_all();
                LoadReport::ok(info)
            }
            Err(err) => {
                tracing::warn!("load of '{}' failed: {}", upload.model_filename, err);
                LoadReport::invalid(&err)
            }
        }
    }

    /// The most recently loaded model, if any.
    pub fn loaded_model(&self) -> Option<Arc<ModelInfo>> {
        self.current_model().clone()
    }

    fn current_model(&self) -> MutexGuard<'_, Option<Arc<ModelInfo>>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn extract(&self, upload: &Upload) -> Result<ModelInfo, AnalyzerError> {
        upload.check()?;
        let graph = GraphLoader::load(upload.model_bytes.clone(), upload.data.as_ref())?;
        let info = ModelInfo::from_graph(&graph);
        tracing::info!("extracted '{}': {}", upload.model_filename, info.summary());
        Ok(info)
    }

    // ── Profile ────────────────────────────────────────────────

    /// Loads an upload and profiles it against the requested board.
    pub fn profile(&self, upload: &Upload, request: &ProfileRequest) -> ProfileReport {
        let result = self
            .extract(upload)
            .and_then(|info| self.profile_info(&info, request));
        match result {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!("profile of '{}' failed: {}", upload.model_filename, err);
                ProfileReport::invalid(&err)
            }
        }
    }

    /// Profiles an already extracted model.
    pub fn profile_info(
        &self,
        info: &ModelInfo,
        request: &ProfileRequest,
    ) -> Result<ProfileReport, AnalyzerError> {
        let options = self.options_for(request)?;
        let (board, board_fell_back) = self.board_for(request);
        let profile = profiler::profile(info, board, &options);
        Ok(ProfileReport {
            valid: true,
            error: None,
            fault: None,
            profile: Some(profile),
            requested_board: request.board.clone(),
            board_fell_back,
        })
    }

    fn options_for(&self, request: &ProfileRequest) -> Result<ProfileOptions, AnalyzerError> {
        let conv_resolution = match request.input_resolution {
            Some(res) => ConvResolution::Explicit(res),
            None => self.defaults.conv_resolution,
        };
        Ok(ProfileOptions::new(
            request.quantized.unwrap_or(self.defaults.quantized),
            request.batch_size.unwrap_or(self.defaults.batch_size),
            conv_resolution,
        )?)
    }

    fn board_for(&self, request: &ProfileRequest) -> (&BoardBudget, bool) {
        match &request.board {
            Some(id) => self.catalog.resolve(id),
            None => (self.catalog.default_board(), false),
        }
    }

    // ── Compile ────────────────────────────────────────────────

    /// Compiles `info` for `target_chip`, reusing a cached artifact when
    /// the same request was compiled before.
    pub fn compile(
        &self,
        info: &ModelInfo,
        model_name: &str,
        target_chip: &str,
    ) -> Result<Arc<CompiledArtifact>, AnalyzerError> {
        let key = CacheKey::new(ModelDigest::of(info)?, target_chip, model_name);
        let digest = key.digest;
        let artifact = self.cache.get_or_try_insert(key, || {
            tracing::info!(
                "compiling '{}' ({}) for {} with {}",
                model_name,
                digest.short(),
                target_chip,
                self.backend.name(),
            );
            self.backend.compile(info, model_name, target_chip)
        })?;
        Ok(artifact)
    }

    /// Compiles the most recently loaded model.
    pub fn compile_loaded(
        &self,
        model_name: &str,
        target_chip: &str,
    ) -> Result<Arc<CompiledArtifact>, AnalyzerError> {
        let info = self.loaded_model().ok_or(AnalyzerError::NoModelLoaded)?;
        self.compile(&info, model_name, target_chip)
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .field("cache", &self.cache.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onnx_ir::fixtures::{cnn_model, dense_model};
    use onnx_ir::graph::OnnxGraph;

    fn info(model: onnx_ir::proto::ModelProto) -> ModelInfo {
        ModelInfo::from_graph(&OnnxGraph::new(model).validate().unwrap())
    }

    fn analyzer() -> Analyzer {
        Analyzer::new(AnalyzerConfig::default()).unwrap()
    }

    #[test]
    fn test_profile_info_defaults() {
        let report = analyzer()
            .profile_info(&info(dense_model(128, 10)), &ProfileRequest::default())
            .unwrap();
        assert!(report.valid);
        assert!(!report.board_fell_back);
        let p = report.profile.unwrap();
        assert_eq!(p.board_name, "STM32F401");
        assert_eq!(p.flash_used, 5120);
        assert_eq!(p.total_flops, 2560);
    }

    #[test]
    fn test_profile_info_overrides() {
        let request = ProfileRequest {
            board: Some("esp32".into()),
            quantized: Some(true),
            batch_size: Some(4),
            input_resolution: Some(Resolution::new(14, 14)),
        };
        let report = analyzer().profile_info(&info(cnn_model()), &request).unwrap();
        let p = report.profile.unwrap();
        assert_eq!(p.board_name, "ESP32");
        assert!(p.quantized);
        assert_eq!(p.batch_size, 4);
        assert_eq!(p.conv_resolution, Some(Resolution::new(14, 14)));
    }

    #[test]
    fn test_unknown_board_falls_back() {
        let request = ProfileRequest {
            board: Some("Z80".into()),
            ..Default::default()
        };
        let report = analyzer().profile_info(&info(cnn_model()), &request).unwrap();
        assert!(report.board_fell_back);
        assert_eq!(report.requested_board.as_deref(), Some("Z80"));
        assert_eq!(report.profile.unwrap().board_name, "STM32F401");
    }

    #[test]
    fn test_zero_batch_rejected() {
        let request = ProfileRequest {
            batch_size: Some(0),
            ..Default::default()
        };
        let err = analyzer()
            .profile_info(&info(cnn_model()), &request)
            .unwrap_err();
        assert_eq!(err.fault(), Fault::InputFormat);
    }

    #[test]
    fn test_compile_hits_cache() {
        let a = analyzer();
        let model = info(cnn_model());
        let first = a.compile(&model, "model", "STM32F401").unwrap();
        let second = a.compile(&model, "model", "STM32F401").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(a.cache().stats().hits, 1);
    }

    #[test]
    fn test_compile_error_propagates() {
        let err = analyzer()
            .compile(&info(cnn_model()), "not a name", "STM32F401")
            .unwrap_err();
        assert_eq!(err.fault(), Fault::Compilation);
    }

    #[test]
    fn test_compile_loaded_without_model() {
        let err = analyzer().compile_loaded("model", "ESP32").unwrap_err();
        assert!(matches!(err, AnalyzerError::NoModelLoaded));
    }

    #[test]
    fn test_poisoned_model_slot_is_recovered() {
        let a = analyzer();
        let upload = Upload::new("dense.onnx", prost::Message::encode_to_vec(&dense_model(4, 2)));
        assert!(a.load(&upload).valid);

        let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = a.current.lock().unwrap();
            panic!("poison the model slot");
        }));
        assert!(caught.is_err());
        assert!(a.current.is_poisoned());

        assert_eq!(a.loaded_model().unwrap().total_parameters, 4 * 2);
        let cnn = Upload::new("cnn.onnx", prost::Message::encode_to_vec(&cnn_model()));
        assert!(a.load(&cnn).valid);
        assert_eq!(a.loaded_model().unwrap().total_parameters, info(cnn_model()).total_parameters);
        assert!(a.compile_loaded("model", "ESP32").is_ok());
    }
}
