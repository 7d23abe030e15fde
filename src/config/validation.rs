//! Configuration validation
//!
//! Maps a parsed [`RawDocument`] onto the typed [`PipelineConfig`]. Every
//! enum field is checked against its option set, every numeric field against
//! its range, and metrics and algorithm against the declared task.
//!
//! Validation collects ALL errors and warnings (it does not stop at the first
//! one) in document order. [`validate`] is the fail-fast entry point and
//! returns the first error.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_yaml::{Mapping, Number, Value};

use crate::config::loader::RawDocument;
use crate::config::schema::{
    Algorithm, CategoricalFeatures, CategoricalImputation, CategoricalPreprocessing,
    CategoricalSelection, ColumnSpec, ColumnType, Components, DEFAULT_DATA_PATH,
    DEFAULT_MAX_FEATURES, DEFAULT_OUTPUT_DIR, DEFAULT_RANDOM_STATE, DEFAULT_TEST_SIZE,
    DatasetConfig, DatasetType, Encoding, EvaluationConfig, FeatureEngineeringConfig,
    Hyperparameter, Metric, ModelConfig, NumericFeatures, NumericImputation,
    NumericPreprocessing, NumericSelection, OptionSet, PipelineConfig, PreprocessingConfig,
    Scaling, TaskType, TextFeatures, TextPreprocessing, Vectorization,
};
use crate::error::{ConfigError, ValidationIssue};

/// Keys accepted at the document root.
const ROOT_KEYS: &[&str] = &[
    "dataset",
    "preprocessing",
    "feature_engineering",
    "model",
    "evaluation",
    "data_path",
    "output_dir",
];

/// Hyperparameters that count something and must be positive integers.
const COUNT_HYPERPARAMETERS: &[&str] = &[
    "n_estimators",
    "max_depth",
    "min_samples_split",
    "min_samples_leaf",
    "n_neighbors",
    "max_iter",
];

/// Hyperparameters that must be strictly positive.
const POSITIVE_HYPERPARAMETERS: &[&str] = &["learning_rate", "C"];

/// Maximum edit distance for "did you mean" suggestions.
const MAX_SUGGESTION_DISTANCE: usize = 3;

// ============================================================================
// Public API
// ============================================================================

/// Validates a parsed document, failing with the first error found.
///
/// # Errors
///
/// Returns the first [`ConfigError`] in document order.
pub fn validate(document: &RawDocument) -> Result<PipelineConfig, ConfigError> {
    Validator::new().validate(document).into_config()
}

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// The typed configuration; `None` whenever `errors` is non-empty.
    pub config: Option<PipelineConfig>,

    /// Validation errors (prevent loading).
    pub errors: Vec<ConfigError>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts into the typed configuration or the first error.
    ///
    /// # Errors
    ///
    /// Returns the first collected error.
    pub fn into_config(self) -> Result<PipelineConfig, ConfigError> {
        match (self.errors.into_iter().next(), self.config) {
            (Some(err), _) => Err(err),
            (None, Some(config)) => Ok(config),
            (None, None) => Err(ConfigError::ParseError {
                line: None,
                message: "document did not produce a configuration".to_string(),
            }),
        }
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ConfigError>,
    warnings: Vec<ValidationIssue>,
}

/// A mapping inside the document together with its dotted path.
struct Section<'a> {
    path: String,
    map: &'a Mapping,
}

impl<'a> Section<'a> {
    const fn root(map: &'a Mapping) -> Self {
        Self {
            path: String::new(),
            map,
        }
    }

    fn field(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    /// Value under `key`; an explicit `null` counts as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a document and returns every error and warning.
    pub fn validate(&mut self, document: &RawDocument) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        let root = Section::root(document.root());
        self.warn_unknown_keys(&root, ROOT_KEYS);

        let dataset = self.validate_dataset(&root);
        let preprocessing = self.validate_preprocessing(&root);
        let feature_engineering = self.validate_feature_engineering(&root);
        let (task, model) = self.validate_model(&root);
        let evaluation = self.validate_evaluation(&root, task);
        let data_path = self.optional_path(&root, "data_path", DEFAULT_DATA_PATH);
        let output_dir = self.optional_path(&root, "output_dir", DEFAULT_OUTPUT_DIR);

        if let Some(dataset) = &dataset {
            self.check_dataset_coherence(dataset);
        }

        // Sections are checked in dependency order (the task before the
        // metrics); report in the order a reader meets the fields.
        let mapping = document.root();
        self.errors.sort_by_cached_key(|e| {
            e.field()
                .map(|field| document_position(mapping, field))
                .unwrap_or_default()
        });
        self.warnings
            .sort_by_cached_key(|w| document_position(mapping, &w.path));

        let config = match (
            dataset,
            preprocessing,
            feature_engineering,
            model,
            evaluation,
            data_path,
            output_dir,
        ) {
            (
                Some(dataset),
                Some(preprocessing),
                Some(feature_engineering),
                Some(model),
                Some(evaluation),
                Some(data_path),
                Some(output_dir),
            ) if self.errors.is_empty() => Some(PipelineConfig {
                dataset,
                preprocessing,
                feature_engineering,
                model,
                evaluation,
                data_path,
                output_dir,
            }),
            _ => None,
        };

        ValidationResult {
            config,
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Dataset
    // ========================================================================

    fn validate_dataset(&mut self, root: &Section<'_>) -> Option<DatasetConfig> {
        let section = self.section(root, "dataset")?;
        self.warn_unknown_keys(
            &section,
            &["type", "input_columns", "test_size", "random_state"],
        );

        let kind = self.required_option::<DatasetType>(&section, "type");
        let input_columns = self.validate_columns(&section);

        let test_size = match section.get("test_size") {
            None => Some(DEFAULT_TEST_SIZE),
            Some(value) => self.open_fraction(&section.field("test_size"), value),
        };
        let random_state = match section.get("random_state") {
            None => Some(DEFAULT_RANDOM_STATE),
            Some(value) => self.non_negative_integer(&section.field("random_state"), value),
        };

        Some(DatasetConfig {
            kind: kind?,
            input_columns: input_columns?,
            test_size: test_size?,
            random_state: random_state?,
        })
    }

    fn validate_columns(&mut self, dataset: &Section<'_>) -> Option<Vec<ColumnSpec>> {
        let field = dataset.field("input_columns");
        let items = self.sequence(dataset, "input_columns")?;
        if items.is_empty() {
            self.errors.push(ConfigError::InvalidRange {
                field,
                value: "[]".to_string(),
                constraint: "at least one input column".to_string(),
            });
            return None;
        }

        let mut columns = Vec::with_capacity(items.len());
        let mut seen = HashSet::new();
        let mut complete = true;

        for (idx, item) in items.iter().enumerate() {
            let item_path = format!("{field}[{idx}]");
            let Value::Mapping(map) = item else {
                self.errors.push(ConfigError::InvalidType {
                    field: item_path,
                    expected: "mapping",
                    found: value_kind(item),
                });
                complete = false;
                continue;
            };
            let column = Section {
                path: item_path,
                map,
            };
            self.warn_unknown_keys(&column, &["name", "type"]);

            let name = self.required_string(&column, "name");
            let kind = self.required_option::<ColumnType>(&column, "type");

            if let Some(name) = &name {
                if !seen.insert(name.clone()) {
                    self.errors.push(ConfigError::DuplicateColumn {
                        field: column.field("name"),
                        name: name.clone(),
                    });
                }
            }

            match (name, kind) {
                (Some(name), Some(kind)) => columns.push(ColumnSpec { name, kind }),
                _ => complete = false,
            }
        }

        complete.then_some(columns)
    }

    fn check_dataset_coherence(&mut self, dataset: &DatasetConfig) {
        let has_text = dataset
            .input_columns
            .iter()
            .any(|c| c.kind == ColumnType::Text);
        if dataset.kind == DatasetType::Text && !has_text {
            self.add_warning(
                "dataset.type",
                "dataset type is 'text' but no input column has type 'text'",
            );
        }
    }

    // ========================================================================
    // Preprocessing
    // ========================================================================

    fn validate_preprocessing(&mut self, root: &Section<'_>) -> Option<PreprocessingConfig> {
        let section = self.section(root, "preprocessing")?;
        self.warn_unknown_keys(&section, &["text", "numeric", "categorical"]);

        let text = self.validate_text_preprocessing(&section);
        let numeric = self.validate_numeric_preprocessing(&section);
        let categorical = self.validate_categorical_preprocessing(&section);

        Some(PreprocessingConfig {
            text: text?,
            numeric: numeric?,
            categorical: categorical?,
        })
    }

    fn validate_text_preprocessing(&mut self, parent: &Section<'_>) -> Option<TextPreprocessing> {
        let section = self.section(parent, "text")?;
        self.warn_unknown_keys(
            &section,
            &[
                "lowercase",
                "remove_punctuation",
                "remove_stopwords",
                "stemming",
            ],
        );

        let lowercase = self.required_bool(&section, "lowercase");
        let remove_punctuation = self.required_bool(&section, "remove_punctuation");
        let remove_stopwords = self.required_bool(&section, "remove_stopwords");
        let stemming = self.required_bool(&section, "stemming");

        Some(TextPreprocessing {
            lowercase: lowercase?,
            remove_punctuation: remove_punctuation?,
            remove_stopwords: remove_stopwords?,
            stemming: stemming?,
        })
    }

    fn validate_numeric_preprocessing(
        &mut self,
        parent: &Section<'_>,
    ) -> Option<NumericPreprocessing> {
        let section = self.section(parent, "numeric")?;
        self.warn_unknown_keys(&section, &["scaling", "handle_missing"]);

        let scaling = self.required_option::<Scaling>(&section, "scaling");
        let handle_missing = self.required_option::<NumericImputation>(&section, "handle_missing");

        Some(NumericPreprocessing {
            scaling: scaling?,
            handle_missing: handle_missing?,
        })
    }

    fn validate_categorical_preprocessing(
        &mut self,
        parent: &Section<'_>,
    ) -> Option<CategoricalPreprocessing> {
        let section = self.section(parent, "categorical")?;
        self.warn_unknown_keys(&section, &["encoding", "handle_missing"]);

        let encoding = self.required_option::<Encoding>(&section, "encoding");
        let handle_missing =
            self.required_option::<CategoricalImputation>(&section, "handle_missing");

        Some(CategoricalPreprocessing {
            encoding: encoding?,
            handle_missing: handle_missing?,
        })
    }

    // ========================================================================
    // Feature Engineering
    // ========================================================================

    fn validate_feature_engineering(
        &mut self,
        root: &Section<'_>,
    ) -> Option<FeatureEngineeringConfig> {
        let section = self.section(root, "feature_engineering")?;
        self.warn_unknown_keys(&section, &["text", "numeric", "categorical"]);

        let text = self.validate_text_features(&section);
        let numeric = self.validate_numeric_features(&section);
        let categorical = self.validate_categorical_features(&section);

        Some(FeatureEngineeringConfig {
            text: text?,
            numeric: numeric?,
            categorical: categorical?,
        })
    }

    fn validate_text_features(&mut self, parent: &Section<'_>) -> Option<TextFeatures> {
        let section = self.section(parent, "text")?;
        self.warn_unknown_keys(&section, &["vectorization", "max_features"]);

        let vectorization = self.required_option::<Vectorization>(&section, "vectorization");
        let max_features = match section.get("max_features") {
            None => Some(DEFAULT_MAX_FEATURES),
            Some(value) => self.positive_integer(&section.field("max_features"), value),
        };

        Some(TextFeatures {
            vectorization: vectorization?,
            max_features: max_features?,
        })
    }

    fn validate_numeric_features(&mut self, parent: &Section<'_>) -> Option<NumericFeatures> {
        let section = self.section(parent, "numeric")?;
        self.warn_unknown_keys(&section, &["feature_selection", "n_components"]);

        let feature_selection =
            self.required_option::<NumericSelection>(&section, "feature_selection");
        let components_field = section.field("n_components");
        let raw_components = section.get("n_components");
        let n_components = raw_components.and_then(|v| self.components(&components_field, v));

        match (feature_selection, raw_components, n_components) {
            (Some(NumericSelection::Pca | NumericSelection::SelectKBest), None, _) => {
                self.errors.push(ConfigError::MissingField {
                    field: components_field,
                });
                return None;
            }
            (Some(NumericSelection::SelectKBest), _, Some(Components::Fraction(f))) => {
                self.errors.push(ConfigError::InvalidRange {
                    field: components_field,
                    value: format!("{f:?}"),
                    constraint: "a positive integer count when feature_selection is \
                                 'select_k_best'"
                        .to_string(),
                });
                return None;
            }
            (Some(NumericSelection::None), Some(_), _) => {
                self.add_warning(
                    &components_field,
                    "n_components is ignored when feature_selection is 'none'",
                );
            }
            _ => {}
        }

        // An n_components that was present but invalid has already been reported.
        if raw_components.is_some() && n_components.is_none() {
            return None;
        }

        Some(NumericFeatures {
            feature_selection: feature_selection?,
            n_components,
        })
    }

    fn validate_categorical_features(
        &mut self,
        parent: &Section<'_>,
    ) -> Option<CategoricalFeatures> {
        let section = self.section(parent, "categorical")?;
        self.warn_unknown_keys(&section, &["feature_selection"]);

        let feature_selection =
            self.required_option::<CategoricalSelection>(&section, "feature_selection");

        Some(CategoricalFeatures {
            feature_selection: feature_selection?,
        })
    }

    // ========================================================================
    // Model & Evaluation
    // ========================================================================

    fn validate_model(&mut self, root: &Section<'_>) -> (Option<TaskType>, Option<ModelConfig>) {
        let Some(section) = self.section(root, "model") else {
            return (None, None);
        };
        self.warn_unknown_keys(&section, &["type", "algorithm", "hyperparameters"]);

        let task = self.required_option::<TaskType>(&section, "type");
        let algorithm = self.required_option::<Algorithm>(&section, "algorithm");

        if let (Some(task), Some(algorithm)) = (task, algorithm) {
            if !algorithm.supports(task) {
                self.errors
                    .push(ConfigError::IncompatibleAlgorithm { algorithm, task });
            }
        }

        let hyperparameters = self.validate_hyperparameters(&section);

        let model = match (task, algorithm, hyperparameters) {
            (Some(task), Some(algorithm), Some(hyperparameters)) => Some(ModelConfig {
                task,
                algorithm,
                hyperparameters,
            }),
            _ => None,
        };
        (task, model)
    }

    fn validate_hyperparameters(
        &mut self,
        model: &Section<'_>,
    ) -> Option<IndexMap<String, Hyperparameter>> {
        let field = model.field("hyperparameters");
        let Some(value) = model.get("hyperparameters") else {
            self.add_warning(&field, "no hyperparameters declared; library defaults apply");
            return Some(IndexMap::new());
        };
        let Value::Mapping(map) = value else {
            self.errors.push(ConfigError::InvalidType {
                field,
                expected: "mapping",
                found: value_kind(value),
            });
            return None;
        };
        if map.is_empty() {
            self.add_warning(&field, "no hyperparameters declared; library defaults apply");
        }

        let mut hyperparameters = IndexMap::with_capacity(map.len());
        let mut complete = true;

        for (key, value) in map {
            let Value::String(name) = key else {
                self.errors.push(ConfigError::InvalidType {
                    field: field.clone(),
                    expected: "string keys",
                    found: value_kind(key),
                });
                complete = false;
                continue;
            };
            let param_field = format!("{field}.{name}");
            match self.hyperparameter(&param_field, name, value) {
                Some(param) => {
                    hyperparameters.insert(name.clone(), param);
                }
                None => complete = false,
            }
        }

        complete.then_some(hyperparameters)
    }

    fn hyperparameter(&mut self, field: &str, name: &str, value: &Value) -> Option<Hyperparameter> {
        let Value::Number(number) = value else {
            self.errors.push(ConfigError::InvalidType {
                field: field.to_string(),
                expected: "number",
                found: value_kind(value),
            });
            return None;
        };

        let param = if let Some(i) = number.as_i64() {
            Hyperparameter::Int(i)
        } else if number.is_u64() {
            self.range_error(field, number, "a 64-bit signed integer");
            return None;
        } else {
            match number.as_f64() {
                Some(f) if f.is_finite() => Hyperparameter::Float(f),
                _ => {
                    self.range_error(field, number, "a finite number");
                    return None;
                }
            }
        };

        if COUNT_HYPERPARAMETERS.contains(&name) && !param.as_i64().is_some_and(|i| i > 0) {
            self.range_error(field, number, "a positive integer");
            return None;
        }
        if POSITIVE_HYPERPARAMETERS.contains(&name) && param.as_f64() <= 0.0 {
            self.range_error(field, number, "a positive number");
            return None;
        }

        Some(param)
    }

    fn validate_evaluation(
        &mut self,
        root: &Section<'_>,
        task: Option<TaskType>,
    ) -> Option<EvaluationConfig> {
        let section = self.section(root, "evaluation")?;
        self.warn_unknown_keys(&section, &["metrics"]);

        let field = section.field("metrics");
        let items = self.sequence(&section, "metrics")?;
        if items.is_empty() {
            self.errors.push(ConfigError::InvalidRange {
                field,
                value: "[]".to_string(),
                constraint: "at least one metric".to_string(),
            });
            return None;
        }

        let allowed: Vec<&'static str> = task.map_or_else(Metric::allowed_names, |t| {
            Metric::for_task(t).into_iter().map(Metric::as_str).collect()
        });

        let mut metrics = Vec::with_capacity(items.len());
        let mut seen = HashSet::new();
        let mut complete = true;

        for (idx, item) in items.iter().enumerate() {
            let item_path = format!("{field}[{idx}]");
            let Value::String(name) = item else {
                self.errors.push(ConfigError::InvalidType {
                    field: item_path,
                    expected: "string",
                    found: value_kind(item),
                });
                complete = false;
                continue;
            };
            let Some(metric) = Metric::parse_option(name) else {
                self.invalid_option(item_path, name, allowed.clone());
                complete = false;
                continue;
            };
            if let Some(task) = task {
                if metric.task() != task {
                    self.errors.push(ConfigError::IncompatibleMetric {
                        field: item_path,
                        metric,
                        task,
                    });
                    complete = false;
                    continue;
                }
            }
            if !seen.insert(metric) {
                self.add_warning(&item_path, &format!("duplicate metric '{metric}'"));
            }
            metrics.push(metric);
        }

        complete.then_some(EvaluationConfig { metrics })
    }

    // ========================================================================
    // Field Readers
    // ========================================================================

    /// Reads a required nested mapping.
    fn section<'a>(&mut self, parent: &Section<'a>, key: &str) -> Option<Section<'a>> {
        let field = parent.field(key);
        match parent.get(key) {
            None => {
                self.errors.push(ConfigError::MissingField { field });
                None
            }
            Some(Value::Mapping(map)) => Some(Section { path: field, map }),
            Some(other) => {
                self.errors.push(ConfigError::InvalidType {
                    field,
                    expected: "mapping",
                    found: value_kind(other),
                });
                None
            }
        }
    }

    /// Reads a required sequence.
    fn sequence<'a>(&mut self, parent: &Section<'a>, key: &str) -> Option<&'a [Value]> {
        let field = parent.field(key);
        match parent.get(key) {
            None => {
                self.errors.push(ConfigError::MissingField { field });
                None
            }
            Some(Value::Sequence(items)) => Some(items),
            Some(other) => {
                self.errors.push(ConfigError::InvalidType {
                    field,
                    expected: "sequence",
                    found: value_kind(other),
                });
                None
            }
        }
    }

    fn required_bool(&mut self, section: &Section<'_>, key: &str) -> Option<bool> {
        let field = section.field(key);
        match section.get(key) {
            None => {
                self.errors.push(ConfigError::MissingField { field });
                None
            }
            Some(Value::Bool(b)) => Some(*b),
            Some(other) => {
                self.errors.push(ConfigError::InvalidType {
                    field,
                    expected: "boolean",
                    found: value_kind(other),
                });
                None
            }
        }
    }

    fn required_string(&mut self, section: &Section<'_>, key: &str) -> Option<String> {
        let field = section.field(key);
        match section.get(key) {
            None => {
                self.errors.push(ConfigError::MissingField { field });
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.errors.push(ConfigError::InvalidRange {
                    field,
                    value: format!("'{s}'"),
                    constraint: "a non-empty string".to_string(),
                });
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.errors.push(ConfigError::InvalidType {
                    field,
                    expected: "string",
                    found: value_kind(other),
                });
                None
            }
        }
    }

    fn optional_path(&mut self, section: &Section<'_>, key: &str, default: &str) -> Option<String> {
        if section.get(key).is_none() {
            return Some(default.to_string());
        }
        self.required_string(section, key)
    }

    fn required_option<T: OptionSet>(&mut self, section: &Section<'_>, key: &str) -> Option<T> {
        let field = section.field(key);
        match section.get(key) {
            None => {
                self.errors.push(ConfigError::MissingField { field });
                None
            }
            Some(Value::String(text)) => {
                let parsed = T::parse_option(text);
                if parsed.is_none() {
                    self.invalid_option(field, text, T::allowed_names());
                }
                parsed
            }
            Some(other) => {
                self.errors.push(ConfigError::InvalidType {
                    field,
                    expected: "string",
                    found: value_kind(other),
                });
                None
            }
        }
    }

    fn positive_integer(&mut self, field: &str, value: &Value) -> Option<u64> {
        let number = self.number(field, value, "integer")?;
        match number.as_u64() {
            Some(n) if n > 0 => Some(n),
            _ => {
                self.range_error(field, number, "a positive integer");
                None
            }
        }
    }

    fn non_negative_integer(&mut self, field: &str, value: &Value) -> Option<u64> {
        let number = self.number(field, value, "integer")?;
        let parsed = number.as_u64();
        if parsed.is_none() {
            self.range_error(field, number, "a non-negative integer");
        }
        parsed
    }

    /// Reads a fraction in the open interval `(0, 1)`.
    fn open_fraction(&mut self, field: &str, value: &Value) -> Option<f64> {
        let number = self.number(field, value, "number")?;
        match number.as_f64() {
            Some(f) if f > 0.0 && f < 1.0 => Some(f),
            _ => {
                self.range_error(field, number, "a fraction in (0, 1)");
                None
            }
        }
    }

    /// Reads `n_components`: a YAML float in `(0, 1]` or a YAML integer > 0.
    fn components(&mut self, field: &str, value: &Value) -> Option<Components> {
        const CONSTRAINT: &str = "a fraction in (0, 1] or a positive integer count";

        let number = self.number(field, value, "number")?;
        let parsed = if number.is_f64() {
            number
                .as_f64()
                .filter(|f| *f > 0.0 && *f <= 1.0)
                .map(Components::Fraction)
        } else {
            number.as_u64().filter(|n| *n > 0).map(Components::Count)
        };
        if parsed.is_none() {
            self.range_error(field, number, CONSTRAINT);
        }
        parsed
    }

    fn number<'v>(
        &mut self,
        field: &str,
        value: &'v Value,
        expected: &'static str,
    ) -> Option<&'v Number> {
        if let Value::Number(number) = value {
            Some(number)
        } else {
            self.errors.push(ConfigError::InvalidType {
                field: field.to_string(),
                expected,
                found: value_kind(value),
            });
            None
        }
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    fn invalid_option(&mut self, field: String, value: &str, allowed: Vec<&'static str>) {
        let suggestion = suggest(value, &allowed);
        self.errors.push(ConfigError::InvalidOption {
            field,
            value: value.to_string(),
            allowed,
            suggestion,
        });
    }

    fn range_error(&mut self, field: &str, number: &Number, constraint: &str) {
        self.errors.push(ConfigError::InvalidRange {
            field: field.to_string(),
            value: number.to_string(),
            constraint: constraint.to_string(),
        });
    }

    fn warn_unknown_keys(&mut self, section: &Section<'_>, known: &[&str]) {
        for key in section.map.keys() {
            match key.as_str() {
                Some(name) if known.contains(&name) => {}
                Some(name) => {
                    let suggestion = suggest(name, known)
                        .map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"));
                    self.add_warning(
                        &section.field(name),
                        &format!("unknown key '{name}' is ignored{suggestion}"),
                    );
                }
                None => {
                    let path = if section.path.is_empty() {
                        "<root>"
                    } else {
                        section.path.as_str()
                    };
                    self.add_warning(
                        path,
                        &format!("non-string key of type {} is ignored", value_kind(key)),
                    );
                }
            }
        }
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
        });
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Suggests the closest allowed value for typo correction.
///
/// Returns the closest match if its Damerau-Levenshtein distance is ≤ 3.
fn suggest(input: &str, allowed: &[&str]) -> Option<String> {
    allowed
        .iter()
        .map(|candidate| (candidate, strsim::damerau_levenshtein(input, candidate)))
        .filter(|(_, dist)| *dist <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(_, dist)| *dist)
        .map(|(candidate, _)| (*candidate).to_string())
}

/// Position of a dotted field path (`dataset.input_columns[1].name`) in
/// the document: the index of each key within its mapping and of each
/// sequence item. A key the document lacks sorts after its siblings.
fn document_position(root: &Mapping, path: &str) -> Vec<usize> {
    let mut position = Vec::new();
    let mut map = root;

    for segment in path.split('.') {
        let (key, indices) = segment.split_once('[').unwrap_or((segment, ""));
        let Some((idx, (_, value))) = map
            .iter()
            .enumerate()
            .find(|(_, (k, _))| k.as_str() == Some(key))
        else {
            position.push(map.len());
            break;
        };
        position.push(idx);

        let mut node = value;
        for index in indices.split('[') {
            let Ok(i) = index.trim_end_matches(']').parse::<usize>() else {
                continue;
            };
            position.push(i);
            match node {
                Value::Sequence(items) => match items.get(i) {
                    Some(item) => node = item,
                    None => return position,
                },
                _ => return position,
            }
        }

        match node {
            Value::Mapping(next) => map = next,
            _ => break,
        }
    }

    position
}

/// Human-readable YAML type name.
const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse;

    const REFERENCE: &str = include_str!("../../config.yaml");

    fn check(yaml: &str) -> ValidationResult {
        let document = parse(yaml).expect("test document should parse");
        Validator::new().validate(&document)
    }

    fn first_error(yaml: &str) -> ConfigError {
        let result = check(yaml);
        assert!(result.config.is_none());
        result
            .errors
            .into_iter()
            .next()
            .expect("expected at least one error")
    }

    fn reference_with(from: &str, to: &str) -> String {
        assert!(REFERENCE.contains(from), "reference lacks {from:?}");
        REFERENCE.replacen(from, to, 1)
    }

    #[test]
    fn test_reference_document_is_valid() {
        let result = check(REFERENCE);
        assert!(result.is_valid(), "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);

        let config = result.config.unwrap();
        assert_eq!(config.dataset.kind, DatasetType::Tabular);
        assert_eq!(config.dataset.input_columns.len(), 3);
        assert_eq!(config.preprocessing.numeric.scaling, Scaling::Standard);
        assert_eq!(
            config.feature_engineering.numeric.n_components,
            Some(Components::Fraction(0.95))
        );
        assert_eq!(config.model.algorithm, Algorithm::RandomForest);
        assert_eq!(
            config.model.hyperparameters.get("n_estimators"),
            Some(&Hyperparameter::Int(30))
        );
    }

    #[test]
    fn test_defaults_fill_optional_numbers() {
        let config = check(REFERENCE).config.unwrap();
        assert!((config.dataset.test_size - DEFAULT_TEST_SIZE).abs() < f64::EPSILON);
        assert_eq!(config.dataset.random_state, DEFAULT_RANDOM_STATE);
        assert_eq!(config.data_path, DEFAULT_DATA_PATH);
        assert_eq!(config.output_dir, DEFAULT_OUTPUT_DIR);

        let yaml = reference_with("    max_features: 5000\n", "");
        let config = check(&yaml).config.unwrap();
        assert_eq!(
            config.feature_engineering.text.max_features,
            DEFAULT_MAX_FEATURES
        );
    }

    #[test]
    fn test_invalid_scaling_option() {
        let err = first_error(&reference_with(
            "scaling: \"standard\"",
            "scaling: \"zscore\"",
        ));
        match err {
            ConfigError::InvalidOption {
                field,
                value,
                allowed,
                ..
            } => {
                assert_eq!(field, "preprocessing.numeric.scaling");
                assert_eq!(value, "zscore");
                assert_eq!(allowed, vec!["standard", "minmax", "robust"]);
            }
            other => panic!("expected InvalidOption, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_option_suggests_typo_fix() {
        let err = first_error(&reference_with(
            "vectorization: \"tfidf\"",
            "vectorization: \"tf-idf\"",
        ));
        match err {
            ConfigError::InvalidOption { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("tfidf"));
            }
            other => panic!("expected InvalidOption, got {other:?}"),
        }
    }

    #[test]
    fn test_option_with_wrong_type() {
        let err = first_error(&reference_with(
            "encoding: \"label\"",
            "encoding: 3",
        ));
        assert_eq!(
            err,
            ConfigError::InvalidType {
                field: "preprocessing.categorical.encoding".to_string(),
                expected: "string",
                found: "number",
            }
        );
    }

    #[test]
    fn test_regression_rejects_accuracy() {
        let err = first_error(&reference_with(
            "type: \"classification\"",
            "type: \"regression\"",
        ));
        assert_eq!(
            err,
            ConfigError::IncompatibleMetric {
                field: "evaluation.metrics[0]".to_string(),
                metric: Metric::Accuracy,
                task: TaskType::Regression,
            }
        );
    }

    #[test]
    fn test_regression_reports_every_classification_metric() {
        let result = check(&reference_with(
            "type: \"classification\"",
            "type: \"regression\"",
        ));
        let incompatible = result
            .errors
            .iter()
            .filter(|e| matches!(e, ConfigError::IncompatibleMetric { .. }))
            .count();
        assert_eq!(incompatible, 4);
    }

    #[test]
    fn test_classification_rejects_regression_metric() {
        let err = first_error(&reference_with(
            "metrics: [\"accuracy\", \"precision\", \"recall\", \"f1\"]",
            "metrics: [\"accuracy\", \"rmse\"]",
        ));
        assert!(matches!(
            err,
            ConfigError::IncompatibleMetric {
                metric: Metric::Rmse,
                task: TaskType::Classification,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_metric_lists_task_metrics() {
        let yaml = reference_with("type: \"classification\"", "type: \"regression\"").replacen(
            "metrics: [\"accuracy\", \"precision\", \"recall\", \"f1\"]",
            "metrics: [\"msle\"]",
            1,
        );
        match first_error(&yaml) {
            ConfigError::InvalidOption {
                field,
                allowed,
                suggestion,
                ..
            } => {
                assert_eq!(field, "evaluation.metrics[0]");
                assert_eq!(allowed, vec!["mse", "rmse", "mae", "r2"]);
                assert_eq!(suggestion.as_deref(), Some("mse"));
            }
            other => panic!("expected InvalidOption, got {other:?}"),
        }
    }

    #[test]
    fn test_n_components_out_of_range() {
        let err = first_error(&reference_with("n_components: 0.95", "n_components: 1.5"));
        match err {
            ConfigError::InvalidRange { field, value, .. } => {
                assert_eq!(field, "feature_engineering.numeric.n_components");
                assert_eq!(value, "1.5");
            }
            other => panic!("expected InvalidRange, got {other:?}"),
        }
    }

    #[test]
    fn test_n_components_integer_count() {
        let config = check(&reference_with("n_components: 0.95", "n_components: 12"))
            .config
            .unwrap();
        assert_eq!(
            config.feature_engineering.numeric.n_components,
            Some(Components::Count(12))
        );
    }

    #[test]
    fn test_n_components_boundaries() {
        let one = check(&reference_with("n_components: 0.95", "n_components: 1.0"));
        assert_eq!(
            one.config.unwrap().feature_engineering.numeric.n_components,
            Some(Components::Fraction(1.0))
        );

        for bad in ["0", "0.0", "-3", "-0.5", "2.0", ".nan", "\"all\""] {
            let result = check(&reference_with(
                "n_components: 0.95",
                &format!("n_components: {bad}"),
            ));
            assert!(result.has_errors(), "n_components: {bad} should fail");
        }
    }

    #[test]
    fn test_pca_requires_n_components() {
        let err = first_error(&reference_with("    n_components: 0.95  # Keep components explaining 95% of variance\n", ""));
        assert_eq!(
            err,
            ConfigError::MissingField {
                field: "feature_engineering.numeric.n_components".to_string(),
            }
        );
    }

    #[test]
    fn test_select_k_best_rejects_fraction() {
        let err = first_error(&reference_with(
            "feature_selection: \"pca\"",
            "feature_selection: \"select_k_best\"",
        ));
        assert!(matches!(err, ConfigError::InvalidRange { .. }));

        let yaml = reference_with("feature_selection: \"pca\"", "feature_selection: \"select_k_best\"")
            .replacen("n_components: 0.95", "n_components: 8", 1);
        assert!(check(&yaml).is_valid());
    }

    #[test]
    fn test_selection_none_ignores_but_validates_components() {
        let yaml = reference_with("feature_selection: \"pca\"", "feature_selection: \"none\"");
        let result = check(&yaml);
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(
            result.warnings[0].path,
            "feature_engineering.numeric.n_components"
        );

        let yaml = yaml.replacen("n_components: 0.95", "n_components: 1.5", 1);
        assert!(matches!(
            first_error(&yaml),
            ConfigError::InvalidRange { .. }
        ));
    }

    #[test]
    fn test_max_features_must_be_positive_integer() {
        for bad in ["0", "-10", "10.5"] {
            let err = first_error(&reference_with(
                "max_features: 5000",
                &format!("max_features: {bad}"),
            ));
            assert!(
                matches!(err, ConfigError::InvalidRange { ref field, .. } if field == "feature_engineering.text.max_features"),
                "max_features: {bad} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_missing_section() {
        let yaml = REFERENCE
            .split("# Evaluation configuration")
            .next()
            .unwrap()
            .to_string();
        assert_eq!(
            first_error(&yaml),
            ConfigError::MissingField {
                field: "evaluation".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_text_flag() {
        let err = first_error(&reference_with("    stemming: false\n", ""));
        assert_eq!(
            err,
            ConfigError::MissingField {
                field: "preprocessing.text.stemming".to_string(),
            }
        );
    }

    #[test]
    fn test_text_flag_type() {
        let err = first_error(&reference_with("lowercase: true", "lowercase: \"yes\""));
        assert!(matches!(
            err,
            ConfigError::InvalidType {
                expected: "boolean",
                found: "string",
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_column_name() {
        let err = first_error(&reference_with(
            "name: \"price\"",
            "name: \"review_text\"",
        ));
        assert_eq!(
            err,
            ConfigError::DuplicateColumn {
                field: "dataset.input_columns[1].name".to_string(),
                name: "review_text".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_column_type() {
        let err = first_error(&reference_with("type: \"numeric\"", "type: \"float\""));
        assert!(matches!(
            err,
            ConfigError::InvalidOption { ref field, .. } if field == "dataset.input_columns[1].type"
        ));
    }

    #[test]
    fn test_empty_metrics_rejected() {
        let err = first_error(&reference_with(
            "metrics: [\"accuracy\", \"precision\", \"recall\", \"f1\"]",
            "metrics: []",
        ));
        assert!(matches!(err, ConfigError::InvalidRange { .. }));
    }

    #[test]
    fn test_duplicate_metric_warns() {
        let result = check(&reference_with(
            "metrics: [\"accuracy\", \"precision\", \"recall\", \"f1\"]",
            "metrics: [\"accuracy\", \"f1\", \"accuracy\"]",
        ));
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "evaluation.metrics[2]");
        assert_eq!(
            result.config.unwrap().evaluation.metrics,
            vec![Metric::Accuracy, Metric::F1, Metric::Accuracy]
        );
    }

    #[test]
    fn test_incompatible_algorithm() {
        let yaml = reference_with("algorithm: \"random_forest\"", "algorithm: \"linear_regression\"");
        assert_eq!(
            first_error(&yaml),
            ConfigError::IncompatibleAlgorithm {
                algorithm: Algorithm::LinearRegression,
                task: TaskType::Classification,
            }
        );
    }

    #[test]
    fn test_hyperparameter_rules() {
        let bad = [
            "n_estimators: 0",
            "n_estimators: 30.0",
            "n_estimators: \"30\"",
            "n_estimators: .inf",
        ];
        for line in bad {
            let result = check(&reference_with("n_estimators: 30", line));
            assert!(result.has_errors(), "{line} should fail");
        }

        let yaml = reference_with(
            "n_estimators: 30",
            "n_estimators: 30\n    learning_rate: 0.05\n    max_depth: 6",
        );
        let config = check(&yaml).config.unwrap();
        let params: Vec<_> = config.model.hyperparameters.keys().cloned().collect();
        assert_eq!(params, vec!["n_estimators", "learning_rate", "max_depth"]);
        assert_eq!(
            config.model.hyperparameters["learning_rate"],
            Hyperparameter::Float(0.05)
        );

        let yaml = reference_with("n_estimators: 30", "learning_rate: -0.1");
        assert!(matches!(
            first_error(&yaml),
            ConfigError::InvalidRange { ref field, .. } if field == "model.hyperparameters.learning_rate"
        ));
    }

    #[test]
    fn test_empty_hyperparameters_warn() {
        let yaml = reference_with(
            "  hyperparameters:\n    n_estimators: 30\n",
            "  hyperparameters: {}\n",
        );
        let result = check(&yaml);
        assert!(result.is_valid());
        assert_eq!(result.warnings[0].path, "model.hyperparameters");
        assert!(result.config.unwrap().model.hyperparameters.is_empty());
    }

    #[test]
    fn test_unknown_key_warns_with_suggestion() {
        let yaml = reference_with("    stemming: false\n", "    stemming: false\n    steming: true\n");
        let result = check(&yaml);
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "preprocessing.text.steming");
        assert!(result.warnings[0].message.contains("did you mean 'stemming'"));
    }

    #[test]
    fn test_test_size_range() {
        let yaml = reference_with(
            "      type: \"categorical\"\n",
            "      type: \"categorical\"\n  test_size: 1\n",
        );
        assert!(matches!(
            first_error(&yaml),
            ConfigError::InvalidRange { ref field, .. } if field == "dataset.test_size"
        ));

        let yaml = reference_with(
            "      type: \"categorical\"\n",
            "      type: \"categorical\"\n  test_size: 0.3\n  random_state: 7\n",
        );
        let config = check(&yaml).config.unwrap();
        assert!((config.dataset.test_size - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.dataset.random_state, 7);
    }

    #[test]
    fn test_text_dataset_without_text_column_warns() {
        let yaml = reference_with("type: \"tabular\"", "type: \"text\"")
            .replacen("type: \"text\"\n    - name: \"price\"", "type: \"numeric\"\n    - name: \"price\"", 1);
        let result = check(&yaml);
        assert!(result.is_valid(), "errors: {:?}", result.errors);
        assert!(result.warnings.iter().any(|w| w.path == "dataset.type"));
    }

    #[test]
    fn test_collects_all_errors_in_document_order() {
        let yaml = reference_with("scaling: \"standard\"", "scaling: \"zscore\"")
            .replacen("n_components: 0.95", "n_components: 1.5", 1)
            .replacen("algorithm: \"random_forest\"", "algorithm: \"forest\"", 1);
        let fields: Vec<_> = check(&yaml)
            .errors
            .iter()
            .filter_map(|e| e.field().map(str::to_string))
            .collect();
        assert_eq!(
            fields,
            vec![
                "preprocessing.numeric.scaling",
                "feature_engineering.numeric.n_components",
                "model.algorithm",
            ]
        );
    }

    #[test]
    fn test_errors_follow_section_order_in_document() {
        let (head, evaluation) = REFERENCE
            .split_once("# Evaluation configuration")
            .unwrap();
        let evaluation = evaluation.replacen(
            "[\"accuracy\", \"precision\", \"recall\", \"f1\"]",
            "[\"bogus\"]",
            1,
        );
        let head = head.replacen("scaling: \"standard\"", "scaling: \"zscore\"", 1);
        let yaml = format!("{evaluation}\n{head}");

        let fields: Vec<_> = check(&yaml)
            .errors
            .iter()
            .filter_map(|e| e.field().map(str::to_string))
            .collect();
        assert_eq!(
            fields,
            vec!["evaluation.metrics[0]", "preprocessing.numeric.scaling"]
        );

        let document = parse(&yaml).unwrap();
        assert!(matches!(
            validate(&document),
            Err(ConfigError::InvalidOption { ref field, .. }) if field == "evaluation.metrics[0]"
        ));
    }

    #[test]
    fn test_warnings_follow_document_order() {
        let yaml = format!("{REFERENCE}\nnotes: draft\n")
            .replacen("    stemming: false\n", "    stemming: false\n    steming: true\n", 1);
        let paths: Vec<_> = check(&yaml)
            .warnings
            .into_iter()
            .map(|w| w.path)
            .collect();
        assert_eq!(paths, vec!["preprocessing.text.steming", "notes"]);
    }

    #[test]
    fn test_document_position() {
        let document = parse(REFERENCE).unwrap();
        let root = document.root();
        assert_eq!(document_position(root, "dataset"), vec![0]);
        assert_eq!(
            document_position(root, "dataset.input_columns[1].name"),
            vec![0, 1, 1, 0]
        );
        assert_eq!(document_position(root, "model.algorithm"), vec![3, 1]);
        assert_eq!(document_position(root, "data_path"), vec![root.len()]);
        assert!(
            document_position(root, "evaluation.metrics[3]")
                > document_position(root, "model.hyperparameters.n_estimators")
        );
    }

    #[test]
    fn test_validate_returns_first_error() {
        let document = parse(&reference_with("encoding: \"label\"", "encoding: \"ordinal\"")).unwrap();
        assert!(matches!(
            validate(&document),
            Err(ConfigError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_suggest() {
        assert_eq!(
            suggest("minmx", &["standard", "minmax", "robust"]),
            Some("minmax".to_string())
        );
        assert_eq!(suggest("completely_different", &["standard", "minmax"]), None);
    }
}
