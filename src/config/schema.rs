//! Configuration schema types
//!
//! Typed representation of a pipeline configuration document. Values of these
//! types are only produced by the validator, so every instance obtained from
//! [`crate::config::load`] satisfies the documented option sets and ranges.
//! The types serialize back to the same YAML layout they were read from.

use indexmap::IndexMap;
use serde::Serialize;

// ============================================================================
// Option Sets
// ============================================================================

/// A closed set of string options accepted by an enum field.
pub trait OptionSet: Sized + Copy + 'static {
    /// Every accepted value, in documentation order.
    const ALLOWED: &'static [Self];

    /// The document spelling of this value.
    fn as_str(self) -> &'static str;

    /// Looks up the value spelled `value`.
    #[must_use]
    fn parse_option(value: &str) -> Option<Self> {
        Self::ALLOWED.iter().copied().find(|v| v.as_str() == value)
    }

    /// Document spellings of [`Self::ALLOWED`].
    #[must_use]
    fn allowed_names() -> Vec<&'static str> {
        Self::ALLOWED.iter().map(|v| v.as_str()).collect()
    }
}

/// Declares a string-backed option enum.
///
/// The serde spelling and the [`OptionSet`] spelling come from the same
/// literal so serialized documents always re-validate.
macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant, )+
        }

        impl OptionSet for $name {
            const ALLOWED: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }
    };
}

option_enum! {
    /// Kind of dataset the pipeline consumes.
    pub enum DatasetType {
        /// Free-text corpus
        Text => "text",
        /// Mixed-type table
        Tabular => "tabular",
        /// Time-indexed observations
        Timeseries => "timeseries",
    }
}

option_enum! {
    /// Type of a single input column. Each type is handled by its own
    /// preprocessing collaborator.
    pub enum ColumnType {
        /// Free text
        Text => "text",
        /// Continuous or integer values
        Numeric => "numeric",
        /// Discrete labels
        Categorical => "categorical",
    }
}

option_enum! {
    /// Numeric scaling method.
    pub enum Scaling {
        /// Zero mean, unit variance
        Standard => "standard",
        /// Rescale into `[0, 1]`
        MinMax => "minmax",
        /// Median and interquartile range
        Robust => "robust",
    }
}

option_enum! {
    /// Imputation for missing numeric values.
    pub enum NumericImputation {
        /// Column mean
        Mean => "mean",
        /// Column median
        Median => "median",
        /// Most frequent value
        Mode => "mode",
    }
}

option_enum! {
    /// Categorical encoding method.
    pub enum Encoding {
        /// One integer per category
        Label => "label",
        /// One indicator column per category
        OneHot => "onehot",
    }
}

option_enum! {
    /// Imputation for missing categorical values.
    pub enum CategoricalImputation {
        /// Most frequent category
        Mode => "mode",
        /// A fixed placeholder category
        Constant => "constant",
    }
}

option_enum! {
    /// Text vectorization method.
    pub enum Vectorization {
        /// Term frequency, inverse document frequency
        Tfidf => "tfidf",
        /// Raw term counts
        Count => "count",
        /// Dense word embeddings
        Word2Vec => "word2vec",
    }
}

option_enum! {
    /// Feature selection / reduction for numeric columns.
    pub enum NumericSelection {
        /// Principal component analysis
        Pca => "pca",
        /// Univariate selection of the best `k` features
        SelectKBest => "select_k_best",
        /// Keep every feature
        None => "none",
    }
}

option_enum! {
    /// Feature selection for categorical columns.
    pub enum CategoricalSelection {
        /// Chi-squared test
        Chi2 => "chi2",
        /// Mutual information
        MutualInfo => "mutual_info",
        /// Keep every feature
        None => "none",
    }
}

option_enum! {
    /// Learning task.
    pub enum TaskType {
        /// Predict a discrete label
        Classification => "classification",
        /// Predict a continuous value
        Regression => "regression",
    }
}

option_enum! {
    /// Model algorithm.
    pub enum Algorithm {
        RandomForest => "random_forest",
        GradientBoosting => "gradient_boosting",
        LogisticRegression => "logistic_regression",
        LinearRegression => "linear_regression",
        Svm => "svm",
        Knn => "knn",
    }
}

option_enum! {
    /// Evaluation metric.
    pub enum Metric {
        Accuracy => "accuracy",
        Precision => "precision",
        Recall => "recall",
        F1 => "f1",
        RocAuc => "roc_auc",
        Mse => "mse",
        Rmse => "rmse",
        Mae => "mae",
        R2 => "r2",
    }
}

impl Algorithm {
    /// Returns `true` if the algorithm can be trained for `task`.
    #[must_use]
    pub const fn supports(self, task: TaskType) -> bool {
        !matches!(
            (self, task),
            (Self::LogisticRegression, TaskType::Regression)
                | (Self::LinearRegression, TaskType::Classification)
        )
    }
}

impl Metric {
    /// The task this metric evaluates.
    #[must_use]
    pub const fn task(self) -> TaskType {
        match self {
            Self::Accuracy | Self::Precision | Self::Recall | Self::F1 | Self::RocAuc => {
                TaskType::Classification
            }
            Self::Mse | Self::Rmse | Self::Mae | Self::R2 => TaskType::Regression,
        }
    }

    /// Metrics that evaluate `task`, in documentation order.
    #[must_use]
    pub fn for_task(task: TaskType) -> Vec<Self> {
        Self::ALLOWED
            .iter()
            .copied()
            .filter(|m| m.task() == task)
            .collect()
    }
}

// ============================================================================
// Numeric Parameters
// ============================================================================

/// Component parameter of numeric feature selection.
///
/// A YAML float is a fraction of explained variance in `(0, 1]`; a YAML
/// integer is an absolute component count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Components {
    /// Absolute number of components (> 0)
    Count(u64),
    /// Fraction of variance to retain, in `(0, 1]`
    Fraction(f64),
}

/// A numeric hyperparameter value.
///
/// Integers and floats are kept apart so that `30` and `30.0` survive a
/// serialize/load round trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Hyperparameter {
    /// Integer value
    Int(i64),
    /// Finite floating-point value
    Float(f64),
}

impl Hyperparameter {
    /// The value as a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// The value as an integer, if it is one.
    #[must_use]
    pub const fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i),
            Self::Float(_) => None,
        }
    }
}

impl std::fmt::Display for Hyperparameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
        }
    }
}

// ============================================================================
// Defaults
// ============================================================================

/// Default location of the raw input data.
pub const DEFAULT_DATA_PATH: &str = "data/raw/input.csv";

/// Default directory for processed train/test splits.
pub const DEFAULT_OUTPUT_DIR: &str = "data/processed";

/// Default held-out fraction.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Default split seed.
pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// Default vocabulary size for text vectorization.
pub const DEFAULT_MAX_FEATURES: u64 = 5000;

// ============================================================================
// Root Configuration
// ============================================================================

/// Validated pipeline configuration.
///
/// Built once per run and shared read-only with the collaborators; see
/// [`crate::config::views`] for the per-collaborator subsections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    /// Input dataset description
    pub dataset: DatasetConfig,

    /// Per-column-type preprocessing
    pub preprocessing: PreprocessingConfig,

    /// Per-column-type feature engineering
    pub feature_engineering: FeatureEngineeringConfig,

    /// Model selection
    pub model: ModelConfig,

    /// Evaluation settings
    pub evaluation: EvaluationConfig,

    /// Location of the raw input data
    pub data_path: String,

    /// Directory receiving processed splits
    pub output_dir: String,
}

// ============================================================================
// Dataset
// ============================================================================

/// Dataset section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetConfig {
    /// Dataset kind
    #[serde(rename = "type")]
    pub kind: DatasetType,

    /// Ordered input columns
    pub input_columns: Vec<ColumnSpec>,

    /// Held-out fraction, in `(0, 1)`
    pub test_size: f64,

    /// Split seed
    pub random_state: u64,
}

/// A declared input column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// Column name as it appears in the dataset header
    pub name: String,

    /// Column type
    #[serde(rename = "type")]
    pub kind: ColumnType,
}

// ============================================================================
// Preprocessing
// ============================================================================

/// Preprocessing section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreprocessingConfig {
    pub text: TextPreprocessing,
    pub numeric: NumericPreprocessing,
    pub categorical: CategoricalPreprocessing,
}

/// Text normalization flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct TextPreprocessing {
    pub lowercase: bool,
    pub remove_punctuation: bool,
    pub remove_stopwords: bool,
    pub stemming: bool,
}

/// Numeric column preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumericPreprocessing {
    pub scaling: Scaling,
    pub handle_missing: NumericImputation,
}

/// Categorical column preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoricalPreprocessing {
    pub encoding: Encoding,
    pub handle_missing: CategoricalImputation,
}

// ============================================================================
// Feature Engineering
// ============================================================================

/// Feature engineering section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureEngineeringConfig {
    pub text: TextFeatures,
    pub numeric: NumericFeatures,
    pub categorical: CategoricalFeatures,
}

/// Text vectorization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextFeatures {
    pub vectorization: Vectorization,

    /// Vocabulary size limit (> 0)
    pub max_features: u64,
}

/// Numeric feature selection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericFeatures {
    pub feature_selection: NumericSelection,

    /// Present whenever `feature_selection` needs it; validated but unused
    /// with [`NumericSelection::None`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_components: Option<Components>,
}

/// Categorical feature selection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoricalFeatures {
    pub feature_selection: CategoricalSelection,
}

// ============================================================================
// Model & Evaluation
// ============================================================================

/// Model section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelConfig {
    /// Learning task
    #[serde(rename = "type")]
    pub task: TaskType,

    pub algorithm: Algorithm,

    /// Hyperparameters in declaration order
    pub hyperparameters: IndexMap<String, Hyperparameter>,
}

/// Evaluation section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationConfig {
    /// Metrics in declaration order
    pub metrics: Vec<Metric>,
}
