//! Collaborator views
//!
//! Read-only slices of a [`PipelineConfig`] for the modules that consume it.
//! Each preprocessing stage sees its own settings and the columns it owns;
//! training and evaluation see only the model and metric subsections.

use serde::Serialize;

use crate::config::schema::{
    CategoricalFeatures, CategoricalPreprocessing, ColumnType, Metric, ModelConfig,
    NumericFeatures, NumericPreprocessing, PipelineConfig, TaskType, TextFeatures,
    TextPreprocessing,
};
use crate::error::ConfigError;

/// Fixed order in which preprocessing stages run.
const STAGE_ORDER: [ColumnType; 3] = [
    ColumnType::Text,
    ColumnType::Numeric,
    ColumnType::Categorical,
];

/// A preprocessing stage required by the declared columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage<'a> {
    /// Column kind the stage handles
    pub kind: ColumnType,
    /// Columns routed to the stage, in declaration order
    pub columns: Vec<&'a str>,
}

/// Settings for the text preprocessing and vectorization stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextView<'a> {
    pub columns: Vec<&'a str>,
    pub preprocessing: &'a TextPreprocessing,
    pub features: &'a TextFeatures,
}

/// Settings for the numeric scaling and selection stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericView<'a> {
    pub columns: Vec<&'a str>,
    pub preprocessing: &'a NumericPreprocessing,
    pub features: &'a NumericFeatures,
}

/// Settings for the categorical encoding and selection stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalView<'a> {
    pub columns: Vec<&'a str>,
    pub preprocessing: &'a CategoricalPreprocessing,
    pub features: &'a CategoricalFeatures,
}

/// Settings for model training.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelView<'a> {
    pub model: &'a ModelConfig,
    /// Seed shared with the train/test split
    pub random_state: u64,
}

/// Settings for model evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationView<'a> {
    pub task: TaskType,
    pub metrics: &'a [Metric],
}

/// Where data comes from and goes to, and how it is split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionSettings<'a> {
    pub data_path: &'a str,
    pub output_dir: &'a str,
    pub test_size: f64,
    pub random_state: u64,
}

impl PipelineConfig {
    /// Names of the declared columns of one kind, in declaration order.
    #[must_use]
    pub fn columns_of(&self, kind: ColumnType) -> Vec<&str> {
        self.dataset
            .input_columns
            .iter()
            .filter(|column| column.kind == kind)
            .map(|column| column.name.as_str())
            .collect()
    }

    /// Preprocessing stages the declared columns require.
    ///
    /// A stage appears iff at least one column of its kind is declared.
    #[must_use]
    pub fn stages(&self) -> Vec<Stage<'_>> {
        STAGE_ORDER
            .into_iter()
            .map(|kind| Stage {
                kind,
                columns: self.columns_of(kind),
            })
            .filter(|stage| !stage.columns.is_empty())
            .collect()
    }

    #[must_use]
    pub fn text_view(&self) -> TextView<'_> {
        TextView {
            columns: self.columns_of(ColumnType::Text),
            preprocessing: &self.preprocessing.text,
            features: &self.feature_engineering.text,
        }
    }

    #[must_use]
    pub fn numeric_view(&self) -> NumericView<'_> {
        NumericView {
            columns: self.columns_of(ColumnType::Numeric),
            preprocessing: &self.preprocessing.numeric,
            features: &self.feature_engineering.numeric,
        }
    }

    #[must_use]
    pub fn categorical_view(&self) -> CategoricalView<'_> {
        CategoricalView {
            columns: self.columns_of(ColumnType::Categorical),
            preprocessing: &self.preprocessing.categorical,
            features: &self.feature_engineering.categorical,
        }
    }

    #[must_use]
    pub const fn model_view(&self) -> ModelView<'_> {
        ModelView {
            model: &self.model,
            random_state: self.dataset.random_state,
        }
    }

    #[must_use]
    pub fn evaluation_view(&self) -> EvaluationView<'_> {
        EvaluationView {
            task: self.model.task,
            metrics: &self.evaluation.metrics,
        }
    }

    #[must_use]
    pub fn ingestion(&self) -> IngestionSettings<'_> {
        IngestionSettings {
            data_path: self.data_path.as_str(),
            output_dir: self.output_dir.as_str(),
            test_size: self.dataset.test_size,
            random_state: self.dataset.random_state,
        }
    }

    /// Checks that every declared input column appears in `available`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingColumns`] listing the absent columns in
    /// declaration order.
    pub fn check_columns<'h, I>(&self, available: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = &'h str>,
    {
        let available: Vec<&str> = available.into_iter().collect();
        let missing: Vec<String> = self
            .dataset
            .input_columns
            .iter()
            .filter(|column| !available.contains(&column.name.as_str()))
            .map(|column| column.name.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            tracing::debug!(missing = missing.len(), "dataset header lacks declared columns");
            Err(ConfigError::MissingColumns { columns: missing })
        }
    }
}
