//! Win-probability models. The engine only ever sees the [`WinProbabilityModel`] trait; the
//! [`LogisticModel`] is the production implementation, loaded from a trained artifact.

use std::path::Path;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use duckworth::file::read_json;
use duckworth::linear::{LogisticPredictor, Predictor, Regressor};

use crate::error::{ConfigError, DataError};
use crate::features::{Feature, FeatureVector};

const TOP_FACTORS: usize = 5;

pub trait WinProbabilityModel: Sync {
    /// The features the model consumes, in the order it was trained on.
    fn feature_schema(&self) -> &[Feature];

    fn predict(&self, features: &FeatureVector) -> Prediction;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopFactor {
    pub feature: Feature,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub confidence: f64,
    pub top_factors: Vec<TopFactor>,
}
impl Prediction {
    pub fn from_home_probability(home_win_probability: f64, top_factors: Vec<TopFactor>) -> Self {
        let home_win_probability = if home_win_probability.is_finite() {
            home_win_probability.clamp(0., 1.)
        } else {
            0.5
        };
        let away_win_probability = 1. - home_win_probability;
        Self {
            home_win_probability,
            away_win_probability,
            confidence: home_win_probability.max(away_win_probability),
            top_factors,
        }
    }
}

/// A trained model as exported by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub importances: Option<Vec<f64>>,
}

#[derive(Debug, Clone)]
pub struct LogisticModel {
    schema: Vec<Feature>,
    logistic: LogisticPredictor<Feature>,
    top_factors: Vec<TopFactor>,
}
impl LogisticModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let artifact: ModelArtifact = read_json(path)?;
        Ok(Self::try_from(artifact)?)
    }

    pub fn predictor(&self) -> &Predictor<Feature> {
        &self.logistic.predictor
    }
}

impl TryFrom<ModelArtifact> for LogisticModel {
    type Error = ConfigError;

    fn try_from(artifact: ModelArtifact) -> Result<Self, Self::Error> {
        if artifact.feature_names.is_empty() {
            return Err(ConfigError::EmptySchema);
        }
        let features = artifact.feature_names.len();
        if artifact.coefficients.len() != features {
            return Err(ConfigError::MisalignedModel {
                features,
                values: artifact.coefficients.len(),
                kind: "coefficients",
            });
        }
        if let Some(importances) = &artifact.importances {
            if importances.len() != features {
                return Err(ConfigError::MisalignedModel {
                    features,
                    values: importances.len(),
                    kind: "importances",
                });
            }
        }

        let mut schema = Vec::with_capacity(features);
        let mut seen = FxHashSet::default();
        for name in &artifact.feature_names {
            let feature = Feature::from_str(name)
                .map_err(|_| ConfigError::UnknownFeature(name.clone()))?;
            if !seen.insert(feature) {
                return Err(ConfigError::DuplicateFeature(feature));
            }
            schema.push(feature);
        }

        let mut regressors = vec![Regressor::Intercept];
        regressors.extend(schema.iter().copied().map(Regressor::Ordinal));
        let mut coefficients = vec![artifact.intercept];
        coefficients.extend_from_slice(&artifact.coefficients);
        let logistic = LogisticPredictor {
            predictor: Predictor {
                regressors,
                coefficients,
            },
        };
        logistic.validate()?;

        let weights = match &artifact.importances {
            Some(importances) => importances.clone(),
            None => artifact.coefficients.iter().map(|c| c.abs()).collect(),
        };
        let mut ranked = schema
            .iter()
            .zip(weights)
            .map(|(&feature, importance)| TopFactor {
                feature,
                importance,
            })
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ranked.truncate(TOP_FACTORS);

        Ok(Self {
            schema,
            logistic,
            top_factors: ranked,
        })
    }
}

impl WinProbabilityModel for LogisticModel {
    fn feature_schema(&self) -> &[Feature] {
        &self.schema
    }

    fn predict(&self, features: &FeatureVector) -> Prediction {
        let p = self.logistic.probability(features.as_slice());
        Prediction::from_home_probability(p, self.top_factors.clone())
    }
}

/// A model that returns the same home-win probability for every fixture.
#[derive(Debug, Clone)]
pub struct ConstantModel {
    home_win_probability: f64,
    schema: Vec<Feature>,
}
impl ConstantModel {
    pub fn new(home_win_probability: f64) -> Self {
        Self {
            home_win_probability,
            schema: vec![Feature::DeltaWinPct],
        }
    }
}

impl WinProbabilityModel for ConstantModel {
    fn feature_schema(&self) -> &[Feature] {
        &self.schema
    }

    fn predict(&self, _: &FeatureVector) -> Prediction {
        Prediction::from_home_probability(self.home_win_probability, vec![])
    }
}

/// Rejects a model whose schema cannot be served by the feature builder.
pub fn validate_schema(model: &dyn WinProbabilityModel) -> Result<(), ConfigError> {
    let schema = model.feature_schema();
    if schema.is_empty() {
        return Err(ConfigError::EmptySchema);
    }
    let mut seen = FxHashSet::default();
    for &feature in schema {
        if !seen.insert(feature) {
            return Err(ConfigError::DuplicateFeature(feature));
        }
    }
    Ok(())
}
