//! Linear and logistic predictors over ordinal-indexed inputs.

use core::fmt::Debug;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Col, Row, Table};
use strum_macros::Display;

pub trait AsIndex {
    fn as_index(&self) -> usize;
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Display)]
pub enum Regressor<O: AsIndex> {
    Ordinal(O),
    Intercept,
}
impl<O: AsIndex> Regressor<O> {
    pub fn resolve(&self, input: &[f64]) -> f64 {
        match self {
            Regressor::Ordinal(ordinal) => input[ordinal.as_index()],
            Regressor::Intercept => 1.,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predictor<O: AsIndex> {
    pub regressors: Vec<Regressor<O>>,
    pub coefficients: Vec<f64>,
}
impl<O: AsIndex> Predictor<O> {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.regressors.is_empty() {
            bail!("at least one regressor must be present");
        }
        let intercepts = self
            .regressors
            .iter()
            .filter(|regressor| matches!(regressor, Regressor::Intercept))
            .count();
        if intercepts > 1 {
            bail!("at most one intercept may be specified");
        }
        if self.regressors.len() != self.coefficients.len() {
            bail!("exactly one coefficient must be specified for each regressor");
        }
        if let Some(index) = self.coefficients.iter().position(|c| !c.is_finite()) {
            bail!("coefficient {index} is not finite");
        }
        Ok(())
    }

    pub fn predict(&self, input: &[f64]) -> f64 {
        self.regressors
            .iter()
            .zip(&self.coefficients)
            .map(|(regressor, coefficient)| coefficient * regressor.resolve(input))
            .sum()
    }

    pub fn tabulate(&self) -> Table
    where
        O: Debug,
    {
        let mut table = Table::default()
            .with_cols(vec![
                Col::new(Styles::default()),
                Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
            ])
            .with_row(Row::new(
                Styles::default().with(Header(true)),
                vec!["Regressor".into(), "Coefficient".into()],
            ));
        for (regressor, coefficient) in self.regressors.iter().zip(&self.coefficients) {
            table.push_row(Row::new(
                Styles::default(),
                vec![
                    format!("{regressor:?}").into(),
                    format!("{coefficient:.8}").into(),
                ],
            ));
        }
        table
    }
}

/// The standard logistic function, evaluated without overflow for large `|x|`.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0. {
        1. / (1. + (-x).exp())
    } else {
        let e = x.exp();
        e / (1. + e)
    }
}

/// A binary classifier whose log-odds are given by a linear [`Predictor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticPredictor<O: AsIndex> {
    pub predictor: Predictor<O>,
}
impl<O: AsIndex> LogisticPredictor<O> {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.predictor.validate()
    }

    /// Probability of the positive class.
    pub fn probability(&self, input: &[f64]) -> f64 {
        sigmoid(self.predictor.predict(input))
    }
}
