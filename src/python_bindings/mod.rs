//! Python bindings that expose the rank engine via PyO3.
//!
//! Trees are passed as nested tuples: `()` is a leaf and an internal vertex
//! is `(left, right, {"label": int, "leaves_below": int})`. A missing
//! `leaves_below` is derived from the children.

use pyo3::{
    exceptions::{PyKeyError, PyTypeError, PyValueError},
    prelude::*,
    types::{PyDict, PyModule, PyTuple},
};

use crate::{RankConfig, RankEngine, RankError, Tree};

impl From<RankError> for PyErr {
    fn from(err: RankError) -> Self {
        match err {
            RankError::VertexNotFound(_) | RankError::NotDescendant { .. } => {
                PyKeyError::new_err(err.to_string())
            }
            RankError::InvalidTree(_) | RankError::Overflow(_) => {
                PyValueError::new_err(err.to_string())
            }
        }
    }
}

/// Python-facing rank engine holding its own binomial cache.
#[pyclass]
#[derive(Debug)]
pub struct PyRankEngine {
    engine: RankEngine,
}

#[pymethods]
impl PyRankEngine {
    #[new]
    #[pyo3(signature = (validate = true))]
    /// Create an engine; `validate` checks every tree before use.
    pub fn new(validate: bool) -> Self {
        Self {
            engine: RankEngine::new(RankConfig::default().with_validation(validate)),
        }
    }

    /// Probability distribution of the rank of `label`, indexed by rank.
    pub fn rankprob(&mut self, tree: &Bound<'_, PyAny>, label: u32) -> PyResult<Vec<f64>> {
        let tree = tree_from_py(tree)?;
        let dist = self.engine.rank_distribution(&tree, label)?;
        Ok(dist.as_slice().to_vec())
    }

    /// `(mean, variance)` of the rank of `label`.
    pub fn expectedrank(&mut self, tree: &Bound<'_, PyAny>, label: u32) -> PyResult<(f64, f64)> {
        let tree = tree_from_py(tree)?;
        Ok(self.engine.expected_rank(&tree, label)?)
    }

    /// Probability that `u` comes before `v`.
    pub fn compare(&mut self, tree: &Bound<'_, PyAny>, u: u32, v: u32) -> PyResult<f64> {
        let tree = tree_from_py(tree)?;
        Ok(self.engine.compare(&tree, u, v)?)
    }

    /// Exact number of labeled histories.
    pub fn history_count(&self, tree: &Bound<'_, PyAny>) -> PyResult<u128> {
        let tree = tree_from_py(tree)?;
        Ok(self.engine.history_count(&tree)?)
    }
}

fn tree_from_py(obj: &Bound<'_, PyAny>) -> PyResult<Tree> {
    let tuple = obj
        .downcast::<PyTuple>()
        .map_err(|_| PyTypeError::new_err("tree nodes must be tuples"))?;

    match tuple.len() {
        0 => Ok(Tree::leaf()),
        3 => {
            let left = tree_from_py(&tuple.get_item(0)?)?;
            let right = tree_from_py(&tuple.get_item(1)?)?;
            let meta = tuple.get_item(2)?;
            let meta = meta
                .downcast::<PyDict>()
                .map_err(|_| PyTypeError::new_err("third tuple entry must be a dict"))?;

            let label: u32 = meta
                .get_item("label")?
                .ok_or_else(|| PyKeyError::new_err("internal vertex without 'label'"))?
                .extract()?;

            match meta.get_item("leaves_below")? {
                Some(count) => Ok(Tree::with_leaf_count(label, count.extract()?, left, right)),
                None => Ok(Tree::internal(label, left, right)),
            }
        }
        n => Err(PyValueError::new_err(format!(
            "tree nodes must have 0 or 3 entries, got {n}"
        ))),
    }
}

/// Create Python module.
#[pymodule]
pub fn rankprob_py(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyRankEngine>()?;
    Ok(())
}
