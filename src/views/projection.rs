//! Projection view
//!
//! 2D scatter of the document embedding, colored by correctness. The
//! unfiltered rendering draws the first 5,000 documents; a highlighted
//! subpopulation draws exactly the inspected document list, uncapped,
//! in the order the backend returned it.

use std::sync::Arc;

use serde::Serialize;

use crate::dataset::DatasetBundle;

/// Point cap for the unfiltered scatter.
const FULL_RENDER_CAP: usize = 5000;

/// One plotted document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedDot {
    index: u32,
    x: f64,
    y: f64,
    is_error: bool,
}

impl ProjectedDot {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// The projection view's state: either the full scatter or one
/// highlighted subpopulation.
pub struct ProjectionView {
    bundle: Arc<DatasetBundle>,
    highlighted: Option<Vec<u32>>,
    context: String,
}

impl ProjectionView {
    pub fn new(bundle: Arc<DatasetBundle>) -> Self {
        Self {
            bundle,
            highlighted: None,
            context: "all".to_string(),
        }
    }

    /// Restricts the scatter to a subpopulation.
    pub fn highlight(&mut self, doc_list: Vec<u32>, context: impl Into<String>) {
        self.highlighted = Some(doc_list);
        self.context = context.into();
    }

    /// Returns to the unfiltered scatter.
    pub fn reset(&mut self) {
        self.highlighted = None;
        self.context = "all".to_string();
    }

    pub fn is_highlighting(&self) -> bool {
        self.highlighted.is_some()
    }

    /// Label of what the scatter currently shows.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Points in draw order. Indices without a loaded coordinate are
    /// skipped.
    pub fn dots(&self) -> Vec<ProjectedDot> {
        match &self.highlighted {
            Some(doc_list) => doc_list
                .iter()
                .filter_map(|&index| self.dot(index as usize))
                .collect(),
            None => (0..self.bundle.document_count().min(FULL_RENDER_CAP))
                .filter_map(|index| self.dot(index))
                .collect(),
        }
    }

    fn dot(&self, index: usize) -> Option<ProjectedDot> {
        let point = self.bundle.projection().get(index)?;
        let is_error = self.bundle.is_error(index)?;
        Some(ProjectedDot {
            index: index as u32,
            x: point.x,
            y: point.y,
            is_error,
        })
    }
}
