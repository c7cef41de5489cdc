//! Dataset bundle loader
//!
//! Reads one dataset directory into memory: descriptor, documents, model
//! outputs, projection, aggregate statistics, and the mined rule artifact
//! for each flavor. Loading is all-or-nothing; any unreadable or
//! unparsable file aborts with the offending path, and the alignment of
//! the per-document tables is checked before the bundle is handed out.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::backend::StatBreakdown;
use crate::rules::{FeatureTable, MiningFilter, RuleArtifact, RuleFlavor, RuleSet};

use super::descriptor::DatasetDescriptor;
use super::document::{parse_jsonl, Document};
use super::errors::{DatasetError, DatasetResult};
use super::model_output::{parse_model_output, ModelOutput};
use super::projection::{parse_projection, ProjectionPoint};

/// One fully loaded dataset.
#[derive(Debug)]
pub struct DatasetBundle {
    descriptor: DatasetDescriptor,
    documents: Vec<Document>,
    model_outputs: Vec<ModelOutput>,
    projection: Vec<ProjectionPoint>,
    model_stat: StatBreakdown,
    token_rules: Arc<RuleSet>,
    high_level_rules: Arc<RuleSet>,
}

impl DatasetBundle {
    /// Loads the bundle rooted at `dir`, applying `filter` while parsing
    /// the rule artifacts.
    pub fn load(dir: impl AsRef<Path>, filter: &MiningFilter) -> DatasetResult<Self> {
        let dir = dir.as_ref();

        let descriptor_path = dir.join("descriptor.json");
        let descriptor = DatasetDescriptor::from_json(&read_file(&descriptor_path)?)
            .map_err(|message| DatasetError::parse(&descriptor_path, message))?;

        let doc_path = dir.join("doc.jsonl");
        let documents = parse_jsonl(&read_file(&doc_path)?)
            .map_err(|message| DatasetError::parse(&doc_path, message))?;

        let output_path = dir.join("model_output.csv");
        let model_outputs = parse_model_output(read_file(&output_path)?.as_bytes())
            .map_err(|message| DatasetError::parse(&output_path, message))?;

        let projection_path = dir.join("projection.csv");
        let projection = parse_projection(read_file(&projection_path)?.as_bytes())
            .map_err(|message| DatasetError::parse(&projection_path, message))?;

        if documents.len() != model_outputs.len() || documents.len() != projection.len() {
            return Err(DatasetError::Misaligned {
                documents: documents.len(),
                outputs: model_outputs.len(),
                projections: projection.len(),
            });
        }

        let stat_path = dir.join("model_stat.json");
        let model_stat = serde_json::from_str(&read_file(&stat_path)?)
            .map_err(|err| DatasetError::parse(&stat_path, err.to_string()))?;

        let token_rules = Arc::new(load_rule_set(dir, RuleFlavor::TokenBinary, filter)?);
        let high_level_rules = Arc::new(load_rule_set(dir, RuleFlavor::HighLevel, filter)?);

        Ok(DatasetBundle {
            descriptor,
            documents,
            model_outputs,
            projection,
            model_stat,
            token_rules,
            high_level_rules,
        })
    }

    pub fn descriptor(&self) -> &DatasetDescriptor {
        &self.descriptor
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn model_outputs(&self) -> &[ModelOutput] {
        &self.model_outputs
    }

    pub fn output(&self, index: usize) -> Option<&ModelOutput> {
        self.model_outputs.get(index)
    }

    pub fn projection(&self) -> &[ProjectionPoint] {
        &self.projection
    }

    /// Whole-dataset breakdown for the statistics view's resting state.
    pub fn model_stat(&self) -> &StatBreakdown {
        &self.model_stat
    }

    pub fn rule_set(&self, flavor: RuleFlavor) -> &Arc<RuleSet> {
        match flavor {
            RuleFlavor::TokenBinary => &self.token_rules,
            RuleFlavor::HighLevel => &self.high_level_rules,
        }
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of misclassified documents.
    pub fn error_count(&self) -> usize {
        self.model_outputs.iter().filter(|o| o.is_error()).count()
    }

    /// Error share observed over the loaded split; 0 for an empty bundle.
    pub fn observed_error_rate(&self) -> f64 {
        if self.model_outputs.is_empty() {
            0.0
        } else {
            self.error_count() as f64 / self.model_outputs.len() as f64
        }
    }

    pub fn observed_accuracy(&self) -> f64 {
        1.0 - self.observed_error_rate()
    }

    pub fn is_error(&self, index: usize) -> Option<bool> {
        self.model_outputs.get(index).map(ModelOutput::is_error)
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        descriptor: DatasetDescriptor,
        documents: Vec<Document>,
        model_outputs: Vec<ModelOutput>,
        projection: Vec<ProjectionPoint>,
        model_stat: StatBreakdown,
        token_rules: RuleSet,
        high_level_rules: RuleSet,
    ) -> Self {
        Self {
            descriptor,
            documents,
            model_outputs,
            projection,
            model_stat,
            token_rules: Arc::new(token_rules),
            high_level_rules: Arc::new(high_level_rules),
        }
    }
}

fn read_file(path: &Path) -> DatasetResult<String> {
    fs::read_to_string(path).map_err(|err| DatasetError::io(path, err))
}

fn load_rule_set(dir: &Path, flavor: RuleFlavor, filter: &MiningFilter) -> DatasetResult<RuleSet> {
    let list_path = dir.join(flavor.dir_name()).join("list.json");
    let artifact = RuleArtifact::from_json(&read_file(&list_path)?)
        .map_err(|err| DatasetError::parse(&list_path, err.to_string()))?;

    let table_path = dir.join(flavor.dir_name()).join("test.json");
    let table = FeatureTable::from_json(&read_file(&table_path)?)
        .map_err(|err| DatasetError::parse(&table_path, err.to_string()))?;

    artifact
        .build(&table, flavor, filter)
        .map_err(|err| DatasetError::parse(&list_path, err.to_string()))
}
