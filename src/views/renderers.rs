//! Document card rendering
//!
//! One renderer variant per document kind, selected once at load time.
//! A renderer turns a raw document record plus its model output into a
//! serializable card: titled fields with condition highlighting applied
//! to the free-text ones, and the predicted label colored by
//! correctness.

use serde::Serialize;

use crate::dataset::{DatasetDescriptor, DocKind, Document, ModelOutput};

use super::highlight::HighlightSet;
use super::markup::Markup;

/// One labeled field of a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardField {
    label: String,
    content: Markup,
}

impl CardField {
    fn plain(label: &str, content: impl Into<String>) -> Self {
        CardField {
            label: label.to_string(),
            content: Markup::plain(content.into()),
        }
    }

    fn highlighted(label: &str, text: &str, highlight: &HighlightSet) -> Self {
        CardField {
            label: label.to_string(),
            content: highlight.apply(text),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn content(&self) -> &Markup {
        &self.content
    }
}

/// Render model for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    fields: Vec<CardField>,
    prediction: String,
    is_error: bool,
}

impl DocumentCard {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn fields(&self) -> &[CardField] {
        &self.fields
    }

    pub fn prediction(&self) -> &str {
        &self.prediction
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// Renders one document kind into cards.
pub trait DocumentRenderer {
    fn render(
        &self,
        document: &Document,
        output: &ModelOutput,
        descriptor: &DatasetDescriptor,
        highlight: &HighlightSet,
    ) -> DocumentCard;
}

/// Selects the renderer variant for a document kind.
pub fn renderer_for(kind: DocKind) -> Box<dyn DocumentRenderer + Send + Sync> {
    match kind {
        DocKind::Qa => Box::new(QaRenderer),
        DocKind::Inference => Box::new(InferenceRenderer),
        DocKind::Review => Box::new(ReviewRenderer),
        DocKind::Sentiment => Box::new(SentimentRenderer),
    }
}

fn predicted_label(descriptor: &DatasetDescriptor, output: &ModelOutput) -> String {
    descriptor
        .label_name(output.prediction as usize)
        .map(str::to_string)
        .unwrap_or_else(|| output.prediction.to_string())
}

fn label_field(document: &Document, descriptor: &DatasetDescriptor, key: &str) -> String {
    match document
        .integer(key)
        .and_then(|value| usize::try_from(value).ok())
    {
        Some(index) => descriptor
            .label_name(index)
            .map(str::to_string)
            .unwrap_or_else(|| index.to_string()),
        None => document.display(key),
    }
}

/// Question answering: title, question/passage pair, boolean answer.
pub struct QaRenderer;

impl DocumentRenderer for QaRenderer {
    fn render(
        &self,
        document: &Document,
        output: &ModelOutput,
        descriptor: &DatasetDescriptor,
        highlight: &HighlightSet,
    ) -> DocumentCard {
        DocumentCard {
            title: Some(document.display("title")),
            fields: vec![
                CardField::highlighted("Question", document.text("question").unwrap_or(""), highlight),
                CardField::highlighted("Passage", document.text("passage").unwrap_or(""), highlight),
                CardField::plain("Answer", document.display("answer")),
            ],
            prediction: predicted_label(descriptor, output),
            is_error: output.is_error(),
        }
    }
}

/// Natural language inference: sentence pair plus gold label.
pub struct InferenceRenderer;

impl DocumentRenderer for InferenceRenderer {
    fn render(
        &self,
        document: &Document,
        output: &ModelOutput,
        descriptor: &DatasetDescriptor,
        highlight: &HighlightSet,
    ) -> DocumentCard {
        DocumentCard {
            title: None,
            fields: vec![
                CardField::highlighted("Sentence1", document.text("sentence1").unwrap_or(""), highlight),
                CardField::highlighted("Sentence2", document.text("sentence2").unwrap_or(""), highlight),
                CardField::plain("Label", document.display("gold_label")),
            ],
            prediction: predicted_label(descriptor, output),
            is_error: output.is_error(),
        }
    }
}

/// Review scoring: review body plus numeric true score; the prediction
/// is shown as its raw numeric value.
pub struct ReviewRenderer;

impl DocumentRenderer for ReviewRenderer {
    fn render(
        &self,
        document: &Document,
        output: &ModelOutput,
        _descriptor: &DatasetDescriptor,
        highlight: &HighlightSet,
    ) -> DocumentCard {
        DocumentCard {
            title: None,
            fields: vec![
                CardField::highlighted("Review", document.text("review").unwrap_or(""), highlight),
                CardField::plain("Label", document.display("y_true")),
            ],
            prediction: output.prediction.to_string(),
            is_error: output.is_error(),
        }
    }
}

/// Sentiment classification: text plus label index resolved through the
/// label vocabulary.
pub struct SentimentRenderer;

impl DocumentRenderer for SentimentRenderer {
    fn render(
        &self,
        document: &Document,
        output: &ModelOutput,
        descriptor: &DatasetDescriptor,
        highlight: &HighlightSet,
    ) -> DocumentCard {
        DocumentCard {
            title: None,
            fields: vec![
                CardField::highlighted("Text", document.text("text").unwrap_or(""), highlight),
                CardField::plain("Label", label_field(document, descriptor, "label")),
            ],
            prediction: predicted_label(descriptor, output),
            is_error: output.is_error(),
        }
    }
}
