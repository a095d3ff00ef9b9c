//! The in-memory document model: paragraphs made of formatting-carrying
//! text fragments.
//!
//! The engine never interprets a fragment's formatting; it only decides which
//! fragment a piece of text belongs to after an edit. Formatting is therefore
//! carried as an opaque JSON value that round-trips through load and save
//! untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Identity of a fragment within its paragraph, stable for the duration of
/// one apply pass. Ids are assigned when a paragraph is built and are never
/// serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(u64);

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque formatting descriptor attached to a fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatToken(pub JsonValue);

/// A run of text with uniform formatting. `text` may be empty after an edit
/// has consumed it; emptied fragments stay in place until an explicit
/// compaction step removes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    id: FragmentId,
    pub text: String,
    pub format: FormatToken,
}

impl Fragment {
    pub(crate) fn new(id: FragmentId, text: String, format: FormatToken) -> Self {
        Self { id, text, format }
    }

    pub fn id(&self) -> FragmentId {
        self.id
    }
}

/// An ordered sequence of fragments. The concatenation of the fragment texts
/// is the paragraph's logical text.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    fragments: Vec<Fragment>,
    next_id: u64,
}

impl Paragraph {
    /// Builds a paragraph from `(text, format)` parts, assigning fresh ids.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = (S, FormatToken)>,
        S: Into<String>,
    {
        let mut paragraph = Self {
            fragments: Vec::new(),
            next_id: 0,
        };
        for (text, format) in parts {
            paragraph.push_fragment(text, format);
        }
        paragraph
    }

    /// Builds a paragraph of unformatted fragments.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_parts(texts.into_iter().map(|text| (text, FormatToken::default())))
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The full readable text, independent of the fragment partitioning.
    pub fn logical_text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    /// Position of the fragment with the given id, if it is still present.
    pub fn fragment_position(&self, id: FragmentId) -> Option<usize> {
        self.fragments.iter().position(|f| f.id == id)
    }

    pub fn push_fragment(&mut self, text: impl Into<String>, format: FormatToken) -> FragmentId {
        let id = self.fresh_id();
        self.fragments.push(Fragment::new(id, text.into(), format));
        id
    }

    pub(crate) fn insert_fragment(
        &mut self,
        position: usize,
        text: impl Into<String>,
        format: FormatToken,
    ) -> FragmentId {
        let id = self.fresh_id();
        self.fragments
            .insert(position, Fragment::new(id, text.into(), format));
        id
    }

    pub(crate) fn fragments_mut(&mut self) -> &mut [Fragment] {
        &mut self.fragments
    }

    pub(crate) fn retain_non_empty(&mut self) -> usize {
        let before = self.fragments.len();
        self.fragments.retain(|f| !f.text.is_empty());
        before - self.fragments.len()
    }

    fn fresh_id(&mut self) -> FragmentId {
        self.next_id += 1;
        FragmentId(self.next_id)
    }
}

/// An ordered sequence of paragraphs. The caller owns the document for the
/// duration of an apply pass; the engine borrows it mutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DocumentRepr", into = "DocumentRepr")]
pub struct Document {
    paragraphs: Vec<Paragraph>,
}

impl Document {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut Vec<Paragraph> {
        &mut self.paragraphs
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    pub fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.paragraphs.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Logical text of every paragraph, joined by newlines. Used for diff
    /// output and auditing, never for matching.
    pub fn to_plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::logical_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// Serde representation: fragment ids exist only in memory, so documents are
// (de)serialized through an id-free mirror of the model.

#[derive(Serialize, Deserialize)]
struct DocumentRepr {
    #[serde(default)]
    paragraphs: Vec<ParagraphRepr>,
}

#[derive(Serialize, Deserialize)]
struct ParagraphRepr {
    #[serde(default)]
    fragments: Vec<FragmentRepr>,
}

#[derive(Serialize, Deserialize)]
struct FragmentRepr {
    text: String,
    #[serde(default)]
    format: FormatToken,
}

impl From<DocumentRepr> for Document {
    fn from(repr: DocumentRepr) -> Self {
        let paragraphs = repr
            .paragraphs
            .into_iter()
            .map(|p| Paragraph::from_parts(p.fragments.into_iter().map(|f| (f.text, f.format))))
            .collect();
        Document { paragraphs }
    }
}

impl From<Document> for DocumentRepr {
    fn from(document: Document) -> Self {
        DocumentRepr {
            paragraphs: document
                .paragraphs
                .into_iter()
                .map(|p| ParagraphRepr {
                    fragments: p
                        .fragments
                        .into_iter()
                        .map(|f| FragmentRepr {
                            text: f.text,
                            format: f.format,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
