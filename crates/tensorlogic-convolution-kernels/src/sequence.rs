//! Symbol sequences consumed by the subsequence kernel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, Result};

/// Kind assigned to elements created from bare tokens.
pub const TOKEN_KIND: &str = "token";

/// One element of a sequence: a text token tagged with the kind of content it
/// was derived from (a word, a lemma, a part-of-speech tag, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceElement {
    /// Content kind
    pub kind: String,
    /// Comparable text token
    pub text: String,
}

impl SequenceElement {
    /// Create an element with an explicit kind
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
        }
    }

    /// Create an element of kind [`TOKEN_KIND`]
    pub fn token(text: impl Into<String>) -> Self {
        Self::new(TOKEN_KIND, text)
    }
}

impl fmt::Display for SequenceElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TOKEN_KIND {
            write!(f, "{}", self.text)
        } else {
            write!(f, "{}::{}", self.kind, self.text)
        }
    }
}

/// How two sequence elements are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementSimilarity {
    /// Elements match when their text tokens are equal.
    Text,
    /// Elements match when both kind and text are equal.
    #[default]
    KindAndText,
}

impl ElementSimilarity {
    /// Binary similarity between two elements.
    pub fn score(self, a: &SequenceElement, b: &SequenceElement) -> f64 {
        let matches = match self {
            Self::Text => a.text == b.text,
            Self::KindAndText => a.kind == b.kind && a.text == b.text,
        };
        if matches {
            1.0
        } else {
            0.0
        }
    }
}

/// An ordered sequence of elements.
///
/// Parses from whitespace-separated tokens; a token written `kind::text`
/// carries an explicit kind:
///
/// ```rust
/// use tensorlogic_convolution_kernels::{SequenceElement, SequenceRepresentation};
///
/// let seq: SequenceRepresentation = "the pos::DT dog".parse().unwrap();
/// assert_eq!(seq.elements()[1], SequenceElement::new("pos", "DT"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SequenceRepresentation {
    elements: Vec<SequenceElement>,
}

impl SequenceRepresentation {
    /// Create a sequence from elements
    pub fn new(elements: Vec<SequenceElement>) -> Self {
        Self { elements }
    }

    /// Create a sequence of [`TOKEN_KIND`] elements
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(tokens.into_iter().map(SequenceElement::token).collect())
    }

    /// Elements in order
    pub fn elements(&self) -> &[SequenceElement] {
        &self.elements
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the sequence has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl FromStr for SequenceRepresentation {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        let mut elements = Vec::new();
        for raw in s.split_whitespace() {
            let offset = raw.as_ptr() as usize - s.as_ptr() as usize;
            let element = match raw.split_once("::") {
                Some((kind, text)) if kind.is_empty() || text.is_empty() => {
                    return Err(KernelError::MalformedInput {
                        offset,
                        reason: format!("element '{}' has an empty kind or text", raw),
                    })
                }
                Some((kind, text)) => SequenceElement::new(kind, text),
                None => SequenceElement::token(raw),
            };
            elements.push(element);
        }
        Ok(Self::new(elements))
    }
}

impl fmt::Display for SequenceRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}
