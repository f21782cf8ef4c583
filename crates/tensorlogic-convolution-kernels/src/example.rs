//! Examples carrying several named structured representations.
//!
//! A learning example may hold, say, a constituency tree under `"parse"` and
//! a token sequence under `"words"`. Each kernel is configured with the
//! identifier of the representation it reads.

use std::collections::HashMap;

use crate::error::{KernelError, Result};
use crate::sequence::SequenceRepresentation;
use crate::tree::TreeRepresentation;

/// A structured representation of an example.
#[derive(Debug, Clone, PartialEq)]
pub enum Representation {
    /// Labeled ordered tree
    Tree(TreeRepresentation),
    /// Element sequence
    Sequence(SequenceRepresentation),
}

impl Representation {
    /// Human-readable kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tree(_) => "tree",
            Self::Sequence(_) => "sequence",
        }
    }
}

impl From<TreeRepresentation> for Representation {
    fn from(tree: TreeRepresentation) -> Self {
        Self::Tree(tree)
    }
}

impl From<SequenceRepresentation> for Representation {
    fn from(sequence: SequenceRepresentation) -> Self {
        Self::Sequence(sequence)
    }
}

/// An example with named representations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Example {
    representations: HashMap<String, Representation>,
}

impl Example {
    /// Create an example without representations
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a representation
    pub fn with_representation(
        mut self,
        identifier: impl Into<String>,
        representation: impl Into<Representation>,
    ) -> Self {
        self.insert(identifier, representation);
        self
    }

    /// Add (or replace) a representation in place
    pub fn insert(
        &mut self,
        identifier: impl Into<String>,
        representation: impl Into<Representation>,
    ) -> Option<Representation> {
        self.representations
            .insert(identifier.into(), representation.into())
    }

    /// Representation by identifier
    pub fn representation(&self, identifier: &str) -> Result<&Representation> {
        self.representations
            .get(identifier)
            .ok_or_else(|| KernelError::MissingRepresentation {
                identifier: identifier.to_string(),
            })
    }

    /// Tree representation by identifier
    pub fn tree(&self, identifier: &str) -> Result<&TreeRepresentation> {
        match self.representation(identifier)? {
            Representation::Tree(tree) => Ok(tree),
            other => Err(mismatch(identifier, "tree", other)),
        }
    }

    /// Sequence representation by identifier
    pub fn sequence(&self, identifier: &str) -> Result<&SequenceRepresentation> {
        match self.representation(identifier)? {
            Representation::Sequence(sequence) => Ok(sequence),
            other => Err(mismatch(identifier, "sequence", other)),
        }
    }

    /// Identifiers of all representations
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.representations.keys().map(String::as_str)
    }
}

fn mismatch(identifier: &str, expected: &str, found: &Representation) -> KernelError {
    KernelError::RepresentationMismatch {
        identifier: identifier.to_string(),
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}
