//! Destination paths.

use crate::routing::{RoutingEntry, RoutingIdentifier};

/// Ordered entry templates from an ancestor down to the destination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<RoutingEntry>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn then(mut self, entry: impl Into<RoutingEntry>) -> Self {
        self.segments.push(entry.into());
        self
    }

    pub fn push(&mut self, entry: impl Into<RoutingEntry>) {
        self.segments.push(entry.into());
    }

    pub fn segments(&self) -> &[RoutingEntry] {
        &self.segments
    }

    /// The last segment.
    pub fn destination(&self) -> Option<&RoutingEntry> {
        self.segments.last()
    }

    pub fn identifiers(&self) -> Vec<RoutingIdentifier> {
        self.segments.iter().map(|s| s.identifier.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<Vec<RoutingEntry>> for Path {
    fn from(segments: Vec<RoutingEntry>) -> Self {
        Self { segments }
    }
}

impl<E: Into<RoutingEntry>> FromIterator<E> for Path {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment.identifier)?;
        }
        Ok(())
    }
}
