//! Search Tags
//!
//! A small, sorted and lowercase-normalized tag set attached to every product.

use std::{cmp::Ordering, string::ToString};

use smallvec::SmallVec;

/// A string-based tag collection using `SmallVec<[String; 5]>`.
///
/// Tags are stored lowercased, sorted and deduplicated so lookups can binary search
/// and intersections can walk both sides once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTagCollection {
    tags: SmallVec<[String; 5]>,
}

impl StringTagCollection {
    /// Create a new tag collection, normalizing the given tags.
    #[must_use]
    pub fn new(tags: SmallVec<[String; 5]>) -> Self {
        let mut tags: SmallVec<[String; 5]> = tags
            .into_iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();

        tags.sort();
        tags.dedup();

        Self { tags }
    }

    /// Create a new tag collection from string slices.
    pub fn from_strs(tags: &[&str]) -> Self {
        Self::new(
            tags.iter()
                .map(ToString::to_string)
                .collect::<SmallVec<[String; 5]>>(),
        )
    }

    /// Create an empty collection.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tags: SmallVec::with_capacity(0),
        }
    }

    /// Check if this collection contains a tag (case-insensitive).
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.binary_search(&tag.trim().to_lowercase()).is_ok()
    }

    /// Check if any tag contains `needle` as a substring.
    ///
    /// `needle` must already be lowercased.
    pub fn any_contains(&self, needle: &str) -> bool {
        self.tags.iter().any(|tag| tag.contains(needle))
    }

    /// Check if this collection shares at least one tag with `other`.
    pub fn intersects(&self, other: &Self) -> bool {
        let mut left = self.tags.iter();
        let mut right = other.tags.iter();
        let mut left_tag = left.next();
        let mut right_tag = right.next();

        while let (Some(left_tag_ref), Some(right_tag_ref)) = (left_tag, right_tag) {
            match left_tag_ref.cmp(right_tag_ref) {
                Ordering::Equal => return true,
                Ordering::Less => left_tag = left.next(),
                Ordering::Greater => right_tag = right.next(),
            }
        }

        false
    }

    /// Add a tag to this collection.
    pub fn add(&mut self, tag: &str) {
        let tag = tag.trim().to_lowercase();

        if tag.is_empty() {
            return;
        }

        if let Err(pos) = self.tags.binary_search(&tag) {
            self.tags.insert(pos, tag);
        }
    }

    /// Iterate over the tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Get the number of tags in this collection.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if this collection is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
