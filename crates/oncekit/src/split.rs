use crate::error::CatalogError;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A partition of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Split {
    /// annotated training sequences
    Train,
    /// annotated validation sequences
    Val,
    /// test sequences, annotations withheld
    Test,
    /// small unlabeled subset
    RawSmall,
    /// medium unlabeled subset
    RawMedium,
    /// large unlabeled subset
    RawLarge,
}

impl Split {
    /// Every split.
    pub const ALL: [Split; 6] = [
        Split::Train,
        Split::Val,
        Split::Test,
        Split::RawSmall,
        Split::RawMedium,
        Split::RawLarge,
    ];

    /// Resolution order of a sequence listed in several splits, first match wins.
    pub const PRIORITY: [Split; 6] = [
        Split::RawSmall,
        Split::RawMedium,
        Split::RawLarge,
        Split::Train,
        Split::Test,
        Split::Val,
    ];

    /// The split name, also the stem of its list file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
            Split::RawSmall => "raw_small",
            Split::RawMedium => "raw_medium",
            Split::RawLarge => "raw_large",
        }
    }

    /// Whether frames of this split carry annotations.
    pub fn has_annotations(&self) -> bool {
        matches!(self, Split::Train | Split::Val)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Split::ALL
            .into_iter()
            .find(|split| split.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownSplit(s.to_string()))
    }
}

/// Sequence ids listed by each split file.
///
/// Every listed id is resolved once to its split following [`Split::PRIORITY`].
#[derive(Debug, Clone, Default)]
pub struct SplitLists {
    lists: HashMap<Split, Vec<String>>,
    resolved: HashMap<String, Split>,
}

impl SplitLists {
    /// Build the lists from in-memory sequence ids.
    pub fn from_lists<I, S>(lists: I) -> Self
    where
        I: IntoIterator<Item = (Split, Vec<S>)>,
        S: Into<String>,
    {
        let mut out = Self::default();
        for (split, ids) in lists {
            let entry = out.lists.entry(split).or_default();
            let mut seen: HashSet<String> = entry.iter().cloned().collect();
            for id in ids {
                let id = id.into();
                if seen.insert(id.clone()) {
                    entry.push(id);
                }
            }
        }
        out.resolve_all();
        out
    }

    /// Read `<split>.txt` for every split from the `ImageSets` directory.
    ///
    /// A missing file is an empty split.
    pub fn from_dir(image_sets: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let image_sets = image_sets.as_ref();
        let mut lists = Vec::with_capacity(Split::ALL.len());
        for split in Split::ALL {
            let path = image_sets.join(format!("{}.txt", split.as_str()));
            if !path.is_file() {
                log::debug!("no list file for split {split} at {}", path.display());
                continue;
            }
            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(source) => return Err(CatalogError::SplitListError { path, source }),
            };
            lists.push((split, parse_list(&text)));
        }
        Ok(Self::from_lists(lists))
    }

    /// The sequence ids of a split in file order.
    pub fn sequences(&self, split: Split) -> &[String] {
        self.lists.get(&split).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `seq_id` is listed in `split`.
    pub fn contains(&self, split: Split, seq_id: &str) -> bool {
        self.lists
            .get(&split)
            .is_some_and(|ids| ids.iter().any(|id| id == seq_id))
    }

    /// The split a sequence belongs to.
    ///
    /// # Errors
    ///
    /// If the id is not listed in any split.
    pub fn resolve(&self, seq_id: &str) -> Result<Split, CatalogError> {
        self.resolved
            .get(seq_id)
            .copied()
            .ok_or_else(|| CatalogError::UnresolvedSequence {
                seq_id: seq_id.to_string(),
            })
    }

    fn resolve_all(&mut self) {
        self.resolved.clear();
        for split in Split::PRIORITY {
            let Some(ids) = self.lists.get(&split) else {
                continue;
            };
            for id in ids {
                self.resolved.entry(id.clone()).or_insert(split);
            }
        }
    }
}

/// Parse a newline separated list of sequence ids, skipping blank lines.
pub fn parse_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
