use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::MetaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Yes,
    No,
    Unknown,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Yes => "yes",
            Classification::No => "no",
            Classification::Unknown => "unknown",
        }
    }
}

/// Optional allow-list of experiment accessions, one per line.
///
/// An empty file classifies everything as unknown, same as no file at all;
/// it does not turn every row into "no".
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    accessions: Option<HashSet<String>>,
}

impl AllowList {
    pub fn none() -> Self {
        Self { accessions: None }
    }

    pub fn load(path: &Path) -> Result<Self, MetaError> {
        let content =
            fs::read_to_string(path).map_err(|_| MetaError::AllowListRead(path.to_path_buf()))?;
        Self::from_lines(content.lines())
    }

    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self, MetaError> {
        let mut accessions = HashSet::new();
        for (number, line) in lines.into_iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.split_whitespace().count() > 1 {
                return Err(MetaError::MalformedAllowList {
                    line: number + 1,
                    content: line.to_string(),
                });
            }
            accessions.insert(trimmed.to_string());
        }
        if accessions.is_empty() {
            return Ok(Self::none());
        }
        Ok(Self {
            accessions: Some(accessions),
        })
    }

    pub fn classify(&self, accession: &str) -> Classification {
        match &self.accessions {
            None => Classification::Unknown,
            Some(set) if set.contains(accession) => Classification::Yes,
            Some(_) => Classification::No,
        }
    }
}
