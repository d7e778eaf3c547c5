use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid name {0:?}: must be a plain file name")]
    InvalidName(String),

    #[error("{0:?} is used by more than one entry")]
    DuplicateName(String),
}

/// A group of URLs saved as `{name}_{n}.{ext}`, numbered from 1 in list order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub name: String,
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedFile {
    pub file_name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manifest {
    pub output_dir: PathBuf,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub files: Vec<NamedFile>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(text)?;

        manifest
            .categories
            .iter()
            .map(|category| &category.name)
            .chain(manifest.files.iter().map(|file| &file.file_name))
            .try_for_each(|name| check_name(name))?;

        manifest.check_unique_targets()?;

        Ok(manifest)
    }

    // Every output file must come from exactly one entry.
    fn check_unique_targets(&self) -> Result<(), ManifestError> {
        let category_names = self.categories.iter().map(|c| c.name.as_str());
        let file_names = self.files.iter().map(|f| f.file_name.as_str());

        for names in [category_names.collect_vec(), file_names.collect_vec()] {
            if let Some(name) = names.into_iter().duplicates().next() {
                return Err(ManifestError::DuplicateName(name.to_string()));
            }
        }

        // An explicit `alpha_1.jpg` would land on the first `alpha` image whatever its extension.
        for file in &self.files {
            let clash = self.categories.iter().any(|category| {
                (1..=category.urls.len())
                    .any(|n| file.file_name.starts_with(&format!("{}_{}.", category.name, n)))
            });

            if clash {
                return Err(ManifestError::DuplicateName(file.file_name.clone()));
            }
        }

        Ok(())
    }

    /// Categories in declaration order, then named files.
    pub fn requests(&self) -> Vec<ImageRequest> {
        let sequenced = self.categories.iter().flat_map(|category| {
            category
                .urls
                .iter()
                .enumerate()
                .map(move |(i, url)| ImageRequest::sequenced(&category.name, i + 1, url))
        });

        let named = self
            .files
            .iter()
            .map(|file| ImageRequest::named(&file.file_name, &file.url));

        sequenced.chain(named).collect_vec()
    }
}

fn check_name(name: &str) -> Result<(), ManifestError> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');

    if bad {
        return Err(ManifestError::InvalidName(name.to_string()));
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub category: String,
    pub index: usize,
    pub source: String,
    pub file_name: Option<String>,
}

impl ImageRequest {
    pub fn sequenced(category: &str, index: usize, source: &str) -> Self {
        Self {
            category: category.to_string(),
            index,
            source: source.to_string(),
            file_name: None,
        }
    }

    pub fn named(file_name: &str, source: &str) -> Self {
        Self {
            category: file_name.to_string(),
            index: 1,
            source: source.to_string(),
            file_name: Some(file_name.to_string()),
        }
    }

    pub fn file_name_for(&self, extension: &str) -> String {
        match &self.file_name {
            Some(name) => name.clone(),
            None => format!("{}_{}.{}", self.category, self.index, extension),
        }
    }

    pub fn label(&self) -> String {
        match &self.file_name {
            Some(name) => name.clone(),
            None => format!("{} #{}", self.category, self.index),
        }
    }
}
