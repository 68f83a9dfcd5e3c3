use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Which of the two catalogs an item lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Lesson,
    Tool,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lesson => "lesson",
            Self::Tool => "tool",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lesson" | "lessons" => Ok(Self::Lesson),
            "tool" | "tools" => Ok(Self::Tool),
            other => Err(DomainError::UnknownContentKind(other.to_owned())),
        }
    }
}

/// Minimal view shared by lessons and tools.
///
/// Tag and category matching is written once against this trait; only the
/// strong-tier relation differs between catalog pairings.
pub trait ContentItem {
    fn kind(&self) -> ContentKind;
    fn id(&self) -> &ContentId;
    fn title(&self) -> &str;
    fn category(&self) -> &str;
    fn tags(&self) -> &BTreeSet<String>;
    fn related_ids(&self) -> &[ContentId];

    /// Grouping key used for same-catalog comparisons. Tools have none.
    fn grouping_key(&self) -> Option<&str> {
        None
    }

    fn shares_tag_with(&self, other: &dyn ContentItem) -> bool {
        !self.tags().is_disjoint(other.tags())
    }

    fn is_related_to(&self, other: &dyn ContentItem) -> bool {
        self.related_ids().iter().any(|related| related == other.id())
    }
}

/// Case-insensitive form of a category, used for weak matching.
pub fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: ContentId,
    pub title: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub related_ids: Vec<ContentId>,
}

impl Lesson {
    pub fn new(id: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: ContentId::new(id),
            title: title.into(),
            category: category.into(),
            module: None,
            tags: BTreeSet::new(),
            related_ids: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_ids = related.into_iter().map(ContentId::new).collect();
        self
    }
}

impl ContentItem for Lesson {
    fn kind(&self) -> ContentKind {
        ContentKind::Lesson
    }

    fn id(&self) -> &ContentId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    fn related_ids(&self) -> &[ContentId] {
        &self.related_ids
    }

    fn grouping_key(&self) -> Option<&str> {
        self.module.as_deref().filter(|module| !module.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: ContentId,
    pub title: String,
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub related_ids: Vec<ContentId>,
}

impl Tool {
    pub fn new(id: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: ContentId::new(id),
            title: title.into(),
            category: category.into(),
            tags: BTreeSet::new(),
            related_ids: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_ids = related.into_iter().map(ContentId::new).collect();
        self
    }
}

impl ContentItem for Tool {
    fn kind(&self) -> ContentKind {
        ContentKind::Tool
    }

    fn id(&self) -> &ContentId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    fn related_ids(&self) -> &[ContentId] {
        &self.related_ids
    }
}

// Catalog feeds emit `null` for missing optional collections.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
