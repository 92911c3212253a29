//! Label-to-files mapping produced by a classification run.

use serde::Serialize;

use super::ImageFile;

/// Files sharing the same top-predicted label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    /// Predicted label
    pub label: String,
    /// Files in classification order
    pub files: Vec<ImageFile>,
}

/// Mapping from label to the files classified under it.
///
/// Labels iterate in the order they were first created and a label is only
/// present while at least one file maps to it. Groups are never edited after a
/// run; a new run builds a new mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassifiedGroups {
    groups: Vec<Group>,
}

impl ClassifiedGroups {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file to the group for `label`, creating the group if absent.
    pub fn push(&mut self, label: &str, file: ImageFile) {
        match self.groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.files.push(file),
            None => self.groups.push(Group {
                label: label.to_string(),
                files: vec![file],
            }),
        }
    }

    /// Files for a label.
    pub fn get(&self, label: &str) -> Option<&[ImageFile]> {
        self.groups
            .iter()
            .find(|g| g.label == label)
            .map(|g| g.files.as_slice())
    }

    /// Labels in first-creation order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.label.as_str())
    }

    /// Groups in first-creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no file was classified.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of files across all groups.
    pub fn total_files(&self) -> usize {
        self.groups.iter().map(|g| g.files.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_creation_order() {
        let a = ImageFile::from_bytes("a.jpg", vec![]);
        let b = ImageFile::from_bytes("b.jpg", vec![]);
        let c = ImageFile::from_bytes("c.jpg", vec![]);

        let mut groups = ClassifiedGroups::new();
        groups.push("dog", a.clone());
        groups.push("cat", b.clone());
        groups.push("dog", c.clone());

        assert_eq!(groups.labels().collect::<Vec<_>>(), vec!["dog", "cat"]);
        assert_eq!(groups.get("dog"), Some(&[a, c][..]));
        assert_eq!(groups.get("cat"), Some(&[b][..]));
        assert_eq!(groups.total_files(), 3);
    }

    #[test]
    fn test_missing_label() {
        let groups = ClassifiedGroups::new();
        assert!(groups.get("cat").is_none());
        assert!(groups.is_empty());
    }
}
