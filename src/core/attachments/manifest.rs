//! Attachment descriptors and the per-category manifest stored on a part
//!
//! A manifest is persisted as a JSON array of `{name, size, type, path}`
//! objects. Order is upload order; entries only leave through an explicit
//! removal.

use serde::{Deserialize, Serialize};

/// One uploaded file as recorded in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    /// File name actually used on disk
    pub name: String,

    /// Preformatted size, e.g. "10.00 KB"
    pub size: String,

    /// Declared MIME type
    #[serde(rename = "type")]
    pub content_type: String,

    /// Path relative to the upload root, always `/`-separated
    pub path: String,
}

/// Ordered list of descriptors for one category of one part
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: Vec<AttachmentDescriptor>,
}

/// Result of a lenient decode: the manifest plus what went wrong, if anything
#[derive(Debug, Clone, Default)]
pub struct DecodedManifest {
    pub manifest: Manifest,
    pub warning: Option<String>,
}

impl Manifest {
    pub fn new(entries: Vec<AttachmentDescriptor>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AttachmentDescriptor] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<AttachmentDescriptor> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttachmentDescriptor> {
        self.entries.iter()
    }

    /// Strict decode. Blank text and a literal `null` are an empty manifest.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Self::default());
        }
        serde_json::from_str(trimmed)
    }

    /// Lenient decode used for stored manifests
    ///
    /// Undecodable text yields an empty manifest and a warning instead of an
    /// error; the warning is also logged.
    pub fn decode(text: Option<&str>) -> DecodedManifest {
        let Some(text) = text else {
            return DecodedManifest::default();
        };

        match Self::parse(text) {
            Ok(manifest) => DecodedManifest {
                manifest,
                warning: None,
            },
            Err(e) => {
                let warning = format!("stored attachment list is not valid JSON ({}); treating it as empty", e);
                tracing::warn!("{}", warning);
                DecodedManifest {
                    manifest: Self::default(),
                    warning: Some(warning),
                }
            }
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    /// Append descriptors at the end, keeping their order
    pub fn append(&mut self, descriptors: impl IntoIterator<Item = AttachmentDescriptor>) {
        self.entries.extend(descriptors);
    }

    /// Remove the first descriptor whose name matches exactly
    pub fn remove_named(&mut self, name: &str) -> Option<AttachmentDescriptor> {
        let index = self.entries.iter().position(|d| d.name == name)?;
        Some(self.entries.remove(index))
    }

    /// Replace the leading path segment of every descriptor
    pub fn rebase(&mut self, new_prefix: &str) {
        for descriptor in &mut self.entries {
            descriptor.path = match descriptor.path.split_once('/') {
                Some((_, rest)) => format!("{}/{}", new_prefix, rest),
                None => new_prefix.to_string(),
            };
        }
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a AttachmentDescriptor;
    type IntoIter = std::slice::Iter<'a, AttachmentDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Combine stored manifest text with freshly ingested descriptors
///
/// Existing entries are never dropped: they come first, the new descriptors
/// follow in the order given.
pub fn merge(existing: Option<&str>, new: &[AttachmentDescriptor]) -> Result<String, serde_json::Error> {
    let mut manifest = Manifest::decode(existing).manifest;
    manifest.append(new.iter().cloned());
    manifest.encode()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, part: &str) -> AttachmentDescriptor {
        AttachmentDescriptor {
            name: name.to_string(),
            size: "1.00 KB".to_string(),
            content_type: "image/jpeg".to_string(),
            path: format!("{}/photos/{}", part, name),
        }
    }

    fn names(text: &str) -> Vec<String> {
        Manifest::parse(text)
            .unwrap()
            .iter()
            .map(|d| d.name.clone())
            .collect()
    }

    #[test]
    fn test_encoding_uses_type_field() {
        let manifest = Manifest::new(vec![descriptor("a.jpg", "p-100")]);
        let text = manifest.encode().unwrap();
        assert_eq!(
            text,
            r#"[{"name":"a.jpg","size":"1.00 KB","type":"image/jpeg","path":"p-100/photos/a.jpg"}]"#
        );
        assert_eq!(Manifest::parse(&text).unwrap(), manifest);
    }

    #[test]
    fn test_parse_blank_and_null_are_empty() {
        assert!(Manifest::parse("").unwrap().is_empty());
        assert!(Manifest::parse("  ").unwrap().is_empty());
        assert!(Manifest::parse("null").unwrap().is_empty());
        assert!(Manifest::parse("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_invalid_text_records_warning() {
        let decoded = Manifest::decode(Some("{not json"));
        assert!(decoded.manifest.is_empty());
        assert!(decoded.warning.unwrap().contains("not valid JSON"));

        let decoded = Manifest::decode(None);
        assert!(decoded.manifest.is_empty());
        assert!(decoded.warning.is_none());
    }

    #[test]
    fn test_merge_appends_in_order() {
        let existing = Manifest::new(vec![descriptor("a.jpg", "p")]).encode().unwrap();
        let merged = merge(Some(&existing), &[descriptor("b.jpg", "p"), descriptor("c.jpg", "p")]).unwrap();
        assert_eq!(names(&merged), vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_merge_with_nothing_new_keeps_existing() {
        let existing = Manifest::new(vec![descriptor("a.jpg", "p"), descriptor("b.jpg", "p")])
            .encode()
            .unwrap();
        let merged = merge(Some(&existing), &[]).unwrap();
        assert_eq!(names(&merged), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_merge_is_associative() {
        let m = Manifest::new(vec![descriptor("m.jpg", "p")]).encode().unwrap();
        let a = vec![descriptor("a1.jpg", "p"), descriptor("a2.jpg", "p")];
        let b = vec![descriptor("b1.jpg", "p")];

        let stepwise = merge(Some(&merge(Some(&m), &a).unwrap()), &b).unwrap();
        let combined: Vec<_> = a.iter().chain(b.iter()).cloned().collect();
        let at_once = merge(Some(&m), &combined).unwrap();

        assert_eq!(stepwise, at_once);
        assert_eq!(names(&stepwise), vec!["m.jpg", "a1.jpg", "a2.jpg", "b1.jpg"]);
    }

    #[test]
    fn test_merge_over_invalid_text_starts_fresh() {
        let merged = merge(Some("garbage"), &[descriptor("a.jpg", "p")]).unwrap();
        assert_eq!(names(&merged), vec!["a.jpg"]);
    }

    #[test]
    fn test_remove_named_takes_first_exact_match() {
        let mut manifest = Manifest::new(vec![
            descriptor("x.png", "p"),
            descriptor("y.png", "p"),
            descriptor("x.png", "q"),
        ]);

        let removed = manifest.remove_named("x.png").unwrap();
        assert_eq!(removed.path, "p/photos/x.png");
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.entries()[0].name, "y.png");
        assert_eq!(manifest.entries()[1].path, "q/photos/x.png");

        assert!(manifest.remove_named("X.PNG").is_none());
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_rebase_replaces_only_leading_segment() {
        let mut manifest = Manifest::new(vec![
            descriptor("a.jpg", "p-100"),
            AttachmentDescriptor {
                path: "lonely".to_string(),
                ..descriptor("b.jpg", "p-100")
            },
        ]);
        manifest.rebase("p-200");
        assert_eq!(manifest.entries()[0].path, "p-200/photos/a.jpg");
        assert_eq!(manifest.entries()[1].path, "p-200");
    }
}
