//! Avatar image references.
//!
//! An avatar is never decoded by the client. It travels as an opaque string:
//! either a remote image URL or an inline `data:image/...` URL built from a
//! local file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Built-in avatars offered by the lobby. The first entry is the fallback for
/// references that cannot be displayed.
pub const DEFAULT_AVATARS: [&str; 3] = [
    "https://api.multiavatar.com/johndoe.svg",
    "https://api.multiavatar.com/Starcrasher.png",
    "https://api.multiavatar.com/BinxBond.png",
];

const DATA_IMAGE_PREFIX: &str = "data:image/";
const FALLBACK_LABEL: &str = "avatar";
const INLINE_LABEL: &str = "custom";

/// Opaque reference to an avatar image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvatarRef(String);

impl AvatarRef {
    /// Wrap a raw reference without validating it.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// One of the built-in avatars. Wraps around past the end of the set.
    pub fn builtin(index: usize) -> Self {
        Self::new(DEFAULT_AVATARS[index % DEFAULT_AVATARS.len()])
    }

    /// Raw reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Position in [`DEFAULT_AVATARS`]. `None` for custom references.
    pub fn builtin_index(&self) -> Option<usize> {
        DEFAULT_AVATARS.iter().position(|url| *url == self.0)
    }

    /// Whether the reference is an inline `data:` image.
    pub fn is_inline(&self) -> bool {
        self.0.starts_with(DATA_IMAGE_PREFIX)
    }

    /// Whether the reference points at something an image can be loaded from.
    pub fn is_displayable(&self) -> bool {
        if self.is_inline() {
            return self.0.contains(";base64,");
        }

        ["https://", "http://"]
            .iter()
            .filter_map(|scheme| self.0.strip_prefix(scheme))
            .any(|rest| rest.split('/').next().is_some_and(|host| !host.is_empty()))
    }

    /// This reference if displayable, otherwise the default avatar.
    pub fn or_default(&self) -> Self {
        if self.is_displayable() { self.clone() } else { Self::default() }
    }

    /// Short human label for text-only rendering.
    ///
    /// Remote avatars use their file stem (`johndoe.svg` becomes `johndoe`),
    /// inline images are labelled `custom`. References that cannot be
    /// displayed get the label of the default avatar.
    pub fn label(&self) -> String {
        let avatar = self.or_default();
        if avatar.is_inline() {
            return INLINE_LABEL.to_string();
        }

        let path = avatar.0.split(['?', '#']).next().unwrap_or_default();
        let file = path.rsplit('/').next().unwrap_or_default();
        let stem = file.split('.').next().unwrap_or_default();
        if stem.is_empty() { FALLBACK_LABEL.to_string() } else { stem.to_string() }
    }
}

impl Default for AvatarRef {
    fn default() -> Self {
        Self::builtin(0)
    }
}

impl fmt::Display for AvatarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AvatarRef {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

impl From<&str> for AvatarRef {
    fn from(reference: &str) -> Self {
        Self(reference.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_avatars_are_displayable() {
        for index in 0..DEFAULT_AVATARS.len() {
            let avatar = AvatarRef::builtin(index);
            assert!(avatar.is_displayable());
            assert_eq!(avatar.builtin_index(), Some(index));
        }
    }

    #[test]
    fn labels_use_file_stem() {
        assert_eq!(AvatarRef::builtin(0).label(), "johndoe");
        assert_eq!(AvatarRef::builtin(1).label(), "Starcrasher");
        assert_eq!(AvatarRef::new("https://cdn.example/u/ann.png?size=64").label(), "ann");
    }

    #[test]
    fn inline_images_are_custom() {
        let avatar = AvatarRef::new("data:image/png;base64,iVBORw0KGgo=");
        assert!(avatar.is_displayable());
        assert_eq!(avatar.label(), "custom");
        assert_eq!(avatar.builtin_index(), None);
    }

    #[test]
    fn broken_reference_falls_back_to_default() {
        for raw in ["", "not a url", "https://", "data:image/png,rawbytes", "ftp://x/y.png"] {
            let avatar = AvatarRef::new(raw);
            assert!(!avatar.is_displayable(), "{raw:?} should not be displayable");
            assert_eq!(avatar.or_default(), AvatarRef::default());
            assert_eq!(avatar.label(), "johndoe");
        }
    }

    #[test]
    fn builtin_wraps_around() {
        assert_eq!(AvatarRef::builtin(DEFAULT_AVATARS.len()), AvatarRef::builtin(0));
    }
}
