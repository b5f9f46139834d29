//! Custom avatar loading.
//!
//! Reads an image file from disk and turns it into an inline `data:` URL
//! avatar. Only common web image formats under [`MAX_AVATAR_BYTES`] are
//! accepted.

use std::{fs, io, path::Path};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use partyline_client::AvatarRef;
use thiserror::Error;

/// Largest accepted avatar file.
pub const MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;

/// Avatar loading errors.
#[derive(Debug, Error)]
pub enum AvatarError {
    /// The file is not a supported image.
    #[error("not an image file")]
    NotAnImage,

    /// The file exceeds [`MAX_AVATAR_BYTES`].
    #[error("image is {size} bytes, limit is {MAX_AVATAR_BYTES}")]
    TooLarge {
        /// File size in bytes.
        size: u64,
    },

    /// The file could not be read.
    #[error("failed to read image: {0}")]
    Read(#[from] io::Error),
}

impl AvatarError {
    /// Text to show the user.
    pub fn notice(&self) -> &'static str {
        match self {
            Self::NotAnImage => "Please upload an image file",
            Self::TooLarge { .. } => "Image size should be less than 5MB",
            Self::Read(_) => "Failed to read image file",
        }
    }
}

/// Load the image at `path` as an inline avatar.
pub fn load_custom(path: &Path) -> Result<AvatarRef, AvatarError> {
    let size = fs::metadata(path)?.len();
    if size > MAX_AVATAR_BYTES {
        return Err(AvatarError::TooLarge { size });
    }

    let data = fs::read(path)?;
    let mime = sniff_mime(&data)
        .or_else(|| extension_mime(path))
        .ok_or(AvatarError::NotAnImage)?;

    tracing::debug!(path = %path.display(), mime, size, "loaded custom avatar");
    Ok(AvatarRef::new(format!("data:{mime};base64,{}", STANDARD.encode(&data))))
}

/// Image type from the file's leading bytes.
fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

    if data.starts_with(PNG) {
        Some("image/png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Image type from the file extension. SVG is text, so this is the only way
/// it is recognized.
fn extension_mime(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::{fs::File, path::PathBuf};

    use super::*;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("partyline-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn png_becomes_data_url() {
        let path = temp_file("avatar.png", b"\x89PNG\r\n\x1a\nrest");
        let avatar = load_custom(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(avatar.as_str().starts_with("data:image/png;base64,"));
        assert!(avatar.is_inline());
        assert!(avatar.is_displayable());
    }

    #[test]
    fn content_wins_over_extension() {
        let path = temp_file("really-a-gif.png", b"GIF89a....");
        let avatar = load_custom(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(avatar.as_str().starts_with("data:image/gif;base64,"));
    }

    #[test]
    fn svg_is_recognized_by_extension() {
        let path = temp_file("face.svg", b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>");
        let avatar = load_custom(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(avatar.as_str().starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn text_file_is_rejected() {
        let path = temp_file("notes.txt", b"hello");
        let err = load_custom(&path).unwrap_err();
        fs::remove_file(&path).unwrap();

        assert!(matches!(err, AvatarError::NotAnImage));
        insta::assert_snapshot!(err.notice(), @"Please upload an image file");
    }

    #[test]
    fn oversized_file_is_rejected() {
        let path = std::env::temp_dir().join(format!("partyline-{}-big.png", std::process::id()));
        File::create(&path).unwrap().set_len(MAX_AVATAR_BYTES + 1).unwrap();
        let err = load_custom(&path).unwrap_err();
        fs::remove_file(&path).unwrap();

        assert!(matches!(err, AvatarError::TooLarge { size } if size == MAX_AVATAR_BYTES + 1));
        insta::assert_snapshot!(err.notice(), @"Image size should be less than 5MB");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_custom(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, AvatarError::Read(_)));
        assert_eq!(err.notice(), "Failed to read image file");
    }
}
