//! Upload locations and placeholder URLs

use crate::error::{Error, Result};
use crate::validators::FileExtensionValidator;

/// Directory, relative to the media root, for post images
pub const POST_IMAGE_DIR: &str = "blog/media/post_image";

/// Directory, relative to the media root, for profile pictures
pub const PROFILE_IMAGE_DIR: &str = "user_profile/media/user_image";

/// Shown for posts without an image
pub const POST_PLACEHOLDER: &str = "/static/img/placeholder.png";

/// Shown for profiles without a picture
pub const AVATAR_PLACEHOLDER: &str = "/static/img/default-avatar.png";

/// Public URL of a stored file, or `placeholder` when there is none
///
/// # Examples
///
/// ```
/// use quillpress_core::media::{image_url, POST_PLACEHOLDER};
///
/// assert_eq!(
/// 	image_url(Some("blog/media/post_image/a.png"), "/media/", POST_PLACEHOLDER),
/// 	"/media/blog/media/post_image/a.png"
/// );
/// assert_eq!(image_url(None, "/media/", POST_PLACEHOLDER), POST_PLACEHOLDER);
/// ```
pub fn image_url(path: Option<&str>, media_url: &str, placeholder: &str) -> String {
	match path.map(str::trim).filter(|p| !p.is_empty()) {
		Some(path) => format!(
			"{}/{}",
			media_url.trim_end_matches('/'),
			path.trim_start_matches('/')
		),
		None => placeholder.to_string(),
	}
}

/// Relative storage path for an uploaded image under `dir`
///
/// Only the final path component of `filename` is kept, and its extension
/// must be an accepted image type.
pub fn upload_path(dir: &str, filename: &str) -> Result<String> {
	let name = filename
		.rsplit(['/', '\\'])
		.next()
		.map(str::trim)
		.unwrap_or_default();
	if name.is_empty() || name == "." || name == ".." {
		return Err(Error::invalid("image", "No file was submitted."));
	}
	FileExtensionValidator::images()
		.validate_filename(name)
		.map_err(|e| {
			Error::invalid(
				"image",
				e.message.map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()),
			)
		})?;
	Ok(format!("{}/{}", dir.trim_end_matches('/'), name))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Some(""), "/static/img/default-avatar.png")]
	#[case(Some("  "), "/static/img/default-avatar.png")]
	#[case(Some("/user_profile/media/user_image/me.webp"), "/media/user_profile/media/user_image/me.webp")]
	fn test_image_url(#[case] path: Option<&str>, #[case] expected: &str) {
		assert_eq!(image_url(path, "/media", AVATAR_PLACEHOLDER), expected);
	}

	#[rstest]
	#[case("cover.png", "blog/media/post_image/cover.png")]
	#[case("../../etc/cover.JPG", "blog/media/post_image/cover.JPG")]
	#[case("C:\\photos\\cover.jpeg", "blog/media/post_image/cover.jpeg")]
	fn test_upload_path_keeps_file_name(#[case] filename: &str, #[case] expected: &str) {
		assert_eq!(upload_path(POST_IMAGE_DIR, filename).unwrap(), expected);
	}

	#[rstest]
	#[case("notes.txt")]
	#[case("uploads/")]
	#[case("..")]
	fn test_upload_path_rejects(#[case] filename: &str) {
		let err = upload_path(POST_IMAGE_DIR, filename).unwrap_err();
		assert!(err.form_errors().unwrap().has("image"));
	}
}
