//! Embedded static assets using rust-embed.

use mime_guess::mime;
use rust_embed::Embed;

/// Static assets embedded in the binary.
#[derive(Embed)]
#[folder = "src/assets/"]
pub struct StaticAssets;

/// Get the content type for a path based on its extension.
pub fn content_type(path: &str) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() == mime::TEXT || mime.subtype() == mime::JAVASCRIPT {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.essence_str().to_string()
    }
}
