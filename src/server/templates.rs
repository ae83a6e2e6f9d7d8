//! Template rendering using minijinja with embedded templates.

use minijinja::{Environment, Error as JinjaError, ErrorKind};
use rust_embed::Embed;
use serde::Serialize;

use crate::storage::StoredFile;

/// Embedded HTML templates.
#[derive(Embed)]
#[folder = "templates/"]
pub struct Templates;

/// A template engine for rendering pages.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates.
    pub fn new() -> Result<Self, JinjaError> {
        let mut env = Environment::new();

        for file in Templates::iter() {
            let filename = file.to_string();
            if let Some(content) = Templates::get(&filename) {
                let template_str = std::str::from_utf8(content.data.as_ref())
                    .map_err(|_| JinjaError::from(ErrorKind::InvalidOperation))?;
                env.add_template_owned(filename, template_str.to_string())?;
            }
        }

        Ok(Self { env })
    }

    /// Render the home page.
    pub fn render_index(&self, view: &IndexView) -> Result<String, JinjaError> {
        let template = self.env.get_template("index.html")?;
        template.render(minijinja::context! { page => view })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new().expect("failed to initialize template engine")
    }
}

/// A view model for the home page.
#[derive(Debug, Clone, Serialize)]
pub struct IndexView {
    pub server_url: String,
    /// Base64 PNG of the QR code for `server_url`.
    pub qr_data: String,
    pub files: Vec<FileView>,
    pub devices: Vec<String>,
}

/// A view model for one row of the file list.
#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    pub name: String,
    pub size: String,
    pub modified: String,
}

impl From<&StoredFile> for FileView {
    fn from(file: &StoredFile) -> Self {
        Self {
            name: file.name.clone(),
            size: file.human_size(),
            modified: file.modified_display(),
        }
    }
}
