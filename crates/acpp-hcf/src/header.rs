//! Integration headers: an HCF object embedded as a C++ byte array plus its
//! static registration.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use uuid::Uuid;

use crate::error::{HcfError, Result};
use crate::generator::HcfGenerator;

/// One backend's HCF object and the header that embeds it.
#[derive(Debug, Clone)]
pub struct IntegrationHeader {
    object_id: u64,
    backend: String,
    hcf: HcfGenerator,
}

impl IntegrationHeader {
    /// A header for `backend` with a freshly drawn random object id.
    pub fn new(backend: impl Into<String>) -> Self {
        let (object_id, _) = Uuid::new_v4().as_u64_pair();
        Self::with_object_id(backend, object_id)
    }

    /// A header with a fixed object id.
    pub fn with_object_id(backend: impl Into<String>, object_id: u64) -> Self {
        let mut hcf = HcfGenerator::new();
        let root = hcf.root_mut();
        root.set_attribute("object-id", object_id.to_string());
        root.set_attribute("generator", "acpp");
        Self {
            object_id,
            backend: backend.into(),
            hcf,
        }
    }

    pub fn object_id(&self) -> u64 {
        self.object_id
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn hcf(&self) -> &HcfGenerator {
        &self.hcf
    }

    /// The embedded object, for attaching device images.
    pub fn hcf_mut(&mut self) -> &mut HcfGenerator {
        &mut self.hcf
    }

    /// Render the header text.
    pub fn render(&self) -> String {
        let ident = sanitize_identifier(&self.backend);
        let upper = ident.to_ascii_uppercase();
        let lower = ident.to_ascii_lowercase();
        let id = self.object_id;
        let size = self.hcf.serialize().len();
        let hex = self.hcf.hex_escape();
        format!(
            "#ifndef ACPP_{upper}_INTEGRATION_HEADER\n\
             #define ACPP_{upper}_INTEGRATION_HEADER\n\
             \n\
             static const std::size_t __acpp_local_{lower}_hcf_object_id = {id}ull;\n\
             const unsigned char __acpp_hcf_object_{id} [] = {{ {hex} }};\n\
             ACPP_STATIC_HCF_REGISTRATION({id}ull, __acpp_hcf_object_{id}, {size})\n\
             \n\
             #endif\n"
        )
    }

    /// Write the rendered header to `path`, replacing any existing file.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let io_err = |source| HcfError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.render().as_bytes()).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        log::debug!(
            "wrote {} integration header (object {}) to {}",
            self.backend,
            self.object_id,
            path.display()
        );
        Ok(())
    }
}

/// Backend names such as `cuda-nvcxx` are not valid C identifiers.
fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
