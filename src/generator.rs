//! Code generators: a fixed, compile-time registry of `Generator`
//! implementations invoked by name from the manifest's `generators` map.
//! Discovering generator plugins at runtime is out of scope — this
//! registry is a plain `Vec` built once per process.

use std::path::Path;

use nexema_core::definition::TypeDefinition;

use crate::error::{NexemaError, NexemaResult};
use crate::manifest::GeneratorConfig;

/// A single named output target. `generate` receives every `TypeDefinition`
/// in the snapshot and the generator's own unparsed config; it owns writing
/// whatever files it produces under `output_dir`.
pub trait Generator {
    fn name(&self) -> &'static str;

    fn generate(&self, output_dir: &Path, config: &GeneratorConfig, types: &[TypeDefinition]) -> NexemaResult<()>;
}

/// Writes each `TypeDefinition` back out as a standalone `.json` file, named
/// by its fully-qualified name with `/` replaced by `_` so nested package
/// paths stay within one flat output directory. A worked example of the
/// `Generator` contract rather than a real per-language emitter.
pub struct JsonGenerator;

impl Generator for JsonGenerator {
    fn name(&self) -> &'static str {
        "json"
    }

    fn generate(&self, output_dir: &Path, _config: &GeneratorConfig, types: &[TypeDefinition]) -> NexemaResult<()> {
        std::fs::create_dir_all(output_dir).map_err(|source| NexemaError::SnapshotWrite {
            path: output_dir.to_path_buf(),
            source,
        })?;

        for ty in types {
            let file_name = format!("{}.json", ty.fully_qualified_name.replace('/', "_"));
            let path = output_dir.join(file_name);
            let contents = serde_json::to_string_pretty(ty).map_err(|source| NexemaError::GeneratorFailed {
                name: self.name().to_string(),
                message: source.to_string(),
            })?;
            std::fs::write(&path, contents).map_err(|source| NexemaError::SnapshotWrite { path, source })?;
        }

        Ok(())
    }
}

/// The fixed set of generators known to this build. Adding a new generator
/// means adding a variant here, not loading a plugin.
pub struct GeneratorRegistry {
    generators: Vec<Box<dyn Generator>>,
}

impl GeneratorRegistry {
    pub fn standard() -> Self {
        GeneratorRegistry {
            generators: vec![Box::new(JsonGenerator)],
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Generator> {
        self.generators.iter().find(|g| g.name() == name).map(|g| g.as_ref())
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
