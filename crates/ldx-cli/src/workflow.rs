//! Export, import and listing workflows behind the CLI commands.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span};

use ldx_dom::read_document;
use ldx_engine::export::{DEPENDENCIES_TAG, DEPENDENCY_TAG, EXPORTED_ATTR};
use ldx_engine::{
    AliasTranslator, LayerExporter, LayerImporter, METADATA_EXTENSION, STYLING_EXTENSION,
    TranslationStore,
};
use ldx_model::LayerId;
use ldx_project::layer::{NAME_TAG, TYPE_ATTR};
use ldx_project::tree::{GROUP_NAME_ATTR, GROUP_TAG};
use ldx_project::{Project, load_project, save_project};

/// What an export run produced.
#[derive(Debug)]
pub struct ExportOutcome {
    pub output_dir: PathBuf,
    /// Identities written, including dependencies, in sorted order.
    pub written: Vec<LayerId>,
}

/// Exports the named layers (and their dependency closures) from a project
/// document into definition pairs under `output_dir`.
pub fn export_layers(
    project_path: &Path,
    layer_ids: &[String],
    output_dir: &Path,
) -> Result<ExportOutcome> {
    let span = info_span!("export", project = %project_path.display());
    let _guard = span.enter();

    let project = load_project(project_path)
        .with_context(|| format!("load project {}", project_path.display()))?;
    let mut exporter = LayerExporter::new(&project, output_dir);
    for id in layer_ids {
        exporter
            .export_layer(id.as_str().into())
            .with_context(|| format!("export layer '{id}'"))?;
    }
    let written: Vec<LayerId> = exporter.exported().cloned().collect();
    info!(count = written.len(), dir = %output_dir.display(), "export finished");
    Ok(ExportOutcome {
        output_dir: output_dir.to_path_buf(),
        written,
    })
}

/// Inputs for [`import_layers`].
pub struct ImportOptions {
    /// Directory holding the definition pairs.
    pub definitions_dir: PathBuf,
    /// Identities to import.
    pub identities: Vec<String>,
    /// Project document to update; created when it does not exist yet.
    pub project_path: PathBuf,
    /// Service every imported datasource is rewritten to, when set.
    pub target_service: Option<String>,
    /// Qt Linguist file feeding layer name and alias translation.
    pub translation_file: Option<PathBuf>,
    /// Locale used to pick translations and display columns.
    pub locale: String,
}

/// What an import run produced.
#[derive(Debug)]
pub struct ImportOutcome {
    pub project_path: PathBuf,
    /// Identities named on the command line, in request order.
    pub loaded: Vec<LayerId>,
    /// Layers in the project after the import.
    pub layer_count: usize,
    /// Relations in the project after the import.
    pub relation_count: usize,
}

/// Imports definition pairs into a project document and saves it back.
pub fn import_layers(options: &ImportOptions) -> Result<ImportOutcome> {
    let span = info_span!("import", project = %options.project_path.display());
    let _guard = span.enter();

    let mut project = if options.project_path.is_file() {
        load_project(&options.project_path)
            .with_context(|| format!("load project {}", options.project_path.display()))?
    } else {
        info!(path = %options.project_path.display(), "project document not found, starting empty");
        Project::new()
    };

    let mut importer = LayerImporter::new(&mut project, &options.definitions_dir);
    if let Some(service) = &options.target_service {
        importer = importer.with_target_service(service);
    }
    if let Some(path) = &options.translation_file {
        let store = TranslationStore::open(path)?;
        importer.add_processor(Box::new(AliasTranslator::new(store, options.locale.clone())));
    }

    let mut loaded = Vec::new();
    for identity in &options.identities {
        let identity = LayerId::new(identity)
            .with_context(|| format!("invalid layer identity '{identity}'"))?;
        importer
            .load_layer(&identity)
            .with_context(|| format!("import layer '{identity}'"))?;
        loaded.push(identity);
    }
    drop(importer);

    save_project(&options.project_path, &project)
        .with_context(|| format!("save project {}", options.project_path.display()))?;
    info!(
        layers = project.registry.len(),
        relations = project.relations.len(),
        "import finished"
    );
    Ok(ImportOutcome {
        project_path: options.project_path.clone(),
        loaded,
        layer_count: project.registry.len(),
        relation_count: project.relations.len(),
    })
}

/// One definition pair found by [`list_definitions`].
pub struct DefinitionEntry {
    pub identity: String,
    /// Display name stored in the metadata document.
    pub name: String,
    /// Layer kind attribute, verbatim.
    pub kind: String,
    /// Export timestamp attribute, verbatim.
    pub exported: String,
    /// Number of dependency entries recorded in the metadata document.
    pub dependencies: usize,
    /// Layer tree placement, `/`-joined; empty when the layer sits at the root.
    pub tree_path: String,
    /// Whether the matching styling document exists.
    pub has_styling: bool,
}

/// Lists the definition pairs in a directory, sorted by identity.
pub fn list_definitions(dir: &Path) -> Result<Vec<DefinitionEntry>> {
    let listing = fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))?;
    let mut entries = Vec::new();
    for entry in listing {
        let path = entry
            .with_context(|| format!("read directory {}", dir.display()))?
            .path();
        if path.extension().and_then(OsStr::to_str) != Some(METADATA_EXTENSION) {
            continue;
        }
        let Some(identity) = path.file_stem().and_then(OsStr::to_str) else {
            continue;
        };
        let doc =
            read_document(&path).with_context(|| format!("read definition {}", path.display()))?;
        let dependencies = doc
            .first_child(DEPENDENCIES_TAG)
            .map_or(0, |list| list.children_named(DEPENDENCY_TAG).count());
        let mut segments = Vec::new();
        let mut group = doc.first_child(GROUP_TAG);
        while let Some(node) = group {
            segments.push(node.attr(GROUP_NAME_ATTR).unwrap_or_default());
            group = node.first_child(GROUP_TAG);
        }
        entries.push(DefinitionEntry {
            identity: identity.to_string(),
            name: doc.child_text(NAME_TAG).unwrap_or_default().to_string(),
            kind: doc.attr(TYPE_ATTR).unwrap_or_default().to_string(),
            exported: doc.attr(EXPORTED_ATTR).unwrap_or_default().to_string(),
            dependencies,
            tree_path: segments.join("/"),
            has_styling: path.with_extension(STYLING_EXTENSION).is_file(),
        });
    }
    entries.sort_by(|a, b| a.identity.cmp(&b.identity));
    Ok(entries)
}
