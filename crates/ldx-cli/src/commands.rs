use std::path::Path;

use anyhow::Result;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};

use ldx_cli::workflow::{self, ImportOptions};

use crate::cli::{ExportArgs, ImportArgs, ListArgs};

pub fn run_export(args: &ExportArgs) -> Result<()> {
    let output_dir = args.output_dir.clone().unwrap_or_else(|| {
        args.project
            .parent()
            .unwrap_or(Path::new("."))
            .join("definitions")
    });
    let outcome = workflow::export_layers(&args.project, &args.layers, &output_dir)?;
    println!(
        "Exported {} definition pair(s) to {}",
        outcome.written.len(),
        outcome.output_dir.display()
    );
    for identity in &outcome.written {
        println!("  {identity}");
    }
    Ok(())
}

pub fn run_import(args: &ImportArgs) -> Result<()> {
    let options = ImportOptions {
        definitions_dir: args.definitions_dir.clone(),
        identities: args.identities.clone(),
        project_path: args.project.clone(),
        target_service: args.service.clone(),
        translation_file: args.translations.clone(),
        locale: args.locale.clone(),
    };
    let outcome = workflow::import_layers(&options)?;
    println!(
        "Imported {} definition(s) into {}",
        outcome.loaded.len(),
        outcome.project_path.display()
    );
    println!(
        "Project now holds {} layer(s) and {} relation(s)",
        outcome.layer_count, outcome.relation_count
    );
    Ok(())
}

pub fn run_list(args: &ListArgs) -> Result<()> {
    let entries = workflow::list_definitions(&args.definitions_dir)?;
    if entries.is_empty() {
        println!("No definition pairs in {}", args.definitions_dir.display());
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec![
        "Identity",
        "Name",
        "Kind",
        "Deps",
        "Tree path",
        "Exported",
        "Styling",
    ]);
    apply_table_style(&mut table);
    for entry in entries {
        table.add_row(vec![
            entry.identity,
            entry.name,
            entry.kind,
            entry.dependencies.to_string(),
            entry.tree_path,
            entry.exported,
            if entry.has_styling {
                "yes".to_string()
            } else {
                "missing".to_string()
            },
        ]);
    }
    println!("{table}");
    Ok(())
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}
