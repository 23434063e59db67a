//! Translation collection and application.
//!
//! Imports can run against a Qt Linguist `.ts` translation file: known
//! translations are applied to layer names and field aliases, and every
//! string encountered is recorded back into the file so translators always
//! see the full message catalog. The store is append-only; existing entries,
//! translated or not, are never modified.

use std::path::PathBuf;

use tracing::{debug, info};

use ldx_dom::{Element, read_document, write_document};
use ldx_model::VALUE_CONFIG_KEY;
use ldx_project::MapLayer;

use crate::error::{EngineError, Result};
use crate::processor::ImportProcessor;

const TS_TAG: &str = "TS";
const LANGUAGE_ATTR: &str = "language";
const CONTEXT_TAG: &str = "context";
const CONTEXT_NAME_TAG: &str = "name";
const MESSAGE_TAG: &str = "message";
const SOURCE_TAG: &str = "source";
const TRANSLATION_TAG: &str = "translation";

/// Context prefix for field alias messages of one table.
const FIELD_CONTEXT_PREFIX: &str = "fld_";
/// Context prefix for layer name messages of one table.
const LAYER_CONTEXT_PREFIX: &str = "lyr_";
/// Tables named with this prefix hold fixed value lists and are skipped.
const VALUE_LIST_PREFIX: &str = "vl_";

/// An append-only message catalog backed by a Qt Linguist `.ts` file.
pub struct TranslationStore {
    path: PathBuf,
    doc: Element,
    pending: Vec<(String, String)>,
}

impl TranslationStore {
    /// Opens a store, reading the backing file when it exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = if path.is_file() {
            read_document(&path).map_err(|source| EngineError::TranslationRead {
                path: path.clone(),
                source,
            })?
        } else {
            debug!(path = %path.display(), "translation file not found, starting fresh");
            Element::new(TS_TAG)
        };
        Ok(Self {
            path,
            doc,
            pending: Vec::new(),
        })
    }

    /// The language attribute of the backing file, when present.
    pub fn language(&self) -> Option<&str> {
        self.doc.attr(LANGUAGE_ATTR)
    }

    /// Looks up a non-empty translation for a source string.
    pub fn lookup(&self, context: &str, source: &str) -> Option<&str> {
        let context = self
            .doc
            .children_named(CONTEXT_TAG)
            .find(|node| node.child_text(CONTEXT_NAME_TAG) == Some(context))?;
        context
            .children_named(MESSAGE_TAG)
            .find(|message| message.child_text(SOURCE_TAG) == Some(source))
            .and_then(|message| message.child_text(TRANSLATION_TAG))
            .filter(|translation| !translation.is_empty())
    }

    /// Queues a source string for the catalog. Strings already present in
    /// the backing file are dropped again at flush time.
    pub fn record(&mut self, context: impl Into<String>, source: impl Into<String>) {
        self.pending.push((context.into(), source.into()));
    }

    /// Whether the backing document already carries a message.
    pub fn contains(&self, context: &str, source: &str) -> bool {
        self.doc
            .children_named(CONTEXT_TAG)
            .filter(|node| node.child_text(CONTEXT_NAME_TAG) == Some(context))
            .any(|node| {
                node.children_named(MESSAGE_TAG)
                    .any(|message| message.child_text(SOURCE_TAG) == Some(source))
            })
    }

    /// Merges queued strings into the catalog and rewrites the backing file.
    ///
    /// New messages get an empty translation element for translators to fill
    /// in; existing messages are left exactly as they are.
    pub fn flush(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        let mut added = 0usize;
        for (context, source) in pending {
            if self.contains(&context, &source) {
                continue;
            }
            self.append_message(&context, &source);
            added += 1;
        }
        if added > 0 {
            info!(path = %self.path.display(), added, "recorded new translation sources");
        }
        write_document(&self.path, &self.doc).map_err(|source| EngineError::TranslationWrite {
            path: self.path.clone(),
            source,
        })
    }

    fn append_message(&mut self, context: &str, source: &str) {
        let message = Element::new(MESSAGE_TAG)
            .with_child(Element::new(SOURCE_TAG).with_text(source))
            .with_child(Element::new(TRANSLATION_TAG));

        let existing = self
            .doc
            .children_mut()
            .iter_mut()
            .find(|node| node.tag() == CONTEXT_TAG && node.child_text(CONTEXT_NAME_TAG) == Some(context));
        match existing {
            Some(node) => node.push_child(message),
            None => {
                let node = Element::new(CONTEXT_TAG)
                    .with_child(Element::new(CONTEXT_NAME_TAG).with_text(context))
                    .with_child(message);
                self.doc.push_child(node);
            }
        }
    }
}

/// An import processor that translates layer names and field aliases.
///
/// For a layer over table `t`, aliases come from context `fld_t` keyed by
/// column name, and the display name from context `lyr_t` keyed by table
/// name; untranslated names fall back to the table name itself. Value lists
/// (`vl_*` tables) are left alone. `ValueRelation` widgets are additionally
/// repointed at the localized display column `value_<lang>`.
pub struct AliasTranslator {
    store: TranslationStore,
    locale: String,
}

impl AliasTranslator {
    pub fn new(store: TranslationStore, locale: impl Into<String>) -> Self {
        Self {
            store,
            locale: locale.into(),
        }
    }

    /// The bare language code of the configured locale (`de_CH` gives `de`).
    fn language(&self) -> &str {
        self.locale.get(..2).unwrap_or(&self.locale)
    }
}

impl ImportProcessor for AliasTranslator {
    fn post_load_definition(&mut self, layer: &mut MapLayer) -> anyhow::Result<()> {
        let Some(table) = layer.source.table().map(str::to_string) else {
            return Ok(());
        };
        if table.starts_with(VALUE_LIST_PREFIX) {
            return Ok(());
        }
        let value_column = format!("value_{}", self.language());

        let field_context = format!("{FIELD_CONTEXT_PREFIX}{table}");
        for field in &mut layer.fields {
            self.store.record(&field_context, &field.name);
            if let Some(alias) = self.store.lookup(&field_context, &field.name) {
                field.alias = Some(alias.to_string());
            }
            if field.widget.is_value_relation() {
                field
                    .config
                    .insert(VALUE_CONFIG_KEY.to_string(), value_column.clone());
            }
        }

        let layer_context = format!("{LAYER_CONTEXT_PREFIX}{table}");
        self.store.record(&layer_context, &table);
        layer.name = self
            .store
            .lookup(&layer_context, &table)
            .unwrap_or(&table)
            .to_string();
        Ok(())
    }

    fn post_load_layer(&mut self, layer: &MapLayer) -> anyhow::Result<()> {
        // One write per top-level load keeps the catalog current without
        // rewriting the file for every dependency.
        debug!(layer = %layer.id, "flushing translation catalog");
        self.store.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ldx_model::DataSource;

    use super::*;

    #[test]
    fn fresh_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranslationStore::open(dir.path().join("project.ts")).unwrap();
        assert_eq!(store.lookup("fld_parcels", "zone_id"), None);
        assert!(!store.contains("fld_parcels", "zone_id"));
    }

    #[test]
    fn flush_appends_only_new_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.ts");

        let mut store = TranslationStore::open(&path).unwrap();
        store.record("fld_parcels", "zone_id");
        store.record("fld_parcels", "zone_id");
        store.record("lyr_parcels", "parcels");
        store.flush().unwrap();

        let mut reopened = TranslationStore::open(&path).unwrap();
        assert!(reopened.contains("fld_parcels", "zone_id"));
        assert!(reopened.contains("lyr_parcels", "parcels"));
        // Untranslated entries do not count as translations.
        assert_eq!(reopened.lookup("fld_parcels", "zone_id"), None);

        reopened.record("fld_parcels", "zone_id");
        reopened.record("fld_parcels", "remarks");
        reopened.flush().unwrap();

        let final_doc = read_document(&path).unwrap();
        let context = final_doc
            .children_named(CONTEXT_TAG)
            .find(|node| node.child_text(CONTEXT_NAME_TAG) == Some("fld_parcels"))
            .unwrap();
        assert_eq!(context.children_named(MESSAGE_TAG).count(), 2);
    }

    #[test]
    fn lookup_finds_filled_translations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.ts");

        let doc = Element::new(TS_TAG).with_attr(LANGUAGE_ATTR, "de_CH").with_child(
            Element::new(CONTEXT_TAG)
                .with_child(Element::new(CONTEXT_NAME_TAG).with_text("fld_parcels"))
                .with_child(
                    Element::new(MESSAGE_TAG)
                        .with_child(Element::new(SOURCE_TAG).with_text("zone_id"))
                        .with_child(Element::new(TRANSLATION_TAG).with_text("Zone")),
                ),
        );
        write_document(&path, &doc).unwrap();

        let store = TranslationStore::open(&path).unwrap();
        assert_eq!(store.language(), Some("de_CH"));
        assert_eq!(store.lookup("fld_parcels", "zone_id"), Some("Zone"));
    }

    #[test]
    fn translator_applies_aliases_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.ts");

        let doc = Element::new(TS_TAG)
            .with_child(
                Element::new(CONTEXT_TAG)
                    .with_child(Element::new(CONTEXT_NAME_TAG).with_text("fld_parcels"))
                    .with_child(
                        Element::new(MESSAGE_TAG)
                            .with_child(Element::new(SOURCE_TAG).with_text("zone_id"))
                            .with_child(Element::new(TRANSLATION_TAG).with_text("Zone")),
                    ),
            )
            .with_child(
                Element::new(CONTEXT_TAG)
                    .with_child(Element::new(CONTEXT_NAME_TAG).with_text("lyr_parcels"))
                    .with_child(
                        Element::new(MESSAGE_TAG)
                            .with_child(Element::new(SOURCE_TAG).with_text("parcels"))
                            .with_child(Element::new(TRANSLATION_TAG).with_text("Parzellen")),
                    ),
            );
        write_document(&path, &doc).unwrap();

        let store = TranslationStore::open(&path).unwrap();
        let mut translator = AliasTranslator::new(store, "de_CH");

        let mut layer = MapLayer::vector(
            "parcels",
            "parcels",
            DataSource::parse("table=\"land\".\"parcels\"").unwrap(),
        )
        .with_field(ldx_model::Field::new("zone_id"))
        .with_field(ldx_model::Field::new("remarks"))
        .with_field(ldx_model::Field::value_relation(
            "owner_id", "owners", "id", "name",
        ));

        translator.post_load_definition(&mut layer).unwrap();

        assert_eq!(layer.name, "Parzellen");
        assert_eq!(layer.field("zone_id").unwrap().alias.as_deref(), Some("Zone"));
        assert_eq!(layer.field("remarks").unwrap().alias, None);
        assert_eq!(
            layer.field("owner_id").unwrap().config.get(VALUE_CONFIG_KEY),
            Some(&"value_de".to_string())
        );

        translator.post_load_layer(&layer).unwrap();

        // Every string seen is now in the catalog, including the ones that
        // already had translations.
        let store = TranslationStore::open(&path).unwrap();
        assert!(store.contains("fld_parcels", "remarks"));
        assert!(store.contains("fld_parcels", "owner_id"));
        assert!(store.contains("lyr_parcels", "parcels"));
        // The filled translation survived the append.
        assert_eq!(store.lookup("lyr_parcels", "parcels"), Some("Parzellen"));
    }

    #[test]
    fn value_list_tables_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranslationStore::open(dir.path().join("project.ts")).unwrap();
        let mut translator = AliasTranslator::new(store, "fr");

        let mut layer = MapLayer::vector(
            "vl_status",
            "vl_status",
            DataSource::parse("table=vl_status").unwrap(),
        )
        .with_field(ldx_model::Field::new("code"));

        translator.post_load_definition(&mut layer).unwrap();
        assert_eq!(layer.name, "vl_status");
        assert_eq!(layer.field("code").unwrap().alias, None);
    }
}
