//! Integration tests for file-level document round trips.

use ldx_dom::{Element, read_document, write_document};

#[test]
fn write_then_read_preserves_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parcels.meta");

    let root = Element::new("maplayer")
        .with_attr("type", "vector")
        .with_child(Element::new("id").with_text("parcels"))
        .with_child(
            Element::new("datasource")
                .with_text("service='pg_prod' table=\"land\".\"parcels\" (geom)"),
        );

    write_document(&path, &root).unwrap();
    let read_back = read_document(&path).unwrap();
    assert_eq!(read_back, root);
}

#[test]
fn write_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/out/owners.style");

    let root = Element::new("layer-style").with_child(Element::new("edittypes"));
    write_document(&path, &root).unwrap();
    assert!(path.exists());
    assert_eq!(read_document(&path).unwrap(), root);
}

#[test]
fn reading_a_missing_file_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.meta");
    let err = read_document(&path).unwrap_err();
    assert!(err.to_string().contains("absent.meta"));
}
