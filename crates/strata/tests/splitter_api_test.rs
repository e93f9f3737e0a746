//! Integration tests for the LayerSplitter API
//!
//! These tests run the whole pipeline against files in temporary
//! directories and inspect the written documents.

use std::{fs, path::Path};

use tempfile::tempdir;

use strata::{
    Document, LayerSplitter, StrataError, StructureError,
    cell::Cell,
    config::{AppConfig, DocumentConfig, ExportConfig, WriteFailurePolicy},
};

const NETWORK_SECURITY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mxfile host="app.diagrams.net" agent="Mozilla/5.0" version="24.7.17">
  <diagram id="overview" name="Overview">
    <mxGraphModel dx="1426" dy="794" grid="1" gridSize="10">
      <root>
        <mxCell id="0"/>
        <mxCell id="L1" value="Network" parent="0"/>
        <mxCell id="L2" value="Security" parent="0"/>
        <mxCell id="N1" value="Router" style="rounded=1;" parent="L1" vertex="1">
          <mxGeometry x="40" y="40" width="120" height="60" as="geometry"/>
        </mxCell>
        <mxCell id="N2" value="Firewall" parent="L2" vertex="1">
          <mxGeometry x="240" y="40" width="120" height="60" as="geometry"/>
        </mxCell>
        <mxCell id="E1" value="" style="endArrow=classic;" parent="L1" source="N1" target="N2" edge="1">
          <mxGeometry relative="1" as="geometry"/>
        </mxCell>
      </root>
    </mxGraphModel>
  </diagram>
</mxfile>
"#;

fn write_input(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("input.drawio");
    fs::write(&path, contents).expect("Failed to write input");
    path
}

fn read_output(path: &Path) -> Document {
    Document::from_file(path).expect("Failed to read exported layer")
}

/// Returns `(id, parent)` for every cell of an exported document.
fn cells(document: &Document) -> Vec<(String, Option<String>)> {
    let structure = document.structure().expect("Exported layer has no root");
    structure
        .root()
        .child_elements()
        .map(Cell::new)
        .map(|cell| {
            (
                cell.id().unwrap_or_default().to_string(),
                cell.parent().map(str::to_string),
            )
        })
        .collect()
}

fn cell(id: &str, parent: Option<&str>) -> (String, Option<String>) {
    (id.to_string(), parent.map(str::to_string))
}

fn policy(on_write_error: WriteFailurePolicy) -> AppConfig {
    AppConfig::new(
        DocumentConfig::default(),
        ExportConfig::new("drawio", on_write_error),
    )
}

#[test]
fn test_network_security_scenario() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path(), NETWORK_SECURITY);
    let output_dir = dir.path().join("layers");

    let written = LayerSplitter::default()
        .export(&input, &output_dir)
        .expect("Export failed");

    let labels: Vec<_> = written.iter().map(|layer| layer.label()).collect();
    assert_eq!(labels, vec!["Network", "Security"]);
    assert_eq!(written[0].path(), output_dir.join("Network.drawio"));
    assert_eq!(written[1].path(), output_dir.join("Security.drawio"));

    let network = read_output(written[0].path());
    assert_eq!(
        cells(&network),
        vec![
            cell("0", None),
            cell("L1", Some("0")),
            cell("N1", Some("L1")),
            cell("E1", Some("L1")),
        ]
    );

    let security = read_output(written[1].path());
    assert_eq!(
        cells(&security),
        vec![
            cell("0", None),
            cell("L2", Some("0")),
            cell("N2", Some("L2")),
            cell("E1", Some("L2")),
        ]
    );
}

#[test]
fn test_output_metadata_and_declaration() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path(), NETWORK_SECURITY);

    let written = LayerSplitter::default()
        .export(&input, dir.path())
        .expect("Export failed");
    let raw = fs::read_to_string(written[1].path()).expect("Failed to read output");
    assert!(raw.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));

    let document = read_output(written[1].path());
    let mxfile = document.element();
    assert_eq!(mxfile.attribute("agent"), Some("Mozilla/5.0"));
    assert_eq!(mxfile.attribute("version"), Some("24.7.17"));

    let structure = document.structure().unwrap();
    assert_eq!(structure.diagram().attribute("name"), Some("Security"));
    assert_eq!(structure.diagram().attribute("id"), Some("overview"));
    assert_eq!(structure.graph_model().attribute("gridSize"), Some("10"));

    let firewall = structure
        .root()
        .child_elements()
        .find(|element| element.attribute("id") == Some("N2"))
        .expect("N2 missing");
    let geometry = firewall.find_child("mxGeometry").expect("geometry missing");
    assert_eq!(geometry.attribute("x"), Some("240"));
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path(), NETWORK_SECURITY);
    let splitter = LayerSplitter::default();

    let first = splitter.export(&input, dir.path().join("a")).unwrap();
    let second = splitter.export(&input, dir.path().join("b")).unwrap();

    for (a, b) in first.iter().zip(&second) {
        assert_eq!(
            fs::read(a.path()).unwrap(),
            fs::read(b.path()).unwrap(),
            "{} differs between runs",
            a.label()
        );
    }
    assert_eq!(fs::read_to_string(&input).unwrap(), NETWORK_SECURITY);
}

#[test]
fn test_callback_reports_each_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path(), NETWORK_SECURITY);

    let mut reported = Vec::new();
    let written = LayerSplitter::default()
        .export_with(&input, dir.path().join("nested/out"), |layer| {
            reported.push(layer.layer_id().to_string());
        })
        .unwrap();

    assert_eq!(reported, vec!["L1", "L2"]);
    assert!(written.iter().all(|layer| layer.path().is_file()));
}

const THREE_LAYERS: &str = r#"<mxfile><diagram id="d"><mxGraphModel><root>
  <mxCell id="0"/>
  <mxCell id="a" value="Alpha" parent="0"/>
  <mxCell id="n" value="Network" parent="0"/>
  <mxCell id="z" value="Zeta" parent="0"/>
</root></mxGraphModel></diagram></mxfile>"#;

#[test]
fn test_write_failure_aborts_by_default() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path(), THREE_LAYERS);
    let output_dir = dir.path().join("out");
    fs::create_dir_all(output_dir.join("Network.drawio")).unwrap();

    let err = LayerSplitter::default()
        .export(&input, &output_dir)
        .unwrap_err();

    assert!(
        matches!(err, StrataError::Io { ref path, .. } if path == &output_dir.join("Network.drawio")),
        "unexpected error: {err:?}"
    );
    assert!(output_dir.join("Alpha.drawio").is_file(), "earlier files are kept");
    assert!(!output_dir.join("Zeta.drawio").exists(), "later layers are not written");
}

#[test]
fn test_write_failure_continue_writes_remaining_layers() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path(), THREE_LAYERS);
    let output_dir = dir.path().join("out");
    fs::create_dir_all(output_dir.join("Network.drawio")).unwrap();

    let err = LayerSplitter::new(policy(WriteFailurePolicy::Continue))
        .export(&input, &output_dir)
        .unwrap_err();

    match err {
        StrataError::PartialExport { failed, written } => {
            assert_eq!(failed, vec!["Network"]);
            assert_eq!(written, 2);
        }
        other => panic!("Expected partial export, got {other:?}"),
    }
    assert!(output_dir.join("Alpha.drawio").is_file());
    assert!(output_dir.join("Zeta.drawio").is_file());
}

#[test]
fn test_colliding_labels_overwrite() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(
        dir.path(),
        r#"<mxfile><diagram id="d"><mxGraphModel><root>
             <mxCell id="0"/>
             <mxCell id="x" value="Zone A" parent="0"/>
             <mxCell id="y" value="Zone/A" parent="0"/>
           </root></mxGraphModel></diagram></mxfile>"#,
    );

    let written = LayerSplitter::default()
        .export(&input, dir.path())
        .unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(written[0].path(), written[1].path());
    let survivor = read_output(written[1].path());
    let diagram = survivor.structure().unwrap().diagram();
    assert_eq!(diagram.attribute("name"), Some("Zone/A"));
}

#[test]
fn test_configured_extension() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path(), NETWORK_SECURITY);
    let config = AppConfig::new(
        DocumentConfig::default(),
        ExportConfig::new(".xml", WriteFailurePolicy::Abort),
    );

    let written = LayerSplitter::new(config)
        .export(&input, dir.path())
        .unwrap();
    assert_eq!(written[0].path(), dir.path().join("Network.xml"));
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = dir.path().join("absent.drawio");

    let err = LayerSplitter::default()
        .export(&input, dir.path())
        .unwrap_err();
    assert!(matches!(err, StrataError::Io { ref path, .. } if path == &input));
}

#[test]
fn test_document_without_layers() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(
        dir.path(),
        r#"<mxfile><diagram id="d"><mxGraphModel><root><mxCell id="0"/></root></mxGraphModel></diagram></mxfile>"#,
    );
    let output_dir = dir.path().join("out");

    let err = LayerSplitter::default()
        .export(&input, &output_dir)
        .unwrap_err();
    assert!(matches!(
        err,
        StrataError::Structure {
            source: StructureError::NoLayers,
            ..
        }
    ));
    assert!(!output_dir.exists(), "nothing is written");
}

#[test]
fn test_malformed_input_is_xml_error() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path(), "<mxfile><diagram></mxfile>");

    let err = LayerSplitter::default()
        .export(&input, dir.path())
        .unwrap_err();
    assert!(matches!(err, StrataError::Xml { .. }));
}

#[test]
fn test_non_utf8_input_is_xml_error() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = dir.path().join("latin1.drawio");
    let mut contents = br#"<?xml version="1.0" encoding="ISO-8859-1"?><mxfile host="K"#.to_vec();
    contents.push(0xE4);
    contents.extend_from_slice(br#"se"><diagram id="d"/></mxfile>"#);
    fs::write(&input, &contents).expect("Failed to write input");

    let err = LayerSplitter::default()
        .export(&input, dir.path().join("out"))
        .unwrap_err();
    match err {
        StrataError::Xml { source, src, .. } => {
            assert!(source.to_string().contains("not valid UTF-8"), "{source}");
            assert_eq!(source.offset(), 58);
            assert!(src.starts_with("<?xml"));
        }
        other => panic!("Expected Xml error, got {other:?}"),
    }
}

#[test]
fn test_invalid_extension_is_rejected_before_writing() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path(), NETWORK_SECURITY);
    let output_dir = dir.path().join("out");
    let config = AppConfig::new(
        DocumentConfig::default(),
        ExportConfig::new("", WriteFailurePolicy::Abort),
    );

    let err = LayerSplitter::new(config)
        .export(&input, &output_dir)
        .unwrap_err();
    assert!(matches!(err, StrataError::Config(ref message) if message.contains("extension")));
    assert!(!output_dir.exists(), "nothing is written");
}

#[test]
fn test_duplicate_id_in_two_layers_stays_in_its_layer() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(
        dir.path(),
        r#"<mxfile><diagram id="d"><mxGraphModel><root>
             <mxCell id="0"/>
             <mxCell id="L1" value="A" parent="0"/>
             <mxCell id="L2" value="B" parent="0"/>
             <mxCell id="x" value="in A" parent="L1" vertex="1"/>
             <mxCell id="x" value="in B" parent="L2" vertex="1"/>
           </root></mxGraphModel></diagram></mxfile>"#,
    );
    let output_dir = dir.path().join("out");

    LayerSplitter::default().export(&input, &output_dir).unwrap();

    let a = read_output(&output_dir.join("A.drawio"));
    assert_eq!(
        cells(&a),
        vec![cell("0", None), cell("L1", Some("0")), cell("x", Some("L1"))]
    );
    let b = read_output(&output_dir.join("B.drawio"));
    assert_eq!(
        cells(&b),
        vec![cell("0", None), cell("L2", Some("0")), cell("x", Some("L2"))]
    );
}

#[test]
fn test_layer_without_id_is_exported() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(
        dir.path(),
        r#"<mxfile><diagram id="d"><mxGraphModel><root>
             <mxCell id="0"/>
             <mxCell value="NoId" parent="0"/>
           </root></mxGraphModel></diagram></mxfile>"#,
    );
    let output_dir = dir.path().join("out");

    let written = LayerSplitter::default().export(&input, &output_dir).unwrap();

    assert_eq!(written.len(), 1);
    assert_eq!(written[0].label(), "NoId");
    assert_eq!(written[0].layer_id(), "");
    let layer = read_output(&output_dir.join("NoId.drawio"));
    assert_eq!(cells(&layer), vec![cell("0", None), cell("", Some("0"))]);
}
