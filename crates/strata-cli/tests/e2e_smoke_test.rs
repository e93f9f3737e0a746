use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use strata_cli::{Args, run};

/// Collects all .drawio files from a directory
fn collect_drawio_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("drawio")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demos live at the workspace root, not in the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn cli_args(input: &Path, output_dir: &Path) -> Args {
    Args {
        input_file: input.to_string_lossy().to_string(),
        output_dir: output_dir.to_string_lossy().to_string(),
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_demos = collect_drawio_files(demos_path());

    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_dir = temp_dir
            .path()
            .join(demo_path.file_stem().unwrap().to_string_lossy().to_string());

        match run(&cli_args(demo_path, &output_dir)) {
            Ok(written) if written.is_empty() => {
                failed_demos.push((demo_path.clone(), "no layers written".to_string()));
            }
            Ok(written) => {
                for layer in &written {
                    assert!(layer.path().is_file(), "{} missing", layer.path().display());
                }
            }
            Err(e) => failed_demos.push((demo_path.clone(), e.to_string())),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} valid demos passed", valid_demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_drawio_files(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_dir = temp_dir.path().join(format!(
            "error_{}",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        if run(&cli_args(demo_path, &output_dir)).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!(
        "✅ All {} error demos failed as expected",
        error_demos.len()
    );
}

#[test]
fn e2e_layer_file_names() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output_dir = temp_dir.path().join("out");

    let written = run(&cli_args(
        &demos_path().join("nested_groups.drawio"),
        &output_dir,
    ))
    .expect("nested_groups.drawio should export");

    let names: Vec<_> = written
        .iter()
        .map(|layer| layer.path().file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["Racks_Row_A.drawio", "Power_Cooling.drawio"]);

    let power = fs::read_to_string(output_dir.join("Power_Cooling.drawio")).unwrap();
    assert!(!power.contains(r#"id="srv1""#), "vertices of other layers stay out");
    assert!(power.contains(r#"id="feed1""#));
}

#[test]
fn e2e_explicit_config_is_applied() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("strata.toml");
    fs::write(&config_path, "[export]\nextension = \"xml\"\n").unwrap();
    let output_dir = temp_dir.path().join("out");

    let mut args = cli_args(&demos_path().join("network_security.drawio"), &output_dir);
    args.config = Some(config_path.to_string_lossy().to_string());

    let written = run(&args).expect("network_security.drawio should export");
    assert!(
        written
            .iter()
            .all(|layer| layer.path().extension().and_then(|s| s.to_str()) == Some("xml"))
    );
}

#[test]
fn e2e_missing_config_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let mut args = cli_args(
        &demos_path().join("network_security.drawio"),
        &temp_dir.path().join("out"),
    );
    args.config = Some(temp_dir.path().join("absent.toml").to_string_lossy().to_string());

    assert!(run(&args).is_err());
    assert!(!temp_dir.path().join("out").exists());
}
