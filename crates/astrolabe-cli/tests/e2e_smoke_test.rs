use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use astrolabe::AstrolabeError;
use astrolabe_cli::{Args, run};

/// Models live at the workspace root, not in the crate
fn models_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("models")
}

/// Collects all .astro files from a directory
fn collect_model_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("astro")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(input: &Path, output: &Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        log_level: "off".to_string(),
        strict: false,
    }
}

#[test]
fn e2e_smoke_test_valid_models() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_models = collect_model_files(models_path());
    assert!(!valid_models.is_empty(), "No valid models found in models/");

    let mut failed_models = Vec::new();

    for model_path in &valid_models {
        let output_filename = format!(
            "{}.toml",
            model_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        match run(&args(model_path, &output_path)) {
            Ok(()) => {
                let plan = fs::read_to_string(&output_path).expect("Plan should be written");
                assert!(plan.contains("[[classes]]"), "{}", model_path.display());
            }
            Err(e) => failed_models.push((model_path.clone(), e)),
        }
    }

    if !failed_models.is_empty() {
        eprintln!("\nValid models that failed:");
        for (path, err) in &failed_models {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid model(s) failed unexpectedly", failed_models.len());
    }

    println!("✅ All {} valid models passed", valid_models.len());
}

#[test]
fn e2e_smoke_test_error_models() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_models = collect_model_files(models_path().join("errors"));
    assert!(
        !error_models.is_empty(),
        "No error models found in models/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for model_path in &error_models {
        let output_filename = format!(
            "error_{}.toml",
            model_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        match run(&args(model_path, &output_path)) {
            Ok(()) => unexpectedly_succeeded.push(model_path.clone()),
            Err(err) => assert!(
                matches!(err, AstrolabeError::Parse { .. }),
                "{}: expected a parse error, got {err}",
                model_path.display()
            ),
        }
        assert!(!output_path.exists(), "No plan should be written on error");
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError models that succeeded unexpectedly:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error model(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_strict_mode_rejects_dangling_references() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = models_path().join("dangling.astro");
    let output = temp_dir.path().join("dangling.toml");

    let mut strict = args(&input, &output);
    strict.strict = true;
    let err = run(&strict).unwrap_err();
    assert!(
        matches!(&err, AstrolabeError::Unresolved(refs) if refs.len() == 1),
        "unexpected error: {err}"
    );
    assert!(!output.exists());

    run(&args(&input, &output)).expect("Non-strict run should succeed");
    let plan = fs::read_to_string(&output).unwrap();
    assert!(plan.contains("c_customer"));
}

#[test]
fn e2e_tree_plan_contents() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = models_path().join("tree.astro");
    let output = temp_dir.path().join("tree.toml");

    run(&args(&input, &output)).expect("Failed to run");
    let plan = fs::read_to_string(&output).unwrap();

    assert!(plan.contains(r#"model = "Tree""#));
    assert!(plan.contains(r#"field_name = "parent""#));
    assert!(plan.contains(r#"field_name = "children""#));
    assert!(plan.contains(r#""LIST""#));
    assert!(plan.contains(r#""REMOVE""#));
}

#[test]
fn e2e_explicit_config_is_used() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = temp_dir.path().join("config.toml");
    fs::write(
        &config,
        "[synthesis.unnamed_roles]\npolicy = \"fallback\"\nprefix = \"Role\"\n",
    )
    .unwrap();

    let input = temp_dir.path().join("pair.astro");
    fs::write(
        &input,
        "class c_a A;\nclass c_b B;\nassociation as_ab association { role a @c_a; role b @c_b; }\n",
    )
    .unwrap();
    let output = temp_dir.path().join("pair.toml");

    let mut with_config = args(&input, &output);
    with_config.config = Some(config.to_string_lossy().to_string());
    run(&with_config).expect("Failed to run");

    let plan = fs::read_to_string(&output).unwrap();
    assert!(plan.contains(r#"field_name = "RoleB_1""#));
    assert!(plan.contains(r#"field_name = "RoleA_1""#));
}
