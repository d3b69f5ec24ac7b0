//! Cross-process determinism for the search fixture.
//!
//! Spawns the `search_fixture` binary under 4 environment variants
//! and asserts all produce identical stdout.

use std::path::Path;
use std::process::Command;

fn binary_path() -> String {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push("search_fixture");
    path.to_string_lossy().to_string()
}

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

fn run_variant(work_dir: &str, env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path();

    let mut command = Command::new(&bin);
    command.current_dir(work_dir);

    command
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE")
        .env_remove("RUST_LOG");

    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });

    assert!(
        output.status.success(),
        "search_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_determinism_four_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[]);

    for expected in [
        "queens_solutions=4\n",
        "nested_solutions=4\n",
        "knapsack_best=90\n",
    ] {
        assert!(baseline.contains(expected), "baseline missing {expected:?}:\n{baseline}");
    }
    for key in [
        "queens_report_digest=sha256:",
        "queens_trace_digest=sha256:",
        "nested_report_digest=sha256:",
        "knapsack_report_digest=sha256:",
    ] {
        assert!(baseline.contains(key), "baseline missing {key}");
    }

    // Variant 2: different cwd.
    let alt_cwd = tempfile::tempdir().expect("temp dir");
    let alt_cwd = alt_cwd.path().to_string_lossy().to_string();
    let variant_cwd = run_variant(&alt_cwd, &[]);
    assert_eq!(
        baseline, variant_cwd,
        "output differs when cwd changes from {root} to {alt_cwd}"
    );

    // Variant 3: different locale env.
    let variant_locale = run_variant(&root, &[("LC_ALL", "C"), ("LANG", "C")]);
    assert_eq!(baseline, variant_locale, "output differs when LC_ALL=C LANG=C");

    // Variant 4: verbose logging and spurious env vars. Logs go to stderr only.
    let variant_noise = run_variant(
        &root,
        &[
            ("RUST_LOG", "trace"),
            ("CANOPY_NOISE", "should_not_matter"),
            ("TZ", "America/New_York"),
        ],
    );
    assert_eq!(baseline, variant_noise, "output differs with logging enabled");
}

#[test]
fn nested_fixture_suspends_and_resumes_in_pairs() {
    let out = run_variant(&workspace_root(), &[]);
    let value = |key: &str| -> u64 {
        out.lines()
            .find_map(|line| line.strip_prefix(&format!("{key}=")).map(str::to_string))
            .unwrap_or_else(|| panic!("missing {key}"))
            .parse()
            .expect("numeric value")
    };
    let suspensions = value("nested_suspensions");
    assert!(suspensions > 0);
    assert_eq!(suspensions, value("nested_resumes"));
}
