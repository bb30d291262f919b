//! Integration tests for specsep-cli.
//!
//! Each test runs the built `specsep` binary against JSON matrices in a
//! temporary directory. `XDG_CONFIG_HOME` points into the same directory so
//! the user's own settings never leak in.

use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the `specsep` binary with an isolated config directory.
fn specsep_bin(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_specsep"));
    cmd.env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("RUST_LOG", "warn");
    cmd
}

fn run(dir: &TempDir, args: &[&str]) -> Output {
    specsep_bin(dir)
        .args(args)
        .output()
        .expect("failed to run specsep")
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn shape(value: &Value) -> Vec<u64> {
    value["shape"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_u64().unwrap())
        .collect()
}

fn data(value: &Value) -> Vec<f64> {
    value["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect()
}

fn p(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// 9x12 magnitude spectrogram: one sustained row, one transient column.
fn cross_matrix() -> Value {
    let (rows, cols) = (9, 12);
    let values: Vec<f32> = (0..rows * cols)
        .map(|idx| {
            let (i, j) = (idx / cols, idx % cols);
            if i == 4 || j == 6 { 1.0 } else { 0.1 }
        })
        .collect();
    json!({"shape": [rows, cols], "data": values})
}

// ---------------------------------------------------------------------------
// `specsep hpss`
// ---------------------------------------------------------------------------

#[test]
fn hpss_components_sum_to_input() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "s.json", &cross_matrix());
    let harm = dir.path().join("h.json");
    let perc = dir.path().join("p.json");

    let output = run(
        &dir,
        &[
            "hpss",
            p(&input),
            "--harmonic",
            p(&harm),
            "--percussive",
            p(&perc),
            "--kernel",
            "5",
        ],
    );
    assert!(
        output.status.success(),
        "hpss failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let (h, pc) = (read_json(&harm), read_json(&perc));
    assert_eq!(shape(&h), vec![9, 12]);
    let original = data(&cross_matrix());
    for ((a, b), s) in data(&h).iter().zip(data(&pc)).zip(original) {
        assert!((a + b - s).abs() < 1e-5);
    }

    // Sustained row is harmonic, transient column percussive
    let h = data(&h);
    let pc = data(&pc);
    assert!(h[4 * 12 + 2] > pc[4 * 12 + 2]);
    assert!(pc[12 + 6] > h[12 + 6]);
}

#[test]
fn hpss_complex_input_keeps_imaginary_part() {
    let dir = TempDir::new().unwrap();
    let input = write_json(
        &dir,
        "c.json",
        &json!({"shape": [2, 2], "data": [1.0, 0.0, 0.5, 0.5], "imag": [0.0, 1.0, 0.5, -0.5]}),
    );
    let harm = dir.path().join("h.json");
    let perc = dir.path().join("p.json");

    let output = run(
        &dir,
        &[
            "hpss",
            p(&input),
            "--harmonic",
            p(&harm),
            "--percussive",
            p(&perc),
        ],
    );
    assert!(output.status.success());
    assert!(read_json(&harm).get("imag").is_some());
}

#[test]
fn hpss_mask_mode_writes_binary_masks() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "s.json", &cross_matrix());
    let harm = dir.path().join("h.json");
    let perc = dir.path().join("p.json");

    let output = run(
        &dir,
        &[
            "hpss",
            p(&input),
            "--harmonic",
            p(&harm),
            "--percussive",
            p(&perc),
            "--profile",
            "hard-mask",
        ],
    );
    assert!(output.status.success());

    for (a, b) in data(&read_json(&harm)).iter().zip(data(&read_json(&perc))) {
        assert!(*a == 0.0 || *a == 1.0);
        assert_eq!(a + b, 1.0);
    }
}

#[test]
fn hpss_rejects_negative_power() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "s.json", &cross_matrix());

    let output = run(
        &dir,
        &[
            "hpss",
            p(&input),
            "--harmonic",
            "h.json",
            "--percussive",
            "p.json",
            "--power=-1",
        ],
    );
    assert!(!output.status.success());
}

#[test]
fn hpss_reports_malformed_input() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "bad.json", &json!({"shape": [2, 2], "data": [1.0]}));

    let output = run(
        &dir,
        &[
            "hpss",
            p(&input),
            "--harmonic",
            "h.json",
            "--percussive",
            "p.json",
        ],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("needs 4 values"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// `specsep nn-filter`
// ---------------------------------------------------------------------------

#[test]
fn nn_filter_with_precomputed_graph() {
    let dir = TempDir::new().unwrap();
    // Two features, three frames; frame 0 averages frames 1 and 2
    let input = write_json(
        &dir,
        "x.json",
        &json!({"shape": [2, 3], "data": [0.0, 2.0, 4.0, 1.0, 3.0, 5.0]}),
    );
    let graph = write_json(
        &dir,
        "g.json",
        &json!({"shape": [3, 3], "data": [0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]}),
    );
    let out = dir.path().join("y.json");

    let output = run(
        &dir,
        &["nn-filter", p(&input), p(&out), "--graph", p(&graph)],
    );
    assert!(
        output.status.success(),
        "nn-filter failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let y = read_json(&out);
    assert_eq!(shape(&y), vec![2, 3]);
    assert_eq!(data(&y), vec![3.0, 2.0, 4.0, 4.0, 3.0, 5.0]);
}

#[test]
fn nn_filter_rejects_mismatched_graph() {
    let dir = TempDir::new().unwrap();
    let input = write_json(
        &dir,
        "x.json",
        &json!({"shape": [2, 3], "data": [0.0, 2.0, 4.0, 1.0, 3.0, 5.0]}),
    );
    let graph = write_json(
        &dir,
        "g.json",
        &json!({"shape": [2, 2], "data": [0.0, 1.0, 1.0, 0.0]}),
    );
    let out = dir.path().join("y.json");

    let output = run(
        &dir,
        &["nn-filter", p(&input), p(&out), "--graph", p(&graph)],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("similarity graph"), "stderr: {stderr}");
    assert!(!out.exists());
}

#[test]
fn nn_filter_builds_graph_and_preserves_shape() {
    let dir = TempDir::new().unwrap();
    let values: Vec<f32> = (0..4 * 20).map(|i| ((i * 7) % 11) as f32).collect();
    let input = write_json(&dir, "x.json", &json!({"shape": [4, 20], "data": values}));
    let out = dir.path().join("y.json");

    let output = run(
        &dir,
        &[
            "nn-filter",
            p(&input),
            p(&out),
            "--aggregate",
            "median",
            "--metric",
            "cosine",
            "--axis",
            "-1",
        ],
    );
    assert!(
        output.status.success(),
        "nn-filter failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(shape(&read_json(&out)), vec![4, 20]);
}

#[test]
fn nn_filter_unknown_aggregate() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "x.json", &json!({"shape": [1, 2], "data": [1.0, 2.0]}));

    let output = run(
        &dir,
        &["nn-filter", p(&input), "y.json", "--aggregate", "mode"],
    );
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// `specsep decompose`
// ---------------------------------------------------------------------------

#[test]
fn decompose_writes_factor_shapes() {
    let dir = TempDir::new().unwrap();
    let values: Vec<f32> = (0..6 * 10).map(|i| 1.0 + ((i * 5) % 7) as f32).collect();
    let input = write_json(&dir, "s.json", &json!({"shape": [6, 10], "data": values}));
    let comps = dir.path().join("w.json");
    let acts = dir.path().join("h.json");

    let output = run(
        &dir,
        &[
            "decompose",
            p(&input),
            "--components",
            p(&comps),
            "--activations",
            p(&acts),
            "--n-components",
            "3",
            "--sort",
            "--seed",
            "7",
        ],
    );
    assert!(
        output.status.success(),
        "decompose failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert_eq!(shape(&read_json(&comps)), vec![6, 3]);
    assert_eq!(shape(&read_json(&acts)), vec![3, 10]);
    assert!(data(&read_json(&comps)).iter().all(|v| *v >= 0.0));
}

#[test]
fn decompose_rejects_negative_input() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "s.json", &json!({"shape": [1, 2], "data": [1.0, -1.0]}));

    let output = run(
        &dir,
        &[
            "decompose",
            p(&input),
            "--components",
            "w.json",
            "--activations",
            "h.json",
        ],
    );
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// `specsep profiles` / `specsep config`
// ---------------------------------------------------------------------------

#[test]
fn profiles_lists_factory_profiles() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, &["profiles", "list", "--factory"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["default", "fine-harmonic", "hard-mask", "nlm", "repet-sim"] {
        assert!(stdout.contains(name), "listing should contain '{name}'");
    }
}

#[test]
fn profiles_show_prints_toml() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, &["profiles", "show", "nlm"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("aggregate = \"weighted\""), "stdout: {stdout}");
}

#[test]
fn config_validate_reports_bad_file() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "[hpss]\npower = -2.0\n\n[nn_filter]\nmetric = \"hamming\"\n").unwrap();

    let output = run(&dir, &["config", "validate", p(&bad)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("hpss.power"), "stderr: {stderr}");
    assert!(stderr.contains("hamming"), "stderr: {stderr}");
}

#[test]
fn config_write_then_used_as_default() {
    let dir = TempDir::new().unwrap();

    let output = run(&dir, &["config", "write", "--profile", "hard-mask"]);
    assert!(
        output.status.success(),
        "config write failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(dir.path().join("config/specsep/settings.toml").is_file());

    // Refuses to overwrite without --force
    let output = run(&dir, &["config", "write"]);
    assert!(!output.status.success());

    let output = run(&dir, &["config", "show"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mask = true"), "stdout: {stdout}");
}
