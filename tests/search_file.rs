//! Integration tests for the search-file catalog.
//!
//! These tests verify:
//! - Filter-list loading from files (fatal and permissive paths)
//! - The full emission pipeline over a fixture module
//! - Candidate policies (exhaustive vs. original-type)
//! - Record ordering and run-to-run determinism
//! - Run-configuration loading

use fpscout::{
    parse_module, FilterLists, FilterPolicy, RunConfig, SearchFilePass, SearchOptions,
};
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_lists() -> FilterLists {
    FilterLists {
        excluded_functions: fixtures_dir().join("exclude_functions.txt"),
        included_functions: fixtures_dir().join("include_functions.txt"),
        included_globals: fixtures_dir().join("include_globals.txt"),
        excluded_locals: fixtures_dir().join("exclude_locals.txt"),
    }
}

fn fixture_module() -> fpscout::Module {
    let source = fs::read_to_string(fixtures_dir().join("sim.fpir")).expect("fixture should read");
    parse_module(&source).expect("fixture should parse")
}

fn run_catalog(options: SearchOptions) -> String {
    let policy = FilterPolicy::load(&fixture_lists()).expect("fixture lists should load");
    let pass = SearchFilePass::new(&policy, options);
    let mut out = Vec::new();
    pass.run(&fixture_module(), &mut out).expect("pass should succeed");
    String::from_utf8(out).expect("output should be utf-8")
}

// ============================================================
// Filter loading
// ============================================================

#[test]
fn test_filter_lists_load_from_fixtures() {
    let policy = FilterPolicy::load(&fixture_lists()).unwrap();
    assert!(policy.function_eligible("main"));
    assert!(policy.function_eligible("kernel"));
    // Included and excluded: the exclusion wins.
    assert!(!policy.function_eligible("banned"));
    assert!(!policy.function_eligible("helper"));
    assert!(policy.global_eligible("gsum"));
    assert!(!policy.local_eligible("scratch"));
}

#[test]
fn test_missing_required_list_is_fatal() {
    let mut lists = fixture_lists();
    lists.included_functions = fixtures_dir().join("no_such_list.txt");
    assert!(FilterPolicy::load(&lists).is_err());
}

#[test]
fn test_missing_excluded_locals_is_permissive() {
    let mut lists = fixture_lists();
    lists.excluded_locals = fixtures_dir().join("no_such_list.txt");
    let policy = FilterPolicy::load(&lists).unwrap();
    // Without the exclusion list every plain-named local is eligible.
    assert!(policy.local_eligible("scratch"));
}

// ============================================================
// Full catalog emission
// ============================================================

#[test]
fn test_full_catalog_exhaustive_mode() {
    let expected = concat!(
        "{\"config\": [\n",
        "\t{\"globalVar\": {\n",
        "\t\t\"name\": \"gsum\",\n",
        "\t\t\"type\": [\"float\", \"double\", \"longdouble\"]\n",
        "\t}},\n",
        "\t{\"globalVar\": {\n",
        "\t\t\"name\": \"grid\",\n",
        "\t\t\"type\": [\"float[2][3][4]\", \"double[2][3][4]\", \"longdouble[2][3][4]\"]\n",
        "\t}},\n",
        "\t{\"globalVar\": {\n",
        "\t\t\"name\": \"gbuf\",\n",
        "\t\t\"type\": [\"float*\", \"double*\", \"longdouble*\"]\n",
        "\t}},\n",
        "\t{\"localVar\": {\n",
        "\t\t\"file\": \"sim.c\",\n",
        "\t\t\"function\": \"main\",\n",
        "\t\t\"name\": \"eps\",\n",
        "\t\t\"type\": [\"float\", \"double\", \"longdouble\"]\n",
        "\t}},\n",
        "\t{\"localVar\": {\n",
        "\t\t\"file\": \"sim.c\",\n",
        "\t\t\"function\": \"main\",\n",
        "\t\t\"name\": \"acc\",\n",
        "\t\t\"type\": [\"float\", \"double\", \"longdouble\"]\n",
        "\t}},\n",
        "\t{\"op\": {\n",
        "\t\t\"id\": \"main_2\",\n",
        "\t\t\"function\": \"main\",\n",
        "\t\t\"name\": \"fadd\",\n",
        "\t\t\"type\": [\"float\", \"double\", \"longdouble\"]\n",
        "\t}},\n",
        "\t{\"op\": {\n",
        "\t\t\"id\": \"main_3\",\n",
        "\t\t\"function\": \"main\",\n",
        "\t\t\"name\": \"fcmp\",\n",
        "\t\t\"type\": [\"float\", \"double\", \"longdouble\"]\n",
        "\t}},\n",
        "\t{\"call\": {\n",
        "\t\t\"id\": \"main_4\",\n",
        "\t\t\"function\": \"main\",\n",
        "\t\t\"name\": \"sqrt\",\n",
        "\t\t\"switch\": [\"sqrtf\",\"sqrt\"],\n",
        "\t\t\"type\": [[\"float\",\"float\"], [\"double\",\"double\"]]\n",
        "\t}},\n",
        "\t{\"localVar\": {\n",
        "\t\t\"file\": \"kernel.c\",\n",
        "\t\t\"function\": \"kernel\",\n",
        "\t\t\"name\": \"w\",\n",
        "\t\t\"type\": [\"float*\", \"double*\", \"longdouble*\"]\n",
        "\t}},\n",
        "\t{\"op\": {\n",
        "\t\t\"id\": \"kernel_0\",\n",
        "\t\t\"function\": \"kernel\",\n",
        "\t\t\"name\": \"fdiv\",\n",
        "\t\t\"type\": [\"float\", \"double\", \"longdouble\"]\n",
        "\t}},\n",
        "\t{\"call\": {\n",
        "\t\t\"id\": \"kernel_1\",\n",
        "\t\t\"function\": \"kernel\",\n",
        "\t\t\"name\": \"acos\",\n",
        "\t\t\"switch\": [\"acosf\",\"acos\"],\n",
        "\t\t\"type\": [[\"float\",\"float\"], [\"double\",\"double\"]]\n",
        "\t}}\n",
        "]}\n",
    );
    assert_eq!(run_catalog(SearchOptions::default()), expected);
}

#[test]
fn test_original_type_mode_prefixes() {
    let options = SearchOptions {
        original_type: true,
        ..SearchOptions::default()
    };
    let text = run_catalog(options);

    // Double global narrows down to float.
    assert!(text.contains("\t\t\"type\": [\"float\", \"double\"]\n"));
    // Float array anchors at float only.
    assert!(text.contains("\t\t\"type\": [\"float[2][3][4]\"]\n"));
    // Pointer-to-float keeps its suffix.
    assert!(text.contains("\t\t\"type\": [\"float*\"]\n"));
    // Operators stay on the fixed triple even in original-type mode.
    assert!(text.contains("\t\t\"name\": \"fadd\",\n\t\t\"type\": [\"float\", \"double\", \"longdouble\"]\n"));
}

#[test]
fn test_filtered_entities_never_appear() {
    let text = run_catalog(SearchOptions::default());

    // Synthesized name, even though the inclusion list mentions it.
    assert!(!text.contains("x.1"));
    // Integer global, included but not floating-point.
    assert!(!text.contains("gflags"));
    // Global absent from the inclusion list.
    assert!(!text.contains("hidden"));
    // Local on the exclusion list.
    assert!(!text.contains("scratch"));
    // Integer parameter.
    assert!(!text.contains("\"name\": \"n\""));
    // Functions outside the include/exclude gates.
    assert!(!text.contains("helper"));
    assert!(!text.contains("banned"));
    // Non-tunable call target.
    assert!(!text.contains("printf"));
}

#[test]
fn test_scan_toggles() {
    let no_ops = SearchOptions {
        list_operators: false,
        ..SearchOptions::default()
    };
    let text = run_catalog(no_ops);
    assert!(!text.contains("\"op\""));
    assert!(text.contains("\"call\""));

    let no_calls = SearchOptions {
        list_calls: false,
        ..SearchOptions::default()
    };
    let text = run_catalog(no_calls);
    assert!(text.contains("\"op\""));
    assert!(!text.contains("\"call\""));
}

#[test]
fn test_repeated_runs_are_identical() {
    let first = run_catalog(SearchOptions::default());
    let second = run_catalog(SearchOptions::default());
    assert_eq!(first, second);
}

// ============================================================
// Run configuration
// ============================================================

#[test]
fn test_config_file_drives_a_run() {
    let config = RunConfig::load(&fixtures_dir().join("fpscout.toml")).unwrap();

    // Relative list paths resolve against the config's directory.
    assert_eq!(
        config.filter_lists().included_functions,
        fixtures_dir().join("include_functions.txt")
    );

    let policy = FilterPolicy::load(&config.filter_lists()).unwrap();
    let pass = SearchFilePass::new(&policy, config.search_options());
    let mut out = Vec::new();
    pass.run(&fixture_module(), &mut out).unwrap();

    // The checked-in config matches the default options.
    assert_eq!(
        String::from_utf8(out).unwrap(),
        run_catalog(SearchOptions::default())
    );
}

#[test]
fn test_config_missing_file_is_an_error() {
    assert!(RunConfig::load(&fixtures_dir().join("no_such_config.toml")).is_err());
}
