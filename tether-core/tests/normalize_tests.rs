//! Parameterised normalization and basis-parsing tests for `tether-core`.
//!
//! Each `#[case]` is isolated; no shared state.

use rstest::rstest;
use tether_core::types::{ChangeBasis, EditStrategy, PageFile, PermalinkValue};

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

#[rstest]
#[case("about", "about")]
#[case("  about  ", "about")]
#[case("b page", "b-page")]
#[case("  our  team ", "our--team")]
#[case("already-normal", "already-normal")]
#[case("", "")]
#[case("\tTabbed\n", "Tabbed")]
#[case("über uns", "über-uns")]
fn normalize_cases(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(PermalinkValue::normalize(raw).as_str(), expected, "input: {raw:?}");
}

#[rstest]
#[case("b page")]
#[case("  leading and trailing  ")]
#[case(" - ")]
#[case("a  b   c")]
#[case("")]
#[case("   ")]
#[case("x\u{00a0}y z")]
fn normalize_is_idempotent(#[case] raw: &str) {
    let once = PermalinkValue::normalize(raw);
    let twice = PermalinkValue::normalize(once.as_str());
    assert_eq!(once, twice, "input: {raw:?}");
}

// ---------------------------------------------------------------------------
// PageFile
// ---------------------------------------------------------------------------

#[rstest]
#[case("pages/about.yaml", Some("about"))]
#[case("pages/our team.yaml", Some("our team"))]
#[case("pages/archive.tar.yaml", Some("archive.tar"))]
#[case("pages/about.yml", None)]
#[case("pages/.yaml", None)]
fn page_file_stems(#[case] path: &str, #[case] stem: Option<&str>) {
    let page = PageFile::from_path(path, "yaml");
    assert_eq!(page.as_ref().map(|p| p.filename_stem.as_str()), stem);
}

#[test]
fn inferred_permalink_is_normalized_stem() {
    let page = PageFile::from_path("pages/our team.yaml", "yaml").expect("page");
    assert_eq!(page.inferred_permalink().as_str(), "our-team");
}

// ---------------------------------------------------------------------------
// ChangeBasis / EditStrategy
// ---------------------------------------------------------------------------

#[rstest]
#[case("full-scan", ChangeBasis::FullScan)]
#[case("Full", ChangeBasis::FullScan)]
#[case("DIFF", ChangeBasis::Diff)]
#[case("structured", ChangeBasis::Structured)]
fn basis_from_str(#[case] input: &str, #[case] expected: ChangeBasis) {
    assert_eq!(input.parse::<ChangeBasis>().expect("parse"), expected);
}

#[rstest]
#[case(ChangeBasis::FullScan, EditStrategy::Lines)]
#[case(ChangeBasis::Diff, EditStrategy::Lines)]
#[case(ChangeBasis::Structured, EditStrategy::Document)]
fn basis_yaml_roundtrip(#[case] basis: ChangeBasis, #[case] edit: EditStrategy) {
    let yaml = serde_yaml::to_string(&basis).expect("serialize");
    let back: ChangeBasis = serde_yaml::from_str(&yaml).expect("deserialize");
    assert_eq!(back, basis);
    assert_eq!(basis.default_edit(), edit);
}
