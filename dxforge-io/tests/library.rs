use std::io::Write;

use dxforge_io::{LibraryError, LibraryFile};
use tempfile::NamedTempFile;

const SAMPLE: &str = "\
*ANSI31, ANSI Iron, Brick, Stone masonry
45, 0, 0, 0, 3.175

*CENTER2,Center (.5x) ____ _ ____ _ ____
A,.75,-.125,.125,-.125

*STEEL,Steel pattern
45, 0, 0, 0, 4
45, 0, .25, 0, 4
";

#[test]
fn header_comma_splits_name_and_inform() {
    let mut library = LibraryFile::from_text(SAMPLE);
    let record = library.get("ANSI31").expect("ANSI31 should parse");
    assert_eq!(record.name, "ANSI31");
    assert_eq!(record.inform, "ANSI Iron, Brick, Stone masonry");
    assert_eq!(record.content, vec![vec![45.0, 0.0, 0.0, 0.0, 3.175]]);
}

#[test]
fn alpha_flags_are_skipped_and_bare_decimals_parse() {
    let mut library = LibraryFile::from_text(SAMPLE);
    let record = library.get("CENTER2").expect("CENTER2 should parse");
    assert_eq!(record.content, vec![vec![0.75, -0.125, 0.125, -0.125]]);
}

#[test]
fn record_collects_rows_until_next_header() {
    let mut library = LibraryFile::from_text(SAMPLE);
    let record = library.get("STEEL").expect("STEEL should parse");
    assert_eq!(record.content.len(), 2);
    assert_eq!(record.content[1], vec![45.0, 0.0, 0.25, 0.0, 4.0]);
}

#[test]
fn missing_record_reports_name() {
    let mut library = LibraryFile::from_text(SAMPLE);
    let error = library.get("MISSING").expect_err("MISSING should not parse");
    let LibraryError::NotFound { name } = &error;
    assert_eq!(name, "MISSING");
    assert_eq!(error.to_string(), "record \"MISSING\" not found in library");
}

#[test]
fn repeated_lookup_returns_same_record() {
    let mut library = LibraryFile::from_text(SAMPLE);
    let first = library.get("ANSI31").expect("ANSI31 should parse").clone();
    let second = library.get("ANSI31").expect("ANSI31 should stay cached");
    assert_eq!(&first, second);
}

#[test]
fn exact_name_match_only() {
    let mut library = LibraryFile::from_text("*CENTERX,longer name\n1.0,-0.5\n");
    assert!(library.get("CENTER").is_err());
    assert!(library.get("CENTERX").is_ok());
}

#[test]
fn open_reads_library_from_disk() {
    let mut file = NamedTempFile::new().expect("create temp library file");
    write!(file, "{SAMPLE}").expect("write temp library file");
    let mut library = LibraryFile::open(file.path()).expect("open temp library file");
    let record = library.get("ANSI31").expect("ANSI31 should parse from disk");
    assert_eq!(record.content, vec![vec![45.0, 0.0, 0.0, 0.0, 3.175]]);
}

#[test]
fn open_missing_file_reports_path() {
    let error = LibraryFile::open(std::path::Path::new("/nonexistent/acadiso.pat"))
        .expect_err("missing file should fail");
    assert!(error.to_string().contains("acadiso.pat"));
}
