use converter_core::{encode, EncodingError, FileGroupSet, RawFile, SubmissionOptions};
use pretty_assertions::assert_eq;

fn set_of(paths: &[&str]) -> FileGroupSet {
    let mut set = FileGroupSet::new();
    set.add_files(
        paths
            .iter()
            .map(|path| RawFile::new(*path, path.as_bytes().to_vec()))
            .collect(),
    )
    .unwrap();
    set
}

#[test]
fn empty_selection_fails_to_encode() {
    let err = encode(&FileGroupSet::new(), &SubmissionOptions::default()).unwrap_err();
    assert_eq!(err, EncodingError::EmptySelection);
}

#[test]
fn keys_are_directory_major_in_insertion_order() {
    let set = set_of(&["A/2.jpg", "B/1.jpg", "A/1.jpg", "B/0.jpg"]);

    let payload = encode(&set, &SubmissionOptions::default()).unwrap();

    let keys: Vec<_> = payload.keys().collect();
    assert_eq!(keys, vec!["A/2.jpg", "A/1.jpg", "B/1.jpg", "B/0.jpg"]);
}

#[test]
fn every_file_appears_once_with_its_bytes() {
    let set = set_of(&["A/1.jpg", "A/2.jpg", "B/1.jpg"]);

    let payload = encode(&set, &SubmissionOptions::default()).unwrap();

    assert_eq!(payload.parts.len(), set.len());
    for part in &payload.parts {
        assert_eq!(part.file.bytes.as_ref(), part.key.as_bytes());
    }
    assert_eq!(payload.total_bytes(), "A/1.jpgA/2.jpgB/1.jpg".len() as u64);
}

#[test]
fn manga_mode_is_sent_as_literal_boolean() {
    let set = set_of(&["A/1.jpg"]);

    let off = encode(&set, &SubmissionOptions { manga_mode: false }).unwrap();
    let on = encode(&set, &SubmissionOptions { manga_mode: true }).unwrap();

    assert_eq!(
        off.fields,
        vec![("manga_mode".to_string(), "false".to_string())]
    );
    assert_eq!(on.fields, vec![("manga_mode".to_string(), "true".to_string())]);
}

#[test]
fn encoding_is_deterministic() {
    let set = set_of(&["X/b.png", "Y/a.png", "X/a.png"]);
    let options = SubmissionOptions { manga_mode: true };

    assert_eq!(encode(&set, &options), encode(&set, &options));
}

#[test]
fn same_name_in_different_subfolders_shares_a_key() {
    let set = set_of(&["A/1.jpg", "A/extras/1.jpg", "A/2.jpg", "B/1.jpg"]);

    let payload = encode(&set, &SubmissionOptions::default()).unwrap();

    let keys: Vec<_> = payload.keys().collect();
    assert_eq!(keys, vec!["A/1.jpg", "A/1.jpg", "A/2.jpg", "B/1.jpg"]);
    assert_eq!(set.duplicate_keys(), vec!["A/1.jpg".to_string()]);
}

#[test]
fn distinct_keys_report_no_duplicates() {
    let set = set_of(&["A/1.jpg", "A/2.jpg", "B/1.jpg"]);
    assert!(set.duplicate_keys().is_empty());
}
