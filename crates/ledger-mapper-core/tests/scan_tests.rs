use std::fs;
use std::path::Path;
use tempfile::tempdir;

use ledger_mapper_core::scanner::{scan, ScanOptions};
use ledger_mapper_core::{DocType, Error, FileRecord};

fn touch(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn collect(root: &Path, options: &ScanOptions) -> Vec<FileRecord> {
    scan(root, options)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn test_entity_and_year_segments() {
    let tmp = tempdir().unwrap();
    touch(tmp.path(), "Argon Hotel/LD 2023.XLS", b"ld");
    touch(tmp.path(), "Bemus Hotels/2017/SYS 30.09.2017.XLS", b"sys");
    touch(tmp.path(), "Bemus Hotels/2017/cierre/LD 2017.XLS", b"ld");
    touch(tmp.path(), "Bemus Hotels/Archivo/LD 2016.XLS", b"ld");
    touch(tmp.path(), "Bemus Hotels/1850/LD.XLS", b"ld");

    let records = collect(tmp.path(), &ScanOptions::default());
    let by_path = |p: &str| records.iter().find(|r| r.source_path() == p).unwrap();

    let argon = by_path("Argon Hotel/LD 2023.XLS");
    assert_eq!(argon.entity_name, "Argon Hotel");
    assert_eq!(argon.year, None);
    assert_eq!(argon.parent_folder, None);
    assert_eq!(argon.size_bytes, 2);
    assert_eq!(argon.doc_type, DocType::Otro);

    let bemus = by_path("Bemus Hotels/2017/SYS 30.09.2017.XLS");
    assert_eq!(bemus.year, Some(2017));
    assert_eq!(bemus.parent_folder, None);

    let nested = by_path("Bemus Hotels/2017/cierre/LD 2017.XLS");
    assert_eq!(nested.year, Some(2017));
    assert_eq!(nested.parent_folder.as_deref(), Some("cierre"));

    let archived = by_path("Bemus Hotels/Archivo/LD 2016.XLS");
    assert_eq!(archived.year, None);
    assert_eq!(archived.parent_folder.as_deref(), Some("Archivo"));

    // Out of range: an ordinary subfolder.
    let old = by_path("Bemus Hotels/1850/LD.XLS");
    assert_eq!(old.year, None);
    assert_eq!(old.parent_folder.as_deref(), Some("1850"));
}

#[test]
fn test_discovery_order_is_sorted_and_indexed() {
    let tmp = tempdir().unwrap();
    touch(tmp.path(), "Braide/b.xls", b"");
    touch(tmp.path(), "Argon Hotel/z.xls", b"");
    touch(tmp.path(), "Braide/a.xls", b"");

    let records = collect(tmp.path(), &ScanOptions::default());
    let paths: Vec<String> = records.iter().map(|r| r.source_path()).collect();
    assert_eq!(paths, vec!["Argon Hotel/z.xls", "Braide/a.xls", "Braide/b.xls"]);
    let indices: Vec<usize> = records.iter().map(|r| r.discovery_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn test_files_at_root_are_skipped() {
    let tmp = tempdir().unwrap();
    touch(tmp.path(), "README.txt", b"root level");
    touch(tmp.path(), "Argon Hotel/LD.xls", b"");

    let records = collect(tmp.path(), &ScanOptions::default());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].entity_name, "Argon Hotel");
}

#[test]
fn test_ignore_patterns() {
    let tmp = tempdir().unwrap();
    touch(tmp.path(), "Argon Hotel/LD.xls", b"");
    touch(tmp.path(), "Argon Hotel/~$LD.xls", b"");
    touch(tmp.path(), "Argon Hotel/backup/LD.xls", b"");

    let options = ScanOptions {
        ignore_patterns: vec!["*/~$*".to_string(), "*/backup".to_string()],
        ..ScanOptions::default()
    };
    let records = collect(tmp.path(), &options);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source_path(), "Argon Hotel/LD.xls");
}

#[test]
fn test_invalid_glob_is_ignored() {
    let tmp = tempdir().unwrap();
    touch(tmp.path(), "Argon Hotel/LD.xls", b"");

    let options = ScanOptions {
        ignore_patterns: vec!["[".to_string()],
        ..ScanOptions::default()
    };
    assert_eq!(collect(tmp.path(), &options).len(), 1);
}

#[test]
fn test_missing_root() {
    let tmp = tempdir().unwrap();
    let result = scan(&tmp.path().join("nope"), &ScanOptions::default());
    assert!(matches!(result, Err(Error::InvalidRoot { .. })));
}

#[cfg(unix)]
#[test]
fn test_unreadable_folder_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    touch(tmp.path(), "Argon Hotel/LD.xls", b"ld");
    touch(tmp.path(), "Bemus Hotels/locked/LD.xls", b"ld");
    touch(tmp.path(), "Braide/SYS.xls", b"sys");

    let locked = tmp.path().join("Bemus Hotels/locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&locked).is_ok() {
        // Permissions are not enforced (running as root).
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let items: Vec<_> = scan(tmp.path(), &ScanOptions::default()).unwrap().collect();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let errors: Vec<_> = items.iter().filter_map(|i| i.as_ref().err()).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), locked.as_path());

    let paths: Vec<String> = items
        .iter()
        .filter_map(|i| i.as_ref().ok())
        .map(|r| r.source_path())
        .collect();
    assert_eq!(paths, vec!["Argon Hotel/LD.xls", "Braide/SYS.xls"]);
}
