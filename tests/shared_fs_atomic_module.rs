use clawboot::shared::fs_atomic::{
    atomic_write_file, atomic_write_with_mode, remove_file_if_exists, sha256_hex, FileMode,
};
use std::fs;

#[test]
fn shared_fs_atomic_overwrites_and_creates_parents() {
    let temp = tempfile::tempdir().expect("tempdir");
    let target = temp.path().join("nested/output.txt");

    atomic_write_file(&target, b"first").expect("write first");
    assert_eq!(fs::read_to_string(&target).expect("read first"), "first");

    atomic_write_file(&target, b"second").expect("write second");
    assert_eq!(fs::read_to_string(&target).expect("read second"), "second");

    let leftovers: Vec<_> = fs::read_dir(temp.path().join("nested"))
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(leftovers.len(), 1);
}

#[cfg(unix)]
#[test]
fn owner_only_writes_are_not_group_readable() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().expect("tempdir");
    let target = temp.path().join("secret.json");
    atomic_write_with_mode(&target, b"{}", FileMode::OwnerOnly).expect("write");
    let mode = fs::metadata(&target).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o077, 0);
}

#[test]
fn remove_file_if_exists_reports_whether_it_removed() {
    let temp = tempfile::tempdir().expect("tempdir");
    let target = temp.path().join("gateway.lock");
    fs::write(&target, "1").expect("lock");

    assert!(remove_file_if_exists(&target).expect("remove"));
    assert!(!remove_file_if_exists(&target).expect("remove again"));
}

#[test]
fn sha256_hex_is_lowercase_hex() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}
