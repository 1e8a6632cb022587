use rstest::rstest;
use weigh_hardware::{FileStore, MemoryStore};
use weigh_traits::KvStore;

#[test]
fn values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = FileStore::open(dir.path(), "bascula").expect("open");
        assert_eq!(store.get_f32("cal_f", 1.0), 1.0);
        assert_eq!(store.get_i32("tare", 0), 0);
        store.put_f32("cal_f", 0.5).unwrap();
        store.put_i32("tare", -8_000).unwrap();
    }
    let store = FileStore::open(dir.path(), "bascula").expect("reopen");
    assert_eq!(store.get_f32("cal_f", 1.0), 0.5);
    assert_eq!(store.get_i32("tare", 0), -8_000);
    assert!(store.path().ends_with("bascula.toml"));
}

#[test]
fn namespaces_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = FileStore::open(dir.path(), "left").unwrap();
    a.put_i32("tare", 7).unwrap();
    let b = FileStore::open(dir.path(), "right").unwrap();
    assert_eq!(b.get_i32("tare", 0), 0);
}

#[test]
fn creates_missing_directory_on_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("var").join("weigh");
    let mut store = FileStore::open(&nested, "bascula").unwrap();
    store.put_i32("tare", 1).unwrap();
    assert!(nested.join("bascula.toml").exists());
    assert!(!nested.join("bascula.new").exists());
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bascula.toml"), "floats = 12").unwrap();
    let err = FileStore::open(dir.path(), "bascula").expect_err("corrupt");
    assert!(err.to_string().contains("storage error"));
}

#[rstest]
#[case("")]
#[case("a/b")]
fn rejects_bad_namespace(#[case] ns: &str) {
    let dir = tempfile::tempdir().unwrap();
    assert!(FileStore::open(dir.path(), ns).is_err());
}

#[test]
fn memory_store_clones_share_and_can_refuse_writes() {
    let store = MemoryStore::new();
    let mut dev = store.clone();
    dev.put_f32("cal_f", 2.5).unwrap();
    assert_eq!(store.get_f32("cal_f", 1.0), 2.5);
    assert_eq!(store.writes(), 1);

    store.fail_writes(true);
    assert!(dev.put_i32("tare", 3).is_err());
    assert_eq!(store.get_i32("tare", 0), 0);
    assert_eq!(store.writes(), 1);
}
