//! Install, reopen and query tables in an on-disk SQLite database.

use std::fs;

use thruput_core::instruments::graph_rows;
use thruput_core::{FileCurveSource, ObservationMode, Telescope};
use thruput_storage::{
    ensure_tables, install_curves, list_keywords, load_catalog, load_graph_table, SqliteStore,
    StorageError, TableStore, ThruputConfig,
};

/// Writes a flat curve file for every installed component.
fn write_curves(store: &SqliteStore, config: &ThruputConfig) {
    fs::create_dir_all(config.data_dir()).unwrap();
    for row in store.load_component_rows().unwrap() {
        fs::write(
            config.data_dir().join(&row.filename),
            "# flat\n3000 0.5\n11000 0.5\n",
        )
        .unwrap();
    }
}

#[test]
fn install_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = ThruputConfig::with_home(dir.path());

    {
        let mut store = SqliteStore::new(&config.database_path()).unwrap();
        assert!(ensure_tables(&mut store).unwrap());
    }

    let mut store = SqliteStore::new(&config.database_path()).unwrap();
    assert!(!ensure_tables(&mut store).unwrap());
    assert_eq!(store.load_graph_rows().unwrap(), graph_rows());
    assert!(list_keywords(&store).unwrap().contains("ucam"));
}

#[test]
fn stale_database_is_reinstalled() {
    let dir = tempfile::tempdir().unwrap();
    let config = ThruputConfig::with_home(dir.path());
    let mut store = SqliteStore::new(&config.database_path()).unwrap();

    store
        .save_tables(&graph_rows()[..3], &[], "from an older release")
        .unwrap();
    assert!(ensure_tables(&mut store).unwrap());
    assert_eq!(store.load_graph_rows().unwrap().len(), graph_rows().len());
}

#[test]
fn installed_tables_compose_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = ThruputConfig::with_home(dir.path());
    let mut store = SqliteStore::new(&config.database_path()).unwrap();
    ensure_tables(&mut store).unwrap();
    write_curves(&store, &config);

    let graph = load_graph_table(&store).unwrap();
    let catalog = load_catalog(&store, &config).unwrap();
    let mode = ObservationMode::new("ucam,wht,g", &graph, &catalog).unwrap();
    assert_eq!(mode.telescope(), Telescope::Wht);

    let thru = mode.throughput(&FileCurveSource).unwrap().unwrap();
    let expected = 0.5f64.powi(mode.len() as i32);
    assert!((thru.at(5000.0) - expected).abs() < 1e-12);
    assert!(mode.showfiles().iter().all(|p| p.starts_with(config.data_dir())));
}

#[test]
fn curves_are_copied_into_the_library() {
    let dir = tempfile::tempdir().unwrap();
    let library = dir.path().join("cdbs");
    fs::create_dir(&library).unwrap();
    let config = ThruputConfig::with_home(dir.path().join("home")).with_library_dir(&library);
    fs::create_dir_all(config.home()).unwrap();

    let mut store = SqliteStore::new(&config.database_path()).unwrap();
    ensure_tables(&mut store).unwrap();
    write_curves(&store, &config);

    let copied = install_curves(&store, &config).unwrap();
    assert_eq!(copied.len(), store.load_component_rows().unwrap().len());
    assert!(library.join("comp").join("ucam").join("atmos.txt").is_file());
}

#[test]
fn missing_curve_file_fails_the_copy() {
    let dir = tempfile::tempdir().unwrap();
    let library = dir.path().join("cdbs");
    fs::create_dir(&library).unwrap();
    let config = ThruputConfig::with_home(dir.path()).with_library_dir(&library);

    let mut store = SqliteStore::new(&config.database_path()).unwrap();
    ensure_tables(&mut store).unwrap();

    match install_curves(&store, &config) {
        Err(StorageError::Io { path, .. }) => assert!(path.starts_with(config.data_dir())),
        other => panic!("expected Io error, got {other:?}"),
    }
}
