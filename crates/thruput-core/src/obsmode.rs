//! Observation modes: obsmode string to composed throughput.
//!
//! An [`ObservationMode`] is built per query. It parses the obsmode into
//! keywords, picks the telescope, resolves the light path from the entry node
//! and maps the components to curve files. Curves are loaded only when the
//! throughput is requested, once per distinct file, and the cache is dropped
//! with the call.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::catalog::{ComponentCatalog, ComponentFile};
use crate::curve::{CurveSource, Sensitivity, ThroughputCurve};
use crate::error::CoreError;
use crate::graph::{GraphTable, ModeSet, Resolution};
use crate::id::{NodeId, ENTRY_NODE};
use crate::telescope::Telescope;

/// Splits an obsmode into lowercase keywords. Commas and whitespace both
/// separate keywords; empty tokens are dropped.
pub fn parse_modes(obsmode: &str) -> ModeSet {
    obsmode
        .to_lowercase()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// A resolved observation configuration.
#[derive(Debug, Clone)]
pub struct ObservationMode {
    obsmode: String,
    modes: ModeSet,
    telescope: Telescope,
    resolution: Resolution,
    files: Vec<ComponentFile>,
}

impl ObservationMode {
    /// Resolves `obsmode` against the graph, starting at the entry node.
    pub fn new(
        obsmode: &str,
        graph: &GraphTable,
        catalog: &ComponentCatalog,
    ) -> Result<Self, CoreError> {
        Self::from_node(obsmode, ENTRY_NODE, graph, catalog)
    }

    /// Resolves `obsmode` starting at `start`.
    pub fn from_node(
        obsmode: &str,
        start: NodeId,
        graph: &GraphTable,
        catalog: &ComponentCatalog,
    ) -> Result<Self, CoreError> {
        let obsmode = obsmode.to_lowercase();
        let modes = parse_modes(&obsmode);
        let telescope = Telescope::select(&modes, &obsmode)?;
        let resolution = graph.resolve(start, &modes)?;
        let files = catalog.lookup(&resolution.components)?;

        Ok(ObservationMode {
            obsmode,
            modes,
            telescope,
            resolution,
            files,
        })
    }

    pub fn modes(&self) -> &ModeSet {
        &self.modes
    }

    pub fn telescope(&self) -> Telescope {
        self.telescope
    }

    /// Collecting area of the telescope in cm².
    pub fn primary_area(&self) -> f64 {
        self.telescope.area_cm2()
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Optical components in light-path order.
    pub fn components(&self) -> &[String] {
        &self.resolution.components
    }

    /// Thermal components. Reported only, never composed.
    pub fn thermal_components(&self) -> &[String] {
        &self.resolution.thermal_components
    }

    /// Component files, parallel to [`Self::components`].
    pub fn files(&self) -> &[ComponentFile] {
        &self.files
    }

    /// Throughput files this mode loads, in order, without clear elements.
    pub fn throughput_files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().filter_map(ComponentFile::path)
    }

    /// Number of components with a throughput curve.
    pub fn len(&self) -> usize {
        self.throughput_files().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Product of every component curve.
    ///
    /// Returns `Ok(None)` with a warning when the path has no component with
    /// a curve, which only happens for broken graph data.
    pub fn throughput<S: CurveSource>(&self, source: &S) -> Result<Option<ThroughputCurve>, CoreError> {
        let mut cache: HashMap<&Path, ThroughputCurve> = HashMap::new();
        let mut order: Vec<&Path> = Vec::new();
        for path in self.throughput_files() {
            if !cache.contains_key(path) {
                cache.insert(path, source.load(path)?);
            }
            order.push(path);
        }

        let product = ThroughputCurve::product(order.iter().filter_map(|path| cache.get(path)));
        match product {
            Some(curve) => Ok(Some(curve.renamed(self.obsmode.clone()))),
            None => {
                tracing::warn!(obsmode = %self.obsmode, "graph table is broken: no throughput components");
                Ok(None)
            }
        }
    }

    /// Sensitivity converting erg/cm²/s/Å to counts/s/Å.
    pub fn sensitivity<S: CurveSource>(&self, source: &S) -> Result<Option<Sensitivity>, CoreError> {
        Ok(self.throughput(source)?.map(|thru| {
            Sensitivity::from_throughput(
                &thru,
                self.primary_area(),
                format!("Sensitivity for {}", self.obsmode),
            )
        }))
    }

    /// Paths of all throughput files, owned.
    pub fn showfiles(&self) -> Vec<PathBuf> {
        self.throughput_files().map(Path::to_path_buf).collect()
    }
}

impl fmt::Display for ObservationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.obsmode)
    }
}

/// Resolves `obsmode` and returns its composed throughput.
pub fn compose<S: CurveSource>(
    obsmode: &str,
    graph: &GraphTable,
    catalog: &ComponentCatalog,
    source: &S,
) -> Result<Option<ThroughputCurve>, CoreError> {
    ObservationMode::new(obsmode, graph, catalog)?.throughput(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::curve::MemoryCurveSource;
    use crate::edge::{ComponentRow, Edge};
    use crate::graph::mode_set;

    fn catalog(names: &[&str]) -> ComponentCatalog {
        ComponentCatalog::from_rows(
            names.iter().map(|n| ComponentRow {
                time: String::new(),
                compname: n.to_string(),
                filename: format!("{n}.txt"),
                comment: String::new(),
            }),
            Path::new("data"),
        )
    }

    fn curve(w: &[f64], t: &[f64]) -> ThroughputCurve {
        ThroughputCurve::from_table("c", w.to_vec(), t.to_vec()).unwrap()
    }

    fn small_graph() -> GraphTable {
        GraphTable::from_edges(&[
            Edge::keyed(1, 2, "clear", "wht"),
            Edge::keyed(1, 2, "clear", "ntt"),
            Edge::new(2, 3, "mirror"),
            Edge::keyed(3, 4, "filt_g", "g"),
            Edge::new(3, 4, "clear"),
            Edge::new(4, 999, "ccd"),
        ])
        .with_sink(NodeId(999))
    }

    fn source() -> MemoryCurveSource {
        let mut source = MemoryCurveSource::new();
        source.insert("data/mirror.txt", curve(&[4000.0, 6000.0], &[0.9, 0.9]));
        source.insert("data/filt_g.txt", curve(&[4000.0, 5000.0, 6000.0], &[0.0, 0.8, 0.0]));
        source.insert("data/ccd.txt", curve(&[4000.0, 6000.0], &[0.5, 0.5]));
        source
    }

    #[test]
    fn parse_modes_splits_and_lowercases() {
        assert_eq!(parse_modes("UCAM, wht,g"), mode_set(["ucam", "wht", "g"]));
        assert_eq!(parse_modes("ucam,,wht  g"), mode_set(["ucam", "wht", "g"]));
        assert!(parse_modes("").is_empty());
    }

    #[test]
    fn resolves_components_and_files() {
        let mode = ObservationMode::new("wht,g", &small_graph(), &catalog(&["mirror", "filt_g", "ccd"]))
            .unwrap();
        assert_eq!(mode.telescope(), Telescope::Wht);
        assert_eq!(mode.components(), ["clear", "mirror", "filt_g", "ccd"]);
        assert_eq!(mode.len(), 3);
        assert_eq!(
            mode.showfiles(),
            vec![
                PathBuf::from("data/mirror.txt"),
                PathBuf::from("data/filt_g.txt"),
                PathBuf::from("data/ccd.txt"),
            ]
        );
        assert_eq!(mode.to_string(), "wht,g");
    }

    #[test]
    fn throughput_is_product_of_components() {
        let mode = ObservationMode::new("wht,g", &small_graph(), &catalog(&["mirror", "filt_g", "ccd"]))
            .unwrap();
        let thru = mode.throughput(&source()).unwrap().unwrap();
        assert!((thru.at(5000.0) - 0.9 * 0.8 * 0.5).abs() < 1e-12);
        assert_eq!(thru.at(4000.0), 0.0);
        assert_eq!(thru.name(), "wht,g");
    }

    #[test]
    fn clear_contributes_unity() {
        let cat = catalog(&["mirror", "filt_g", "ccd"]);
        let with_clear_filter = ObservationMode::new("ntt", &small_graph(), &cat).unwrap();
        let thru = with_clear_filter.throughput(&source()).unwrap().unwrap();
        assert!((thru.at(5000.0) - 0.9 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn sensitivity_uses_telescope_area() {
        let mode = ObservationMode::new("wht,g", &small_graph(), &catalog(&["mirror", "filt_g", "ccd"]))
            .unwrap();
        let thru = mode.throughput(&source()).unwrap().unwrap();
        let sens = mode.sensitivity(&source()).unwrap().unwrap();
        assert_eq!(sens.wavelengths, thru.waveset());
        let expected = thru.at(5000.0) * 5000.0 * Telescope::Wht.area_cm2() / crate::curve::HC;
        let i = sens.wavelengths.iter().position(|&w| w == 5000.0).unwrap();
        assert!((sens.values[i] - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn all_clear_path_yields_none() {
        let graph = GraphTable::from_edges(&[Edge::keyed(1, 2, "clear", "wht")]);
        let mode = ObservationMode::new("wht", &graph, &ComponentCatalog::default()).unwrap();
        assert!(mode.is_empty());
        assert!(mode.throughput(&MemoryCurveSource::new()).unwrap().is_none());
        assert!(mode.sensitivity(&MemoryCurveSource::new()).unwrap().is_none());
    }

    #[test]
    fn multiple_telescopes_rejected_before_resolution() {
        let err = ObservationMode::new("wht,ntt", &small_graph(), &catalog(&[])).unwrap_err();
        assert!(matches!(err, CoreError::AmbiguousTelescope { .. }));
    }

    #[test]
    fn unknown_component_surfaces() {
        let err = ObservationMode::new("wht,g", &small_graph(), &catalog(&["mirror", "ccd"])).unwrap_err();
        match err {
            CoreError::UnknownComponent { name } => assert_eq!(name, "filt_g"),
            other => panic!("expected UnknownComponent, got {other:?}"),
        }
    }

    #[test]
    fn missing_curve_file_is_an_error() {
        let mode = ObservationMode::new("wht,g", &small_graph(), &catalog(&["mirror", "filt_g", "ccd"]))
            .unwrap();
        let err = mode.throughput(&MemoryCurveSource::new()).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }

    /// Counts loads per path on top of an in-memory source.
    struct CountingSource {
        inner: MemoryCurveSource,
        loads: RefCell<HashMap<PathBuf, usize>>,
    }

    impl CurveSource for CountingSource {
        fn load(&self, path: &Path) -> Result<ThroughputCurve, CoreError> {
            *self.loads.borrow_mut().entry(path.to_path_buf()).or_default() += 1;
            self.inner.load(path)
        }
    }

    #[test]
    fn repeated_component_is_loaded_once() {
        let graph = GraphTable::from_edges(&[
            Edge::keyed(1, 2, "alum", "wht"),
            Edge::new(2, 3, "alum"),
            Edge::new(3, 4, "alum"),
            Edge::new(4, 999, "ccd"),
        ])
        .with_sink(NodeId(999));
        let mode = ObservationMode::new("wht", &graph, &catalog(&["alum", "ccd"])).unwrap();
        assert_eq!(mode.len(), 4);

        let mut inner = MemoryCurveSource::new();
        inner.insert("data/alum.txt", curve(&[4000.0, 6000.0], &[0.9, 0.9]));
        inner.insert("data/ccd.txt", curve(&[4000.0, 6000.0], &[0.5, 0.5]));
        let source = CountingSource {
            inner,
            loads: RefCell::new(HashMap::new()),
        };

        let thru = mode.throughput(&source).unwrap().unwrap();
        assert!((thru.at(5000.0) - 0.9 * 0.9 * 0.9 * 0.5).abs() < 1e-12);
        assert_eq!(thru.factor_count(), 4);

        let loads = source.loads.borrow();
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[Path::new("data/alum.txt")], 1);
        assert_eq!(loads[Path::new("data/ccd.txt")], 1);

        // The cache lives for one call only.
        drop(loads);
        mode.throughput(&source).unwrap();
        assert_eq!(source.loads.borrow()[Path::new("data/alum.txt")], 2);
    }

    #[test]
    fn compose_resolves_and_multiplies() {
        let thru = compose(
            "wht g",
            &small_graph(),
            &catalog(&["mirror", "filt_g", "ccd"]),
            &source(),
        )
        .unwrap()
        .unwrap();
        assert!(thru.at(5000.0) > 0.0);
    }
}
