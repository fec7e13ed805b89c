//! Wavelength-dependent throughput curves.
//!
//! A [`ThroughputCurve`] is a piecewise linear function of wavelength
//! (angstrom) sampled at strictly increasing points. It evaluates to zero
//! outside its sampled range. Curves are combined by pointwise
//! multiplication on the union of both wavesets, so the product of any
//! number of curves is the same whatever order they are multiplied in.
//!
//! Curve files are two whitespace-separated numeric columns,
//! `wavelength throughput`, with no header. Blank lines and lines starting
//! with `#` are skipped.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Planck constant times the speed of light, in erg angstrom.
pub const HC: f64 = 6.626_070_15e-27 * 2.997_924_58e18;

/// One sampled table, as read from a single curve file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Samples {
    /// Wavelengths in angstrom, strictly increasing.
    wavelengths: Vec<f64>,
    /// Dimensionless throughput at each wavelength.
    values: Vec<f64>,
}

impl Samples {
    /// Linear interpolation inside the sampled range, zero outside.
    fn at(&self, wavelength: f64) -> f64 {
        let first = self.wavelengths[0];
        let last = self.wavelengths[self.wavelengths.len() - 1];
        if wavelength < first || wavelength > last {
            return 0.0;
        }

        // Index of the first sample strictly above `wavelength`.
        let upper = self.wavelengths.partition_point(|&w| w <= wavelength);
        if upper == self.wavelengths.len() {
            return self.values[upper - 1];
        }
        let (w0, w1) = (self.wavelengths[upper - 1], self.wavelengths[upper]);
        let (t0, t1) = (self.values[upper - 1], self.values[upper]);
        let frac = (wavelength - w0) / (w1 - w0);
        t0 * (1.0 - frac) + t1 * frac
    }
}

/// Transmission or reflection fraction as a function of wavelength.
///
/// Holds the sampled tables it was multiplied from and evaluates their exact
/// product, so composition never interpolates an already-multiplied curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputCurve {
    name: String,
    factors: Vec<Samples>,
    /// Union of every factor's wavelengths.
    waveset: Vec<f64>,
}

impl ThroughputCurve {
    /// Creates a curve from parallel wavelength and throughput tables.
    pub fn from_table(
        name: impl Into<String>,
        wavelengths: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if wavelengths.is_empty() || wavelengths.len() != values.len() {
            return Err(CoreError::EmptyCurve { name });
        }
        // Finite and strictly increasing; NaN fails both checks.
        let ascending = wavelengths.iter().all(|w| w.is_finite())
            && wavelengths.windows(2).all(|w| w[1] > w[0]);
        if !ascending {
            return Err(CoreError::NotAscending { name });
        }
        Ok(ThroughputCurve {
            name,
            waveset: wavelengths.clone(),
            factors: vec![Samples {
                wavelengths,
                values,
            }],
        })
    }

    /// Reads a two-column curve file. The curve is named after the file stem.
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let text = fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::parse(&name, &text, path)
    }

    /// Parses curve text. `origin` is only used in error messages.
    pub fn parse(name: &str, text: &str, origin: &Path) -> Result<Self, CoreError> {
        let parse_error = |line: usize, reason: String| CoreError::CurveParse {
            path: origin.to_path_buf(),
            line,
            reason,
        };

        let mut wavelengths = Vec::new();
        let mut values = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut columns = line.split_whitespace();
            let (Some(w), Some(t)) = (columns.next(), columns.next()) else {
                return Err(parse_error(lineno + 1, format!("expected two columns: {line:?}")));
            };
            let w: f64 = w
                .parse()
                .map_err(|e| parse_error(lineno + 1, format!("bad wavelength {w:?}: {e}")))?;
            let t: f64 = t
                .parse()
                .map_err(|e| parse_error(lineno + 1, format!("bad throughput {t:?}: {e}")))?;
            wavelengths.push(w);
            values.push(t);
        }

        Self::from_table(name, wavelengths, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wavelengths in angstrom the curve is sampled at.
    pub fn waveset(&self) -> &[f64] {
        &self.waveset
    }

    /// Throughput evaluated at every point of [`Self::waveset`].
    pub fn values(&self) -> Vec<f64> {
        self.waveset.iter().map(|&w| self.at(w)).collect()
    }

    pub fn len(&self) -> usize {
        self.waveset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waveset.is_empty()
    }

    /// Number of sampled tables multiplied into this curve.
    pub fn factor_count(&self) -> usize {
        self.factors.len()
    }

    /// Throughput at `wavelength`: the product of every factor, each
    /// linearly interpolated and zero outside its sampled range.
    pub fn at(&self, wavelength: f64) -> f64 {
        self.factors.iter().map(|f| f.at(wavelength)).product()
    }

    /// Pointwise product, sampled on the union of both wavesets.
    pub fn multiply(&self, other: &ThroughputCurve) -> ThroughputCurve {
        ThroughputCurve {
            name: format!("{} * {}", self.name, other.name),
            factors: self.factors.iter().chain(&other.factors).cloned().collect(),
            waveset: merge_wavesets(&self.waveset, &other.waveset),
        }
    }

    /// Product of all curves, `None` for an empty input.
    pub fn product<'a, I>(curves: I) -> Option<ThroughputCurve>
    where
        I: IntoIterator<Item = &'a ThroughputCurve>,
    {
        let mut curves = curves.into_iter();
        let first = curves.next()?.clone();
        Some(curves.fold(first, |acc, curve| acc.multiply(curve)))
    }

    /// Replaces the curve name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Writes the curve as two-column text on its waveset.
    pub fn write_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for &w in &self.waveset {
            writeln!(out, "{w:.4} {:.6e}", self.at(w))?;
        }
        Ok(())
    }
}

/// Sorted union of two strictly increasing wavesets.
fn merge_wavesets(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            merged.push(a[i]);
            i += 1;
        } else if b[j] < a[i] {
            merged.push(b[j]);
            j += 1;
        } else {
            merged.push(a[i]);
            i += 1;
            j += 1;
        }
    }
    merged.extend_from_slice(&a[i..]);
    merged.extend_from_slice(&b[j..]);
    merged
}

/// Counting efficiency: converts flux density in erg/cm²/s/Å into
/// counts/s/Å.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensitivity {
    pub description: String,
    pub wavelengths: Vec<f64>,
    pub values: Vec<f64>,
}

impl Sensitivity {
    /// `T(λ) · λ · area / (h c)` on the throughput curve's own waveset.
    pub fn from_throughput(
        throughput: &ThroughputCurve,
        area_cm2: f64,
        description: impl Into<String>,
    ) -> Self {
        let constant = area_cm2 / HC;
        let values = throughput
            .waveset
            .iter()
            .map(|&w| throughput.at(w) * w * constant)
            .collect();
        Sensitivity {
            description: description.into(),
            wavelengths: throughput.waveset.clone(),
            values,
        }
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for (w, s) in self.wavelengths.iter().zip(&self.values) {
            writeln!(out, "{w:.4} {s:.6e}")?;
        }
        Ok(())
    }
}

/// Source of throughput curves, keyed by component file.
pub trait CurveSource {
    fn load(&self, path: &Path) -> Result<ThroughputCurve, CoreError>;
}

/// Loads curves from two-column text files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCurveSource;

impl CurveSource for FileCurveSource {
    fn load(&self, path: &Path) -> Result<ThroughputCurve, CoreError> {
        ThroughputCurve::from_file(path)
    }
}

/// Serves curves held in memory, keyed by the path the catalog assigns.
#[derive(Debug, Clone, Default)]
pub struct MemoryCurveSource {
    curves: HashMap<PathBuf, ThroughputCurve>,
}

impl MemoryCurveSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, curve: ThroughputCurve) {
        self.curves.insert(path.into(), curve);
    }
}

impl CurveSource for MemoryCurveSource {
    fn load(&self, path: &Path) -> Result<ThroughputCurve, CoreError> {
        self.curves.get(path).cloned().ok_or_else(|| CoreError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "curve not registered"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(name: &str, w: &[f64], t: &[f64]) -> ThroughputCurve {
        ThroughputCurve::from_table(name, w.to_vec(), t.to_vec()).unwrap()
    }

    #[test]
    fn interpolates_linearly_and_zero_outside() {
        let c = curve("c", &[4000.0, 5000.0, 6000.0], &[0.2, 0.8, 0.4]);
        assert_eq!(c.at(4000.0), 0.2);
        assert_eq!(c.at(5000.0), 0.8);
        assert_eq!(c.at(6000.0), 0.4);
        assert!((c.at(4500.0) - 0.5).abs() < 1e-12);
        assert!((c.at(5750.0) - 0.5).abs() < 1e-12);
        assert_eq!(c.at(3999.0), 0.0);
        assert_eq!(c.at(6001.0), 0.0);
    }

    #[test]
    fn single_sample_curve_evaluates_at_its_point() {
        let c = curve("c", &[5000.0], &[0.7]);
        assert_eq!(c.at(5000.0), 0.7);
        assert_eq!(c.at(5001.0), 0.0);
    }

    #[test]
    fn rejects_unsorted_and_empty_tables() {
        assert!(matches!(
            ThroughputCurve::from_table("c", vec![5000.0, 4000.0], vec![0.1, 0.2]),
            Err(CoreError::NotAscending { .. })
        ));
        assert!(matches!(
            ThroughputCurve::from_table("c", vec![], vec![]),
            Err(CoreError::EmptyCurve { .. })
        ));
        assert!(matches!(
            ThroughputCurve::from_table("c", vec![1.0, 2.0], vec![0.1]),
            Err(CoreError::EmptyCurve { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_wavelengths() {
        let err = ThroughputCurve::parse("c", "nan 0.5\n4000 0.5\n5000 0.5\n", Path::new("c.txt"))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotAscending { .. }));
        assert!(matches!(
            ThroughputCurve::from_table("c", vec![4000.0, f64::NAN], vec![0.5, 0.5]),
            Err(CoreError::NotAscending { .. })
        ));
        assert!(matches!(
            ThroughputCurve::from_table("c", vec![f64::INFINITY], vec![0.5]),
            Err(CoreError::NotAscending { .. })
        ));
    }

    #[test]
    fn parses_two_column_text() {
        let text = "# lab measurement\n3000 0.10\n\n4000   0.50 extra\n5000\t0.9\n";
        let c = ThroughputCurve::parse("lens", text, Path::new("lens.txt")).unwrap();
        assert_eq!(c.waveset(), &[3000.0, 4000.0, 5000.0]);
        assert_eq!(c.values(), vec![0.1, 0.5, 0.9]);
    }

    #[test]
    fn parse_error_reports_line() {
        let err = ThroughputCurve::parse("lens", "3000 0.1\n4000 abc\n", Path::new("lens.txt"))
            .unwrap_err();
        match err {
            CoreError::CurveParse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected CurveParse, got {other:?}"),
        }
    }

    #[test]
    fn multiply_uses_union_waveset() {
        let a = curve("a", &[1000.0, 3000.0], &[1.0, 1.0]);
        let b = curve("b", &[2000.0, 3000.0, 4000.0], &[0.5, 0.5, 0.5]);
        let p = a.multiply(&b);
        assert_eq!(p.waveset(), &[1000.0, 2000.0, 3000.0, 4000.0]);
        assert_eq!(p.values(), vec![0.0, 0.5, 0.5, 0.0]);
        assert_eq!(p.factor_count(), 2);
    }

    #[test]
    fn product_is_exact_between_samples() {
        let a = curve("a", &[1000.0, 2000.0], &[1.0, 1.0]);
        let b = curve("b", &[1500.0, 3000.0], &[1.0, 1.0]);
        let p = a.multiply(&b);
        // b is zero below 1500 even though the product waveset starts at 1000
        assert_eq!(p.at(1250.0), 0.0);
        assert_eq!(p.at(1750.0), 1.0);
    }

    #[test]
    fn product_of_nothing_is_none() {
        assert!(ThroughputCurve::product(std::iter::empty()).is_none());
    }

    #[test]
    fn sensitivity_scales_by_wavelength_and_area() {
        let t = curve("t", &[5000.0, 6000.0], &[0.5, 0.25]);
        let s = Sensitivity::from_throughput(&t, 2.0, "test");
        assert_eq!(s.wavelengths, vec![5000.0, 6000.0]);
        let expected = 0.5 * 5000.0 * 2.0 / HC;
        assert!((s.values[0] - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn file_source_reads_curve() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ucam_g.txt");
        fs::write(&path, "4000 0.1\n5000 0.9\n").unwrap();
        let c = FileCurveSource.load(&path).unwrap();
        assert_eq!(c.name(), "ucam_g");
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn write_then_parse_keeps_samples() {
        let c = curve("c", &[4000.0, 5000.0], &[0.25, 0.75]);
        let mut buf = Vec::new();
        c.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let back = ThroughputCurve::parse("c", &text, Path::new("c.txt")).unwrap();
        assert_eq!(back, c);
    }
}
