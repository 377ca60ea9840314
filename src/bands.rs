use gdal::{Dataset, Metadata};
use std::fmt::Display;

/// Tag keys that may carry a band's polarization name.
pub const POLARIZATION_TAG_KEYS: [&str; 4] = ["BAND_NAME", "name", "band_name", "long_name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Polarization {
    VV,
    VH,
}

impl Polarization {
    pub const ALL: [Polarization; 2] = [Polarization::VV, Polarization::VH];

    pub fn as_str(&self) -> &'static str {
        match self {
            Polarization::VV => "VV",
            Polarization::VH => "VH",
        }
    }

    /// Exact, case-insensitive match of a trimmed label.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|pol| label.eq_ignore_ascii_case(pol.as_str()))
    }
}

impl Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 1-based band index of each polarization, if present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolarizationIndexMap {
    vv: Option<usize>,
    vh: Option<usize>,
}

impl PolarizationIndexMap {
    pub fn new(vv: Option<usize>, vh: Option<usize>) -> Self {
        Self { vv, vh }
    }

    pub fn get(&self, pol: Polarization) -> Option<usize> {
        match pol {
            Polarization::VV => self.vv,
            Polarization::VH => self.vh,
        }
    }

    fn slot(&mut self, pol: Polarization) -> &mut Option<usize> {
        match pol {
            Polarization::VV => &mut self.vv,
            Polarization::VH => &mut self.vh,
        }
    }

    /// Sets `pol` only if it is still unresolved.
    pub fn set_if_absent(&mut self, pol: Polarization, band: usize) {
        let slot = self.slot(pol);
        if slot.is_none() {
            *slot = Some(band);
        }
    }

    /// Takes every polarization of `other` that is unresolved here.
    pub fn merge_missing(&mut self, other: PolarizationIndexMap) {
        for pol in Polarization::ALL {
            if let Some(band) = other.get(pol) {
                self.set_if_absent(pol, band);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vv.is_none() && self.vh.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.vv.is_some() && self.vh.is_some()
    }

    /// Resolved polarizations whose band index exists in a raster with
    /// `band_count` bands, in VV, VH order.
    pub fn present(&self, band_count: usize) -> Vec<(Polarization, usize)> {
        Polarization::ALL
            .into_iter()
            .filter_map(|pol| self.get(pol).map(|band| (pol, band)))
            .filter(|(_, band)| (1..=band_count).contains(band))
            .collect()
    }
}

/// Read-only view of the band metadata the resolver needs.
pub trait BandSource {
    fn band_count(&self) -> usize;
    /// Description of 1-based `band`, `None` when empty or missing.
    fn description(&self, band: usize) -> Option<String>;
    /// Tag `key` of 1-based `band` in the default metadata domain.
    fn tag(&self, band: usize, key: &str) -> Option<String>;
}

impl BandSource for Dataset {
    fn band_count(&self) -> usize {
        self.raster_count()
    }

    fn description(&self, band: usize) -> Option<String> {
        self.rasterband(band)
            .ok()?
            .description()
            .ok()
            .filter(|d| !d.trim().is_empty())
    }

    fn tag(&self, band: usize, key: &str) -> Option<String> {
        self.rasterband(band)
            .ok()?
            .metadata_item(key, "")
            .filter(|v| !v.trim().is_empty())
    }
}

/// One way of locating VV/VH bands.
pub trait LookupStrategy {
    fn name(&self) -> &'static str;

    /// Whether the strategy runs given what earlier strategies found.
    fn applies(&self, _resolved: &PolarizationIndexMap) -> bool {
        true
    }

    fn lookup(&self, source: &dyn BandSource, file_name: &str) -> PolarizationIndexMap;
}

/// Per-band description strings.
pub struct DescriptionLookup;

impl LookupStrategy for DescriptionLookup {
    fn name(&self) -> &'static str {
        "description"
    }

    fn lookup(&self, source: &dyn BandSource, _file_name: &str) -> PolarizationIndexMap {
        let mut found = PolarizationIndexMap::default();
        for band in 1..=source.band_count() {
            if let Some(pol) = source.description(band).as_deref().and_then(Polarization::from_label) {
                found.set_if_absent(pol, band);
            }
        }
        found
    }
}

/// Per-band tags under [`POLARIZATION_TAG_KEYS`].
pub struct TagLookup;

impl LookupStrategy for TagLookup {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn lookup(&self, source: &dyn BandSource, _file_name: &str) -> PolarizationIndexMap {
        let mut found = PolarizationIndexMap::default();
        for band in 1..=source.band_count() {
            for key in POLARIZATION_TAG_KEYS {
                if let Some(pol) = source.tag(band, key).as_deref().and_then(Polarization::from_label) {
                    found.set_if_absent(pol, band);
                }
            }
        }
        found
    }
}

/// Single-band files whose name mentions the polarization.
///
/// A name containing both tokens claims band 1 for both.
pub struct FileNameLookup;

impl LookupStrategy for FileNameLookup {
    fn name(&self) -> &'static str {
        "filename"
    }

    fn lookup(&self, source: &dyn BandSource, file_name: &str) -> PolarizationIndexMap {
        let mut found = PolarizationIndexMap::default();
        if source.band_count() != 1 {
            return found;
        }
        let upper = file_name.to_uppercase();
        for pol in Polarization::ALL {
            if upper.contains(pol.as_str()) {
                found.set_if_absent(pol, 1);
            }
        }
        found
    }
}

/// Band order `[VV, VH]` of dual-pol stacks, used only when nothing else
/// matched.
pub struct PositionalLookup;

impl LookupStrategy for PositionalLookup {
    fn name(&self) -> &'static str {
        "position"
    }

    fn applies(&self, resolved: &PolarizationIndexMap) -> bool {
        resolved.is_empty()
    }

    fn lookup(&self, source: &dyn BandSource, _file_name: &str) -> PolarizationIndexMap {
        if source.band_count() >= 2 {
            PolarizationIndexMap::new(Some(1), Some(2))
        } else {
            PolarizationIndexMap::default()
        }
    }
}

/// Ordered chain of lookup strategies; the first strategy to resolve a
/// polarization wins.
pub struct BandResolver {
    strategies: Vec<Box<dyn LookupStrategy>>,
}

impl Default for BandResolver {
    fn default() -> Self {
        Self::new(vec![
            Box::new(DescriptionLookup),
            Box::new(TagLookup),
            Box::new(FileNameLookup),
            Box::new(PositionalLookup),
        ])
    }
}

impl BandResolver {
    pub fn new(strategies: Vec<Box<dyn LookupStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn resolve(&self, source: &dyn BandSource, file_name: &str) -> PolarizationIndexMap {
        let mut resolved = PolarizationIndexMap::default();
        for strategy in &self.strategies {
            if resolved.is_complete() {
                break;
            }
            if !strategy.applies(&resolved) {
                continue;
            }
            let found = strategy.lookup(source, file_name);
            if !found.is_empty() {
                log::debug!("{}: {} lookup found {:?}", file_name, strategy.name(), found);
            }
            resolved.merge_missing(found);
        }
        resolved
    }
}
