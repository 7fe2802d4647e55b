//! The static filter catalog.
//!
//! Every filter the app can apply is declared here as a [`FilterDefinition`]:
//! a stable display name, the [`FilterKind`] the backend instantiates, and
//! the ordered parameter schema ([`ParameterSpec`]) with the numeric range
//! each slider is allowed to cover. The catalog is `'static` data — nothing
//! here mutates at runtime.
//!
//! The last entry is the sentinel "no filter" definition: empty parameter
//! list, pass-through semantics. [`resolve`] routes unknown names to it, so
//! callers never have to handle a lookup miss.

use serde::Serialize;

/// Backend binding key for a filter parameter.
///
/// Filters accept a subset of these; binding a key a filter does not accept
/// is a silent no-op (best-effort binding, see [`crate::session`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKey {
    Intensity,
    Radius,
    Scale,
}

impl ParamKey {
    /// The parameter name as shown to users and accepted by
    /// [`crate::session::EditSession::set_parameter`].
    pub fn name(self) -> &'static str {
        match self {
            ParamKey::Intensity => "intensity",
            ParamKey::Radius => "radius",
            ParamKey::Scale => "scale",
        }
    }
}

/// Schema for one numeric filter parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSpec {
    /// User-facing parameter name (`"intensity"`, `"radius"`, `"scale"`).
    pub name: &'static str,
    /// Key used to bind the value into the processing backend.
    pub key: ParamKey,
    /// Inclusive lower bound. Always strictly below `hi`.
    pub lo: f64,
    /// Inclusive upper bound.
    pub hi: f64,
}

impl ParameterSpec {
    const fn new(key: ParamKey, lo: f64, hi: f64) -> Self {
        let name = match key {
            ParamKey::Intensity => "intensity",
            ParamKey::Radius => "radius",
            ParamKey::Scale => "scale",
        };
        Self { name, key, lo, hi }
    }

    /// Default slider position: the midpoint of the range.
    pub fn midpoint(&self) -> f64 {
        self.lo + (self.hi - self.lo) / 2.0
    }

    /// Clamp a candidate value into the declared range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lo, self.hi)
    }
}

/// The filter algorithms a backend knows how to instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterKind {
    Crystallize,
    Edges,
    GaussianBlur,
    Pixellate,
    SepiaTone,
    UnsharpMask,
    Vignette,
}

/// One catalog entry: name, backend kind, parameter schema.
///
/// `kind` is `None` only for the sentinel pass-through definition.
#[derive(Debug, Serialize)]
pub struct FilterDefinition {
    pub name: &'static str,
    pub kind: Option<FilterKind>,
    pub params: &'static [ParameterSpec],
}

impl FilterDefinition {
    /// True for the sentinel "no filter" definition.
    pub fn is_passthrough(&self) -> bool {
        self.kind.is_none()
    }
}

impl PartialEq for FilterDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

const INTENSITY_0_1: ParameterSpec = ParameterSpec::new(ParamKey::Intensity, 0.0, 1.0);
const INTENSITY_0_2: ParameterSpec = ParameterSpec::new(ParamKey::Intensity, 0.0, 2.0);
const RADIUS_1_200: ParameterSpec = ParameterSpec::new(ParamKey::Radius, 1.0, 200.0);
const SCALE_1_10: ParameterSpec = ParameterSpec::new(ParamKey::Scale, 1.0, 10.0);

/// Declaration order is the user-visible order; the sentinel is last.
static DEFINITIONS: [FilterDefinition; 8] = [
    FilterDefinition {
        name: "Crystallize",
        kind: Some(FilterKind::Crystallize),
        params: &[RADIUS_1_200],
    },
    FilterDefinition {
        name: "Edges",
        kind: Some(FilterKind::Edges),
        params: &[INTENSITY_0_1],
    },
    FilterDefinition {
        name: "Gaussian Blur",
        kind: Some(FilterKind::GaussianBlur),
        params: &[RADIUS_1_200],
    },
    FilterDefinition {
        name: "Pixellate",
        kind: Some(FilterKind::Pixellate),
        params: &[SCALE_1_10],
    },
    FilterDefinition {
        name: "Sepia Tone",
        kind: Some(FilterKind::SepiaTone),
        params: &[INTENSITY_0_1],
    },
    FilterDefinition {
        name: "Unsharp Mask",
        kind: Some(FilterKind::UnsharpMask),
        params: &[INTENSITY_0_1, RADIUS_1_200],
    },
    FilterDefinition {
        name: "Vignette",
        kind: Some(FilterKind::Vignette),
        params: &[INTENSITY_0_2, RADIUS_1_200],
    },
    FilterDefinition {
        name: "None",
        kind: None,
        params: &[],
    },
];

/// The sentinel "no filter" definition.
pub fn none() -> &'static FilterDefinition {
    &DEFINITIONS[DEFINITIONS.len() - 1]
}

/// Every catalog entry in stable declaration order (sentinel last).
pub fn all() -> &'static [FilterDefinition] {
    &DEFINITIONS
}

/// The first `n` entries — used to surface a short default strip before
/// the full picker.
pub fn top_n(n: usize) -> &'static [FilterDefinition] {
    &DEFINITIONS[..n.min(DEFINITIONS.len())]
}

/// Number of catalog entries, sentinel included.
pub fn len() -> usize {
    DEFINITIONS.len()
}

/// Find a definition by its exact name.
pub fn lookup(name: &str) -> Option<&'static FilterDefinition> {
    DEFINITIONS.iter().find(|d| d.name == name)
}

/// Like [`lookup`], but a miss routes to the sentinel.
pub fn resolve(name: &str) -> &'static FilterDefinition {
    lookup(name).unwrap_or_else(none)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_is_stable() {
        let names: Vec<&str> = all().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            [
                "Crystallize",
                "Edges",
                "Gaussian Blur",
                "Pixellate",
                "Sepia Tone",
                "Unsharp Mask",
                "Vignette",
                "None",
            ]
        );
    }

    #[test]
    fn sentinel_is_last_and_empty() {
        let sentinel = none();
        assert!(sentinel.is_passthrough());
        assert!(sentinel.params.is_empty());
        assert_eq!(all().last().unwrap(), sentinel);
    }

    #[test]
    fn top_n_returns_prefix() {
        let strip: Vec<&str> = top_n(5).iter().map(|d| d.name).collect();
        assert_eq!(
            strip,
            ["Crystallize", "Edges", "Gaussian Blur", "Pixellate", "Sepia Tone"]
        );
        assert_eq!(top_n(100).len(), len());
    }

    #[test]
    fn lookup_miss_resolves_to_sentinel() {
        assert!(lookup("Posterize").is_none());
        assert!(resolve("Posterize").is_passthrough());
        assert_eq!(resolve("Sepia Tone").name, "Sepia Tone");
    }

    #[test]
    fn all_ranges_are_well_formed() {
        for def in all() {
            for spec in def.params {
                assert!(spec.lo < spec.hi, "{}/{}", def.name, spec.name);
            }
        }
    }

    #[test]
    fn midpoints_match_slider_defaults() {
        // Vignette: intensity 0–2 → 1.0, radius 1–200 → 100.5
        let vignette = lookup("Vignette").unwrap();
        assert_eq!(vignette.params[0].midpoint(), 1.0);
        assert_eq!(vignette.params[1].midpoint(), 100.5);

        let sepia = lookup("Sepia Tone").unwrap();
        assert_eq!(sepia.params[0].midpoint(), 0.5);
    }

    #[test]
    fn clamp_respects_bounds() {
        assert_eq!(RADIUS_1_200.clamp(0.0), 1.0);
        assert_eq!(RADIUS_1_200.clamp(500.0), 200.0);
        assert_eq!(RADIUS_1_200.clamp(42.0), 42.0);
    }
}
