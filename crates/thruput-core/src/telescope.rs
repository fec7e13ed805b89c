//! Telescope registry: keyword to collecting area.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::graph::ModeSet;

/// Telescopes the instruments are mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Telescope {
    /// ESO NTT, 3.58m with a 1.16m obstruction.
    Ntt,
    /// ESO VLT, 8.2m with a 1.116m obstruction and no baffle.
    Vlt,
    /// William Herschel Telescope, 4.2m with a 1.2m obstruction.
    Wht,
    /// Gran Telescopio Canarias.
    Gtc,
    /// Thai National Telescope, 2.3m clear aperture.
    Tnt,
}

impl Telescope {
    pub const ALL: [Telescope; 5] = [
        Telescope::Ntt,
        Telescope::Vlt,
        Telescope::Wht,
        Telescope::Gtc,
        Telescope::Tnt,
    ];

    /// Obsmode keyword naming this telescope.
    pub fn keyword(self) -> &'static str {
        match self {
            Telescope::Ntt => "ntt",
            Telescope::Vlt => "vlt",
            Telescope::Wht => "wht",
            Telescope::Gtc => "gtc",
            Telescope::Tnt => "tnt",
        }
    }

    /// Collecting area in cm², corrected for obstructions.
    pub fn area_cm2(self) -> f64 {
        match self {
            Telescope::Ntt => 90_091.45,
            Telescope::Vlt => 518_319.9,
            Telescope::Wht => 127_234.5,
            Telescope::Gtc => 730_000.0,
            Telescope::Tnt => 37_384.9,
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Telescope> {
        Telescope::ALL.into_iter().find(|t| t.keyword() == keyword)
    }

    /// Picks the single telescope named in `modes`.
    pub fn select(modes: &ModeSet, obsmode: &str) -> Result<Telescope, CoreError> {
        let found: Vec<Telescope> = modes
            .iter()
            .filter_map(|m| Telescope::from_keyword(m))
            .collect();
        match found.as_slice() {
            [telescope] => Ok(*telescope),
            [] => Err(CoreError::MissingTelescope {
                obsmode: obsmode.to_string(),
            }),
            _ => Err(CoreError::AmbiguousTelescope {
                found: found.iter().map(|t| t.keyword().to_string()).collect(),
            }),
        }
    }
}

impl fmt::Display for Telescope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
