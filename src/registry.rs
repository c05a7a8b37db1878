//! Fixed table of the CHIRPS-2.0 products this crate knows how to fetch.

use std::fmt;

use crate::error::{ChirpsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Monthly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Monthly => write!(f, "monthly"),
        }
    }
}

/// A downloadable raster product and where it lives on the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDescriptor {
    pub code: &'static str,
    pub frequency: Frequency,
    pub label: &'static str,
    pub remote_subdir: &'static str,
}

static DATASETS: [DatasetDescriptor; 4] = [
    DatasetDescriptor {
        code: "global_monthly",
        frequency: Frequency::Monthly,
        label: "Global (Monthly)",
        remote_subdir: "global_monthly/tifs",
    },
    DatasetDescriptor {
        code: "africa_monthly",
        frequency: Frequency::Monthly,
        label: "Africa (Monthly)",
        remote_subdir: "africa_monthly/tifs",
    },
    DatasetDescriptor {
        code: "camer-carib_monthly",
        frequency: Frequency::Monthly,
        label: "Caribbean & Central America (Monthly)",
        remote_subdir: "camer-carib_monthly/tifs",
    },
    DatasetDescriptor {
        code: "EAC_monthly",
        frequency: Frequency::Monthly,
        label: "East African Community (Monthly)",
        remote_subdir: "EAC_monthly/tifs",
    },
];

pub fn lookup(code: &str) -> Result<&'static DatasetDescriptor> {
    DATASETS
        .iter()
        .find(|d| d.code == code)
        .ok_or_else(|| ChirpsError::UnknownDataset(code.to_string()))
}

pub fn list_all() -> &'static [DatasetDescriptor] {
    &DATASETS
}

// -- Tests -------------------------------------------------------------------
