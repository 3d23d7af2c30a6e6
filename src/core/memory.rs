// src/core/memory.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Máximo número de dimensiones que admite un memory descriptor
pub const MAX_NDIMS: usize = 12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryDescError {
    #[error("Too many dimensions: {0} (max {max})", max = MAX_NDIMS)]
    TooManyDims(usize),

    #[error("Zero extent at dimension {axis} in {dims:?}")]
    ZeroExtent { axis: usize, dims: Vec<usize> },

    #[error("Format {format} expects rank {expected}, got {got}")]
    FormatRank {
        format: MemoryFormat,
        expected: usize,
        got: usize,
    },

    #[error("Unknown {what}: {value}")]
    Unknown { what: &'static str, value: String },
}

/// Tipo de dato de los elementos del tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    #[default]
    Undef,
    F32,
    S32,
    S16,
    S8,
    U8,
}

impl DataType {
    fn name(self) -> &'static str {
        match self {
            DataType::Undef => "undef",
            DataType::F32 => "f32",
            DataType::S32 => "s32",
            DataType::S16 => "s16",
            DataType::S8 => "s8",
            DataType::U8 => "u8",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = MemoryDescError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "undef" => Ok(DataType::Undef),
            "f32" => Ok(DataType::F32),
            "s32" => Ok(DataType::S32),
            "s16" => Ok(DataType::S16),
            "s8" => Ok(DataType::S8),
            "u8" => Ok(DataType::U8),
            other => Err(MemoryDescError::Unknown {
                what: "data type",
                value: other.to_string(),
            }),
        }
    }
}

/// Layout of the tensor in memory. Carried through descriptors as-is.
/// Files and flags share one parser, so names are case-insensitive in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MemoryFormat {
    #[default]
    Undef,
    Any,
    Blocked,
    X,
    Nc,
    Nchw,
    Nhwc,
    Chwn,
    NChw8c,
    NChw16c,
    Oi,
    Oihw,
}

impl TryFrom<String> for MemoryFormat {
    type Error = MemoryDescError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MemoryFormat> for String {
    fn from(f: MemoryFormat) -> Self {
        f.name().to_string()
    }
}

impl MemoryFormat {
    /// Rank implied by the format, if it fixes one.
    pub fn expected_rank(self) -> Option<usize> {
        match self {
            MemoryFormat::Undef | MemoryFormat::Any | MemoryFormat::Blocked => None,
            MemoryFormat::X => Some(1),
            MemoryFormat::Nc | MemoryFormat::Oi => Some(2),
            MemoryFormat::Nchw
            | MemoryFormat::Nhwc
            | MemoryFormat::Chwn
            | MemoryFormat::NChw8c
            | MemoryFormat::NChw16c
            | MemoryFormat::Oihw => Some(4),
        }
    }

    fn name(self) -> &'static str {
        match self {
            MemoryFormat::Undef => "undef",
            MemoryFormat::Any => "any",
            MemoryFormat::Blocked => "blocked",
            MemoryFormat::X => "x",
            MemoryFormat::Nc => "nc",
            MemoryFormat::Nchw => "nchw",
            MemoryFormat::Nhwc => "nhwc",
            MemoryFormat::Chwn => "chwn",
            MemoryFormat::NChw8c => "nChw8c",
            MemoryFormat::NChw16c => "nChw16c",
            MemoryFormat::Oi => "oi",
            MemoryFormat::Oihw => "oihw",
        }
    }
}

impl fmt::Display for MemoryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MemoryFormat {
    type Err = MemoryDescError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Blocked formats keep their casing (nChw8c)
        let all = [
            MemoryFormat::Undef,
            MemoryFormat::Any,
            MemoryFormat::Blocked,
            MemoryFormat::X,
            MemoryFormat::Nc,
            MemoryFormat::Nchw,
            MemoryFormat::Nhwc,
            MemoryFormat::Chwn,
            MemoryFormat::NChw8c,
            MemoryFormat::NChw16c,
            MemoryFormat::Oi,
            MemoryFormat::Oihw,
        ];
        let s = s.trim();
        all.into_iter()
            .find(|f| f.name() == s)
            .or_else(|| all.into_iter().find(|f| f.name().eq_ignore_ascii_case(s)))
            .ok_or_else(|| MemoryDescError::Unknown {
                what: "memory format",
                value: s.to_string(),
            })
    }
}

/// Describe la forma (shape) y el layout de un tensor.
/// []           -> descriptor vacío (zero)
/// [8]          -> vector
/// [2, 3, 4, 4] -> batch nchw
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryDesc {
    pub dims: Vec<usize>,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub format: MemoryFormat,
}

impl MemoryDesc {
    /// Crea un memory descriptor verificando rank y extents
    pub fn new<D: Into<Vec<usize>>>(
        dims: D,
        data_type: DataType,
        format: MemoryFormat,
    ) -> Result<Self, MemoryDescError> {
        let md = Self {
            dims: dims.into(),
            data_type,
            format,
        };
        md.validate()?;
        Ok(md)
    }

    /// Shorthand for an f32 descriptor with no fixed layout.
    pub fn f32<D: Into<Vec<usize>>>(dims: D) -> Result<Self, MemoryDescError> {
        Self::new(dims, DataType::F32, MemoryFormat::Any)
    }

    /// The empty sentinel used where no descriptor applies.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Re-checks the limits enforced by [`MemoryDesc::new`]. Deserialized
    /// descriptors bypass the constructor, so callers loading them run this.
    pub fn validate(&self) -> Result<(), MemoryDescError> {
        if self.dims.len() > MAX_NDIMS {
            return Err(MemoryDescError::TooManyDims(self.dims.len()));
        }
        if let Some(axis) = self.dims.iter().position(|&d| d == 0) {
            return Err(MemoryDescError::ZeroExtent {
                axis,
                dims: self.dims.clone(),
            });
        }
        if let Some(expected) = self.format.expected_rank() {
            if expected != self.rank() {
                return Err(MemoryDescError::FormatRank {
                    format: self.format,
                    expected,
                    got: self.rank(),
                });
            }
        }
        Ok(())
    }

    /// Número de dimensiones (rank)
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Número total de elementos (0 para el descriptor vacío)
    pub fn num_elements(&self) -> usize {
        if self.dims.is_empty() {
            0
        } else {
            self.dims.iter().product()
        }
    }

    /// Same rank and same extent on every axis. Type and format are ignored.
    pub fn same_dims(&self, other: &MemoryDesc) -> bool {
        self.dims == other.dims
    }
}

impl fmt::Display for MemoryDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("zero");
        }
        write!(f, "{:?} {} {}", self.dims, self.data_type, self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sentinel() {
        let md = MemoryDesc::zero();
        assert!(md.is_zero());
        assert_eq!(md.rank(), 0);
        assert_eq!(md.num_elements(), 0);
        assert_eq!(md.to_string(), "zero");
    }

    #[test]
    fn test_new_checks_limits() {
        assert!(MemoryDesc::f32(vec![1; MAX_NDIMS]).is_ok());
        assert_eq!(
            MemoryDesc::f32(vec![1; MAX_NDIMS + 1]),
            Err(MemoryDescError::TooManyDims(MAX_NDIMS + 1))
        );
        assert_eq!(
            MemoryDescError::TooManyDims(13).to_string(),
            "Too many dimensions: 13 (max 12)"
        );
        assert!(matches!(
            MemoryDesc::f32(vec![2, 0, 3]),
            Err(MemoryDescError::ZeroExtent { axis: 1, .. })
        ));
        assert!(matches!(
            MemoryDesc::new(vec![2, 3], DataType::F32, MemoryFormat::Nchw),
            Err(MemoryDescError::FormatRank { expected: 4, got: 2, .. })
        ));
    }

    #[test]
    fn test_sizes() {
        let md = MemoryDesc::new(vec![2, 3, 4, 4], DataType::F32, MemoryFormat::Nchw).unwrap();
        assert_eq!(md.num_elements(), 96);
        assert!(!md.is_zero());
    }

    #[test]
    fn test_same_dims_ignores_layout() {
        let a = MemoryDesc::new(vec![2, 8, 4, 4], DataType::F32, MemoryFormat::Nchw).unwrap();
        let b = MemoryDesc::new(vec![2, 8, 4, 4], DataType::F32, MemoryFormat::NChw8c).unwrap();
        let c = MemoryDesc::new(vec![2, 8, 4, 5], DataType::F32, MemoryFormat::Nchw).unwrap();
        assert!(a.same_dims(&b));
        assert!(!a.same_dims(&c));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("f32".parse::<DataType>().unwrap(), DataType::F32);
        assert_eq!("nChw16c".parse::<MemoryFormat>().unwrap(), MemoryFormat::NChw16c);
        assert_eq!("NCHW".parse::<MemoryFormat>().unwrap(), MemoryFormat::Nchw);
        assert!("f64".parse::<DataType>().is_err());
    }

    #[test]
    fn test_format_names_from_files() {
        let md: MemoryDesc =
            serde_json::from_str(r#"{"dims": [2, 8, 4, 4], "format": "NCHW"}"#).unwrap();
        assert_eq!(md.format, MemoryFormat::Nchw);
        let md: MemoryDesc =
            serde_json::from_str(r#"{"dims": [2, 8, 4, 4], "format": "nChw8c"}"#).unwrap();
        assert_eq!(md.format, MemoryFormat::NChw8c);
        assert!(serde_json::from_str::<MemoryDesc>(r#"{"dims": [2], "format": "zz"}"#).is_err());

        let json = serde_json::to_value(MemoryFormat::NChw16c).unwrap();
        assert_eq!(json, "nChw16c");
    }
}
