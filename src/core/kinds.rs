// src/core/kinds.rs
//
// Kind enumerations shared by every primitive descriptor. They are wider than
// what the eltwise builder accepts, so an unsupported value can be expressed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {what}: {value}")]
pub struct UnknownKind {
    pub what: &'static str,
    pub value: String,
}

macro_rules! named_kind {
    ($ty:ident, $what:literal, { $($variant:ident => $name:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $ty {
            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownKind;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // CLI flags use dashes, config files use underscores
                let key = s.trim().to_ascii_lowercase().replace('-', "_");
                match key.as_str() {
                    $($name $(| $alias)* => Ok($ty::$variant),)+
                    _ => Err(UnknownKind {
                        what: $what,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

/// Tipo de primitiva al que pertenece un descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Undefined,
    Memory,
    Reorder,
    Convolution,
    Eltwise,
    Pooling,
    Lrn,
    BatchNormalization,
    InnerProduct,
}

named_kind!(PrimitiveKind, "primitive kind", {
    Undefined => "undefined",
    Memory => "memory",
    Reorder => "reorder",
    Convolution => "convolution",
    Eltwise => "eltwise",
    Pooling => "pooling",
    Lrn => "lrn",
    BatchNormalization => "batch_normalization",
    InnerProduct => "inner_product",
});

/// Propagation kind (direction) of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropKind {
    Undefined,
    ForwardTraining,
    /// Also accepted as `forward_scoring`.
    #[serde(alias = "forward_scoring")]
    ForwardInference,
    Backward,
    BackwardData,
    BackwardWeights,
    BackwardBias,
}

named_kind!(PropKind, "prop kind", {
    Undefined => "undefined",
    ForwardTraining => "forward_training",
    ForwardInference => "forward_inference" | "forward_scoring",
    Backward => "backward",
    BackwardData => "backward_data",
    BackwardWeights => "backward_weights",
    BackwardBias => "backward_bias",
});

impl PropKind {
    pub fn is_forward(self) -> bool {
        matches!(self, PropKind::ForwardTraining | PropKind::ForwardInference)
    }
}

/// Algoritmo concreto de la primitiva
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgKind {
    Undefined,
    ConvolutionDirect,
    EltwiseRelu,
    EltwiseTanh,
    EltwiseElu,
    PoolingMax,
    PoolingAvg,
    LrnAcrossChannels,
    LrnWithinChannel,
}

named_kind!(AlgKind, "alg kind", {
    Undefined => "undefined",
    ConvolutionDirect => "convolution_direct",
    EltwiseRelu => "eltwise_relu" | "relu",
    EltwiseTanh => "eltwise_tanh" | "tanh",
    EltwiseElu => "eltwise_elu" | "elu",
    PoolingMax => "pooling_max",
    PoolingAvg => "pooling_avg",
    LrnAcrossChannels => "lrn_across_channels",
    LrnWithinChannel => "lrn_within_channel",
});

impl AlgKind {
    pub fn is_eltwise(self) -> bool {
        matches!(
            self,
            AlgKind::EltwiseRelu | AlgKind::EltwiseTanh | AlgKind::EltwiseElu
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prop_kind_parsing() {
        assert_eq!(
            "forward-training".parse::<PropKind>().unwrap(),
            PropKind::ForwardTraining
        );
        assert_eq!(
            "forward_scoring".parse::<PropKind>().unwrap(),
            PropKind::ForwardInference
        );
        assert_eq!(
            "BACKWARD_DATA".parse::<PropKind>().unwrap(),
            PropKind::BackwardData
        );
        let err = "sideways".parse::<PropKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown prop kind: sideways");
    }

    #[test]
    fn test_alg_kind_short_names() {
        assert_eq!("relu".parse::<AlgKind>().unwrap(), AlgKind::EltwiseRelu);
        assert_eq!("eltwise_elu".parse::<AlgKind>().unwrap(), AlgKind::EltwiseElu);
        assert_eq!(AlgKind::EltwiseTanh.to_string(), "eltwise_tanh");
        assert!(!AlgKind::PoolingMax.is_eltwise());
    }

    #[test]
    fn test_serde_names_match_display() {
        let json = serde_json::to_string(&PropKind::BackwardData).unwrap();
        assert_eq!(json, "\"backward_data\"");
        let prop: PropKind = serde_json::from_str("\"forward_scoring\"").unwrap();
        assert_eq!(prop, PropKind::ForwardInference);
        let prim: PrimitiveKind = serde_json::from_str("\"batch_normalization\"").unwrap();
        assert_eq!(prim, PrimitiveKind::BatchNormalization);
    }

    #[test]
    fn test_direction_predicates() {
        assert!(PropKind::ForwardInference.is_forward());
        assert!(!PropKind::BackwardData.is_forward());
        assert!(!PropKind::BackwardWeights.is_forward());
        assert!(!PropKind::Undefined.is_forward());
    }
}
