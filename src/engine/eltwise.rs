// src/engine/eltwise.rs

use serde::Serialize;
use std::fmt;

use crate::core::kinds::{AlgKind, PrimitiveKind, PropKind};
use crate::core::memory::MemoryDesc;
use crate::engine::error::{EltwiseError, InvalidReason};

/// Descriptor of an elementwise primitive (relu, tanh, elu).
///
/// Only produced by the `*_desc_init` functions below, so a value of this
/// type always satisfies:
/// - `diff_data_desc` is the zero descriptor unless `prop_kind` is
///   `BackwardData`;
/// - for `BackwardData`, `diff_data_desc` has the same dims as `data_desc`;
/// - `negative_slope == alpha`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EltwiseDesc {
    primitive_kind: PrimitiveKind,
    prop_kind: PropKind,
    alg_kind: AlgKind,
    data_desc: MemoryDesc,
    diff_data_desc: MemoryDesc,
    alpha: f64,
    beta: f64,
    negative_slope: f64,
}

impl EltwiseDesc {
    pub fn primitive_kind(&self) -> PrimitiveKind {
        self.primitive_kind
    }

    pub fn prop_kind(&self) -> PropKind {
        self.prop_kind
    }

    pub fn alg_kind(&self) -> AlgKind {
        self.alg_kind
    }

    pub fn data_desc(&self) -> &MemoryDesc {
        &self.data_desc
    }

    /// Raw gradient descriptor; the zero descriptor for forward directions.
    pub fn diff_data_desc(&self) -> &MemoryDesc {
        &self.diff_data_desc
    }

    /// Gradient descriptor, only for `BackwardData`.
    pub fn diff_data(&self) -> Option<&MemoryDesc> {
        (self.prop_kind == PropKind::BackwardData).then_some(&self.diff_data_desc)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Same value as `alpha`, named for relu.
    pub fn negative_slope(&self) -> f64 {
        self.negative_slope
    }

    pub fn is_forward(&self) -> bool {
        self.prop_kind.is_forward()
    }
}

impl fmt::Display for EltwiseDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {}", self.primitive_kind, self.prop_kind, self.alg_kind)?;
        writeln!(f, "  data:      {}", self.data_desc)?;
        writeln!(f, "  diff_data: {}", self.diff_data_desc)?;
        write!(
            f,
            "  alpha: {}  beta: {}  negative_slope: {}",
            self.alpha, self.beta, self.negative_slope
        )
    }
}

type Check = fn(&EltwiseDesc) -> Result<(), InvalidReason>;

/// Cross-field checks run against the assembled candidate, in order.
const CONSISTENCY_CHECKS: &[Check] = &[check_diff_rank, check_diff_dims];

fn check_diff_rank(ed: &EltwiseDesc) -> Result<(), InvalidReason> {
    if ed.prop_kind != PropKind::BackwardData {
        return Ok(());
    }
    let (diff, data) = (ed.diff_data_desc.rank(), ed.data_desc.rank());
    if diff != data {
        return Err(InvalidReason::RankMismatch { diff, data });
    }
    Ok(())
}

fn check_diff_dims(ed: &EltwiseDesc) -> Result<(), InvalidReason> {
    if ed.prop_kind != PropKind::BackwardData {
        return Ok(());
    }
    if ed.diff_data_desc.same_dims(&ed.data_desc) {
        return Ok(());
    }
    let mismatch = ed
        .diff_data_desc
        .dims
        .iter()
        .zip(ed.data_desc.dims.iter())
        .enumerate()
        .find(|(_, (diff, data))| diff != data);
    match mismatch {
        Some((axis, (&diff, &data))) => Err(InvalidReason::DimMismatch { axis, diff, data }),
        None => Ok(()),
    }
}

fn invalid(reason: InvalidReason) -> EltwiseError {
    EltwiseError::InvalidArguments(reason)
}

/// A present descriptor must have at least one dim and pass the memory
/// descriptor limits. Rank 0 (including the zero sentinel) counts as absent.
fn present<'a>(
    md: Option<&'a MemoryDesc>,
    which: &'static str,
    missing: InvalidReason,
) -> Result<Option<&'a MemoryDesc>, EltwiseError> {
    match md {
        None => Ok(None),
        Some(md) if md.rank() == 0 => Err(invalid(missing)),
        Some(md) => {
            md.validate()
                .map_err(|error| invalid(InvalidReason::InvalidMemoryDesc { which, error }))?;
            Ok(Some(md))
        }
    }
}

fn eltwise_desc_init(
    prop_kind: PropKind,
    alg_kind: AlgKind,
    data_desc: Option<&MemoryDesc>,
    diff_data_desc: Option<&MemoryDesc>,
    alpha: f64,
    beta: f64,
) -> Result<EltwiseDesc, EltwiseError> {
    let data_desc = present(data_desc, "data", InvalidReason::MissingDataDesc)?
        .ok_or_else(|| invalid(InvalidReason::MissingDataDesc))?;
    if !matches!(
        prop_kind,
        PropKind::ForwardTraining | PropKind::ForwardInference | PropKind::BackwardData
    ) {
        return Err(invalid(InvalidReason::UnsupportedPropKind(prop_kind)));
    }
    if !alg_kind.is_eltwise() {
        return Err(invalid(InvalidReason::UnsupportedAlgKind(alg_kind)));
    }
    let diff_data_desc = present(diff_data_desc, "diff_data", InvalidReason::MissingDiffDataDesc)?;
    let diff_data_desc = match (prop_kind, diff_data_desc) {
        (PropKind::BackwardData, Some(md)) => md.clone(),
        (PropKind::BackwardData, None) => {
            return Err(invalid(InvalidReason::MissingDiffDataDesc))
        }
        (_, Some(_)) => return Err(invalid(InvalidReason::UnexpectedDiffDataDesc(prop_kind))),
        (_, None) => MemoryDesc::zero(),
    };

    let ed = EltwiseDesc {
        primitive_kind: PrimitiveKind::Eltwise,
        prop_kind,
        alg_kind,
        data_desc: data_desc.clone(),
        diff_data_desc,
        alpha,
        beta,
        negative_slope: alpha,
    };

    for check in CONSISTENCY_CHECKS {
        check(&ed).map_err(invalid)?;
    }

    Ok(ed)
}

/// Forward descriptor; `prop_kind` must be `ForwardTraining` or
/// `ForwardInference`.
pub fn eltwise_forward_desc_init(
    prop_kind: PropKind,
    alg_kind: AlgKind,
    data_desc: Option<&MemoryDesc>,
    alpha: f64,
    beta: f64,
) -> Result<EltwiseDesc, EltwiseError> {
    if !prop_kind.is_forward() {
        return Err(invalid(InvalidReason::UnsupportedPropKind(prop_kind)));
    }
    eltwise_desc_init(prop_kind, alg_kind, data_desc, None, alpha, beta)
}

/// Backward-data descriptor. `diff_data_desc` must match `data_desc` dim
/// for dim.
pub fn eltwise_backward_desc_init(
    alg_kind: AlgKind,
    diff_data_desc: Option<&MemoryDesc>,
    data_desc: Option<&MemoryDesc>,
    alpha: f64,
    beta: f64,
) -> Result<EltwiseDesc, EltwiseError> {
    eltwise_desc_init(
        PropKind::BackwardData,
        alg_kind,
        data_desc,
        diff_data_desc,
        alpha,
        beta,
    )
}

pub fn relu_forward_desc_init(
    prop_kind: PropKind,
    data_desc: Option<&MemoryDesc>,
    negative_slope: f64,
) -> Result<EltwiseDesc, EltwiseError> {
    eltwise_forward_desc_init(prop_kind, AlgKind::EltwiseRelu, data_desc, negative_slope, 0.0)
}

pub fn relu_backward_desc_init(
    diff_data_desc: Option<&MemoryDesc>,
    data_desc: Option<&MemoryDesc>,
    negative_slope: f64,
) -> Result<EltwiseDesc, EltwiseError> {
    eltwise_backward_desc_init(
        AlgKind::EltwiseRelu,
        diff_data_desc,
        data_desc,
        negative_slope,
        0.0,
    )
}
