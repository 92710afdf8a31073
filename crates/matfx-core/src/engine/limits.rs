use serde::Serialize;
use std::fmt;

/// The reasons a propagation step can be limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepLimitKind {
    FieldCurvature,
    MomentumLoss,
    MaxDistance,
    MaxDistancePlane,
    Boundary,
    Plane,
}

impl StepLimitKind {
    pub const ALL: [StepLimitKind; 6] = [
        StepLimitKind::FieldCurvature,
        StepLimitKind::MomentumLoss,
        StepLimitKind::MaxDistance,
        StepLimitKind::MaxDistancePlane,
        StepLimitKind::Boundary,
        StepLimitKind::Plane,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            StepLimitKind::FieldCurvature => "field-curvature",
            StepLimitKind::MomentumLoss => "momentum-loss",
            StepLimitKind::MaxDistance => "max-distance",
            StepLimitKind::MaxDistancePlane => "max-distance-plane",
            StepLimitKind::Boundary => "boundary",
            StepLimitKind::Plane => "plane",
        }
    }
}

impl fmt::Display for StepLimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Candidate step lengths for the next propagation step; the tightest one wins.
///
/// Limits are stored as magnitudes; the direction of travel is carried separately
/// by the step sign.
#[derive(Debug, Clone, PartialEq)]
pub struct StepLimits {
    limits: [f64; 6],
    step_sign: f64,
}

impl Default for StepLimits {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl StepLimits {
    pub const UNLIMITED: f64 = f64::MAX;

    pub fn new(step_sign: f64) -> Self {
        Self {
            limits: [Self::UNLIMITED; 6],
            step_sign: if step_sign < 0.0 { -1.0 } else { 1.0 },
        }
    }

    #[inline]
    pub fn get(&self, kind: StepLimitKind) -> f64 {
        self.limits[kind.index()]
    }

    #[inline]
    pub fn set(&mut self, kind: StepLimitKind, value: f64) {
        self.limits[kind.index()] = value.abs();
    }


    /// Tightest limit; ties go to the kind listed first in [`StepLimitKind::ALL`].
    pub fn lowest(&self) -> (StepLimitKind, f64) {
        StepLimitKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .fold((StepLimitKind::FieldCurvature, Self::UNLIMITED), |best, candidate| {
                if candidate.1 < best.1 { candidate } else { best }
            })
    }

    #[inline]
    pub fn lowest_value(&self) -> f64 {
        self.lowest().1
    }

    #[inline]
    pub fn lowest_signed(&self) -> f64 {
        self.step_sign * self.lowest_value()
    }

    #[inline]
    pub fn step_sign(&self) -> f64 {
        self.step_sign
    }

    /// Clears every limit; the step sign is kept.
    pub fn reset(&mut self) {
        self.limits = [Self::UNLIMITED; 6];
    }
}
