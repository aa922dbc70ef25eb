use crate::error::{Error, Result};

/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f32) -> f32;

    /// The smallest and largest values the schedule can take for `t >= 0`, as `(low, high)`
    fn range(&self) -> (f32, f32);
}

// Schedules only ever decay from `vi` towards `vf`, so every value stays within `[vf, vi]`
fn validate(rate: f32, vi: f32, vf: f32) -> Result<()> {
    (rate >= 0.0 && vi > vf)
        .then_some(())
        .ok_or(Error::InvalidDecay("decay requires `rate >= 0` and `vi > vf`"))
}

fn span(vi: f32, vf: f32) -> (f32, f32) {
    (vi.min(vf), vi.max(vf))
}

/// A constant value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Constant {
    value: f32,
}

impl Constant {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Decay for Constant {
    fn evaluate(&self, _t: f32) -> f32 {
        self.value
    }

    fn range(&self) -> (f32, f32) {
        (self.value, self.value)
    }
}

/// v(t) = v<sub>f</sub> + (v<sub>i</sub> - v<sub>f</sub>) * e<sup>-rt</sup>
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Exponential {
    rate: f32,
    vi: f32,
    vf: f32,
}

impl Exponential {
    pub fn new(rate: f32, vi: f32, vf: f32) -> Result<Self> {
        validate(rate, vi, vf)?;
        Ok(Self { rate, vi, vf })
    }
}

impl Decay for Exponential {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { rate, vi, vf } = self;
        vf + (vi - vf) * (-rate * t).exp()
    }

    fn range(&self) -> (f32, f32) {
        span(self.vi, self.vf)
    }
}

/// v(t) = v<sub>f</sub> + (v<sub>i</sub> - v<sub>f</sub>) / (1 + rt)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InverseTime {
    rate: f32,
    vi: f32,
    vf: f32,
}

impl InverseTime {
    pub fn new(rate: f32, vi: f32, vf: f32) -> Result<Self> {
        validate(rate, vi, vf)?;
        Ok(Self { rate, vi, vf })
    }
}

impl Decay for InverseTime {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { rate, vi, vf } = self;
        vf + (vi - vf) / (1.0 + rate * t)
    }

    fn range(&self) -> (f32, f32) {
        span(self.vi, self.vf)
    }
}

/// v(t) = max(v<sub>i</sub> - rt, v<sub>f</sub>)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Linear {
    rate: f32,
    vi: f32,
    vf: f32,
}

impl Linear {
    pub fn new(rate: f32, vi: f32, vf: f32) -> Result<Self> {
        validate(rate, vi, vf)?;
        Ok(Self { rate, vi, vf })
    }
}

impl Decay for Linear {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { rate, vi, vf } = self;
        (vi - rate * t).max(vf)
    }

    fn range(&self) -> (f32, f32) {
        span(self.vi, self.vf)
    }
}

/// v(t) = max(v<sub>i</sub> * r<sup>floor(t/s)</sup>, v<sub>f</sub>)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Step {
    rate: f32,
    vi: f32,
    vf: f32,
    step: f32,
}

impl Step {
    /// **Errors** unless `rate` is in `[0, 1]` and `step > 0`
    pub fn new(rate: f32, vi: f32, vf: f32, step: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(Error::InvalidDecay("step decay requires `rate` in [0, 1]"));
        }
        if step <= 0.0 {
            return Err(Error::InvalidDecay("step decay requires `step > 0`"));
        }
        validate(rate, vi, vf)?;
        Ok(Self { rate, vi, vf, step })
    }
}

impl Decay for Step {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { rate, vi, vf, step } = self;
        (vi * rate.powf((t / step).floor())).max(vf)
    }

    fn range(&self) -> (f32, f32) {
        span(self.vi, self.vf)
    }
}
