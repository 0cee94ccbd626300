//! Error types shared by the measurement core and the control loop

/// Why a measurement cycle produced no usable reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invalid {
    /// The timer saw no ticks across a full signal cycle
    ZeroPeriod,
    /// A duration was negative, NaN or infinite
    NonPositivePeriod,
}

impl Invalid {
    pub fn as_str(&self) -> &'static str {
        match self {
            Invalid::ZeroPeriod => "zero period",
            Invalid::NonPositivePeriod => "non-positive period",
        }
    }
}

/// Failure of a single timing routine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeasureError<E> {
    /// Reading a signal pin failed
    Signal(E),
    Invalid(Invalid),
}

impl<E> From<Invalid> for MeasureError<E> {
    fn from(invalid: Invalid) -> Self {
        MeasureError::Invalid(invalid)
    }
}

/// Failure of one control loop cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleError<S, A> {
    Signal(S),
    Adc(A),
    Invalid(Invalid),
}

impl<S, A> CycleError<S, A> {
    /// Invalid cycles are skipped; anything else points at the hardware.
    pub fn is_invalid(&self) -> bool {
        matches!(self, CycleError::Invalid(_))
    }
}

impl<S, A> From<Invalid> for CycleError<S, A> {
    fn from(invalid: Invalid) -> Self {
        CycleError::Invalid(invalid)
    }
}

impl<S, A> From<MeasureError<S>> for CycleError<S, A> {
    fn from(err: MeasureError<S>) -> Self {
        match err {
            MeasureError::Signal(e) => CycleError::Signal(e),
            MeasureError::Invalid(invalid) => CycleError::Invalid(invalid),
        }
    }
}
