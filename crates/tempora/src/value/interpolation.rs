/// How a temporal value's underlying function behaves between two
/// consecutive instants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Interpolation {
    /// The value is only defined at the instants themselves; nothing can
    /// be said about the time in between. The only interpolation
    /// [`Instant`](super::Instant) and [`InstantSet`](super::InstantSet)
    /// support — but a [`Sequence`](super::Sequence) may carry it too, over
    /// any number of instants, when its source data has no continuous
    /// interpolation defined between samples.
    Discrete,
    /// The value holds at the left instant's value until the next instant,
    /// changing instantaneously — `floor`-style.
    Stepwise,
    /// The value moves linearly between consecutive instants. Only defined
    /// for base types where [`BaseType::supports_linear`](crate::base::BaseType::supports_linear)
    /// is `true`.
    Linear,
}

impl Interpolation {
    #[must_use]
    pub const fn is_continuous(self) -> bool {
        matches!(self, Self::Stepwise | Self::Linear)
    }
}
