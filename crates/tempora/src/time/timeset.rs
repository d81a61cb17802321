use crate::{
    error::{InvalidInput, Result},
    time::Timestamp,
};

/// A strictly increasing, duplicate-free sequence of timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSet(Vec<Timestamp>);

impl TimeSet {
    /// Builds a `TimeSet` from an unsorted, possibly-duplicated slice.
    #[must_use]
    pub fn from_unsorted(mut timestamps: Vec<Timestamp>) -> Self {
        timestamps.sort_unstable();
        timestamps.dedup();
        Self(timestamps)
    }

    /// Builds a `TimeSet` from an already strictly increasing slice,
    /// rejecting it otherwise.
    pub fn new(timestamps: Vec<Timestamp>) -> Result<Self, InvalidInput> {
        if !timestamps.windows(2).all(|w| w[0] < w[1]) {
            return Err(error_stack::Report::new(InvalidInput)
                .attach_printable("timestamps must be strictly increasing with no duplicates"));
        }
        Ok(Self(timestamps))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Timestamp] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, t: Timestamp) -> bool {
        self.0.binary_search(&t).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsorted_input() {
        let ts = vec![Timestamp::from_micros(5), Timestamp::from_micros(1)];
        assert!(TimeSet::new(ts).is_err());
    }

    #[test]
    fn from_unsorted_dedups() {
        let ts = vec![Timestamp::from_micros(5), Timestamp::from_micros(1), Timestamp::from_micros(5)];
        let set = TimeSet::from_unsorted(ts);
        assert_eq!(set.len(), 2);
    }
}
