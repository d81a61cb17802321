//! Synchronization & lifting — component E from `SPEC_FULL.md`.
//!
//! Turns a scalar function, expressed as a [`Lift1`]/[`Lift2`]/[`Lift3`]/
//! [`Lift4`] capability object, into a temporal function. `lift2` is the
//! interesting case: it walks two temporal values' instants in merged time
//! order (Phase 1–2), then asks the lift whether a turning point (Phase 3)
//! or crossing (Phase 4) falls strictly between two synchronized instants
//! and splices it in if so.

mod lift;

pub use self::lift::{Lift1, Lift2, Lift3, Lift4, Sample};

use error_stack::ResultExt as _;

use crate::{
    error::Unsupported,
    time::Timestamp,
    value::{Instant, InstantSet, Interpolation, Sequence, SequenceBuilder, SequenceSetBuilder, Temporal},
};

/// Applies a unary scalar function at every sample instant, keeping the
/// input's shape and interpolation.
#[tracing::instrument(level = "trace", skip(op))]
pub fn lift1(op: &dyn Lift1, value: &Temporal) -> Result<Temporal, error_stack::Report<Unsupported>> {
    match value {
        Temporal::Instant(i) => Ok(Temporal::Instant(Instant::new(i.timestamp(), op.apply(i.value())?))),
        Temporal::InstantSet(s) => {
            let instants = s.instants().iter().map(|i| Ok(Instant::new(i.timestamp(), op.apply(i.value())?))).collect::<Result<_, error_stack::Report<Unsupported>>>()?;
            InstantSet::new(instants).change_context(Unsupported).map(Temporal::InstantSet)
        }
        Temporal::Sequence(s) => lift1_sequence(op, s).map(Temporal::Sequence),
        Temporal::SequenceSet(s) => {
            let sequences = s.sequences().iter().map(|seq| lift1_sequence(op, seq)).collect::<Result<Vec<_>, _>>()?;
            let mut builder = SequenceSetBuilder::new();
            for seq in sequences {
                builder = builder.sequence(seq);
            }
            builder.build().change_context(Unsupported).map(Temporal::SequenceSet)
        }
    }
}

fn lift1_sequence(op: &dyn Lift1, s: &Sequence) -> Result<Sequence, error_stack::Report<Unsupported>> {
    let mut builder = SequenceBuilder::new(s.interpolation()).lower_inc(s.lower_inc()).upper_inc(s.upper_inc());
    for i in s.instants() {
        builder = builder.instant(i.timestamp(), op.apply(i.value())?);
    }
    builder.build().change_context(Unsupported)
}

/// Applies a binary scalar function across two temporal values,
/// synchronizing their domains first.
///
/// Returns `Ok(None)` when the two values' time domains don't overlap at
/// all — there is nothing to lift onto.
#[tracing::instrument(level = "trace", skip(op))]
pub fn lift2(op: &dyn Lift2, a: &Temporal, b: &Temporal) -> Result<Option<Temporal>, error_stack::Report<Unsupported>> {
    match (a, b) {
        (Temporal::Instant(a), Temporal::Instant(b)) => {
            if a.timestamp() != b.timestamp() {
                return Ok(None);
            }
            Ok(Some(Temporal::Instant(Instant::new(a.timestamp(), op.apply(a.value(), b.value())?))))
        }
        (Temporal::Instant(i), other) | (other, Temporal::Instant(i)) => {
            let Some(v) = other.value_at_timestamp(i.timestamp()).change_context(Unsupported)? else {
                return Ok(None);
            };
            let result = if matches!(a, Temporal::Instant(_)) { op.apply(i.value(), &v)? } else { op.apply(&v, i.value())? };
            Ok(Some(Temporal::Instant(Instant::new(i.timestamp(), result))))
        }
        (Temporal::InstantSet(s), other @ (Temporal::Sequence(_) | Temporal::SequenceSet(_)))
        | (other @ (Temporal::Sequence(_) | Temporal::SequenceSet(_)), Temporal::InstantSet(s)) => {
            let flip = matches!(b, Temporal::InstantSet(_));
            let instants = s
                .instants()
                .iter()
                .filter_map(|i| {
                    other.value_at_timestamp(i.timestamp()).ok().flatten().map(|v| {
                        let result = if flip { op.apply(&v, i.value()) } else { op.apply(i.value(), &v) };
                        result.map(|r| Instant::new(i.timestamp(), r))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if instants.is_empty() {
                return Ok(None);
            }
            InstantSet::new(instants).change_context(Unsupported).map(Temporal::InstantSet).map(Some)
        }
        (Temporal::InstantSet(a), Temporal::InstantSet(b)) => {
            let instants = a
                .instants()
                .iter()
                .filter_map(|i| b.value_at_timestamp(i.timestamp()).map(|v| (i, v)))
                .map(|(i, v)| Ok(Instant::new(i.timestamp(), op.apply(i.value(), &v)?)))
                .collect::<Result<Vec<_>, error_stack::Report<Unsupported>>>()?;
            if instants.is_empty() {
                return Ok(None);
            }
            InstantSet::new(instants).change_context(Unsupported).map(Temporal::InstantSet).map(Some)
        }
        (Temporal::Sequence(a), Temporal::Sequence(b)) => Ok(Temporal::sequences_to_temporal(lift2_sequences(op, a, b)?)),
        (Temporal::Sequence(seq), Temporal::SequenceSet(set)) | (Temporal::SequenceSet(set), Temporal::Sequence(seq)) => {
            let flip = matches!(a, Temporal::SequenceSet(_));
            let pieces = set
                .sequences()
                .iter()
                .filter(|member| member.period().overlaps(&seq.period()))
                .map(|member| if flip { lift2_sequences(op, member, seq) } else { lift2_sequences(op, seq, member) })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Temporal::sequences_to_temporal(pieces.into_iter().flatten().collect()))
        }
        (Temporal::SequenceSet(a), Temporal::SequenceSet(b)) => {
            let mut pieces = Vec::new();
            for x in a.sequences() {
                for y in b.sequences() {
                    if x.period().overlaps(&y.period()) {
                        pieces.extend(lift2_sequences(op, x, y)?);
                    }
                }
            }
            Ok(Temporal::sequences_to_temporal(pieces))
        }
    }
}

/// The merge-walk at the heart of synchronization: collects the
/// synchronized instants of `a` and `b` over their overlapping period
/// (Phase 1–2), splices in any turning point (Phase 3) or crossing
/// (Phase 4) the lift reports strictly between two consecutive
/// synchronized instants, and evaluates `op` at every resulting timestamp.
/// A crossing always yields more than one piece — see
/// [`split_at_crossings`] — so this returns a `Vec`, empty when the two
/// periods don't overlap at all.
fn lift2_sequences(op: &dyn Lift2, a: &Sequence, b: &Sequence) -> Result<Vec<Sequence>, error_stack::Report<Unsupported>> {
    let Some(overlap) = a.period().intersect(&b.period()) else {
        return Ok(Vec::new());
    };

    let mut marks: Vec<Timestamp> = a
        .instants()
        .iter()
        .map(Instant::timestamp)
        .chain(b.instants().iter().map(Instant::timestamp))
        .filter(|&t| overlap.contains_timestamp(t))
        .collect();
    marks.push(overlap.lower());
    marks.push(overlap.upper());
    marks.sort_unstable();
    marks.dedup();

    // Phase 3/4: ask the lift whether a turning point or crossing falls
    // strictly inside each synchronized gap, and splice it in. Crossings
    // are tracked separately from turning points since they additionally
    // drive how the result gets split afterward.
    let mut extra = Vec::new();
    let mut crossings = Vec::new();
    for pair in marks.windows(2) {
        let (t0, t1) = (pair[0], pair[1]);
        let (Some(a0), Some(a1)) = (a.value_at_timestamp(t0).change_context(Unsupported)?, a.value_at_timestamp(t1).change_context(Unsupported)?) else {
            continue;
        };
        let (Some(b0), Some(b1)) = (b.value_at_timestamp(t0).change_context(Unsupported)?, b.value_at_timestamp(t1).change_context(Unsupported)?) else {
            continue;
        };
        let a_prev = (t0, &a0);
        let a_cur = (t1, &a1);
        let b_prev = (t0, &b0);
        let b_cur = (t1, &b1);
        if let Some(t) = op.turning_point(a_prev, a_cur, b_prev, b_cur) {
            if t > t0 && t < t1 {
                extra.push(t);
            }
        }
        if let Some(t) = op.crossing(a_prev, a_cur, b_prev, b_cur) {
            if t > t0 && t < t1 {
                extra.push(t);
                crossings.push(t);
            }
        }
    }
    marks.extend(extra);
    marks.sort_unstable();
    marks.dedup();
    crossings.sort_unstable();
    crossings.dedup();

    let both_linear = a.interpolation() == Interpolation::Linear && b.interpolation() == Interpolation::Linear;

    let mut result_instants = Vec::with_capacity(marks.len());
    for t in marks {
        let Some(av) = a.value_at_timestamp(t).change_context(Unsupported)? else { continue };
        let Some(bv) = b.value_at_timestamp(t).change_context(Unsupported)? else { continue };
        result_instants.push(Instant::new(t, op.apply(&av, &bv)?));
    }
    if result_instants.is_empty() {
        return Ok(Vec::new());
    }

    if crossings.is_empty() {
        let interpolation = if both_linear && result_instants.iter().all(|i| i.value().base_type().supports_linear()) {
            Interpolation::Linear
        } else if result_instants.len() == 1 {
            Interpolation::Discrete
        } else {
            Interpolation::Stepwise
        };
        let piece = build_piece(&result_instants, interpolation, overlap.lower_inc(), overlap.upper_inc())?;
        return Ok(vec![piece]);
    }

    // Phase 4 only fires for a piecewise-constant (discrete) co-domain, so
    // a crossing-bearing result is always stepwise, never linear.
    split_at_crossings(op, &result_instants, &crossings, overlap.lower_inc(), overlap.upper_inc())
}

fn build_piece(instants: &[Instant], interpolation: Interpolation, lower_inc: bool, upper_inc: bool) -> Result<Sequence, error_stack::Report<Unsupported>> {
    let mut builder = SequenceBuilder::new(interpolation).lower_inc(lower_inc).upper_inc(upper_inc);
    for i in instants {
        builder = builder.instant(i.timestamp(), i.value().clone());
    }
    builder.build().change_context(Unsupported)
}

/// Splits a piecewise-constant synchronized result at each crossing
/// timestamp, per `SPEC_FULL.md` §4.E Phase 4: a strict comparison
/// (`<`/`>`/`≠`) excises the crossing instant into a zero-duration gap
/// between the pre-flip and post-flip pieces, while a non-strict one
/// (`≤`/`≥`/`=`) folds it, inclusively, into whichever neighboring piece's
/// value it actually matches — [`Lift2::crossing_holds_at_equality`]
/// reports which of those two behaviors applies.
fn split_at_crossings(
    op: &dyn Lift2,
    marks: &[Instant],
    crossings: &[Timestamp],
    lower_inc: bool,
    upper_inc: bool,
) -> Result<Vec<Sequence>, error_stack::Report<Unsupported>> {
    let Some(&t_star) = crossings.first() else {
        return Ok(vec![build_piece(marks, Interpolation::Stepwise, lower_inc, upper_inc)?]);
    };
    let rest = &crossings[1..];
    let idx = marks.iter().position(|i| i.timestamp() == t_star).expect("a crossing timestamp is always a synchronized mark");
    let pre_value = marks[idx - 1].value().clone();
    let post_value = marks[idx + 1].value().clone();
    let crossing_value = marks[idx].value().clone();

    let mut pre: Vec<Instant> = marks[..idx].to_vec();
    let mut post: Vec<Instant> = marks[idx + 1..].to_vec();

    let (pre_upper_inc, post_lower_inc) = if op.crossing_holds_at_equality() && crossing_value == pre_value {
        pre.push(Instant::new(t_star, crossing_value));
        post.insert(0, Instant::new(t_star, post_value));
        (true, false)
    } else if op.crossing_holds_at_equality() && crossing_value == post_value {
        pre.push(Instant::new(t_star, pre_value));
        post.insert(0, Instant::new(t_star, crossing_value));
        (false, true)
    } else {
        pre.push(Instant::new(t_star, pre_value));
        post.insert(0, Instant::new(t_star, post_value));
        (false, false)
    };

    let mut pieces = vec![build_piece(&pre, Interpolation::Stepwise, lower_inc, pre_upper_inc)?];
    pieces.extend(split_at_crossings(op, &post, rest, post_lower_inc, upper_inc)?);
    Ok(pieces)
}

/// Applies a ternary scalar function pointwise, at instants all three
/// operands are defined at. Limited to the discrete variants
/// ([`Temporal::Instant`]/[`Temporal::InstantSet`]) — continuous
/// three-operand synchronization is not needed by any operator in
/// `SPEC_FULL.md`'s operator table.
pub fn lift3(op: &dyn Lift3, a: &Temporal, b: &Temporal, c: &Temporal) -> Result<Option<Temporal>, error_stack::Report<Unsupported>> {
    let timestamps = match a {
        Temporal::Instant(i) => vec![i.timestamp()],
        Temporal::InstantSet(s) => s.instants().iter().map(Instant::timestamp).collect(),
        _ => return Err(error_stack::Report::new(Unsupported).attach_printable("lift3 only supports discrete operands")),
    };
    let instants = timestamps
        .into_iter()
        .filter_map(|t| {
            let bv = b.value_at_timestamp(t).ok().flatten()?;
            let cv = c.value_at_timestamp(t).ok().flatten()?;
            let av = a.value_at_timestamp(t).ok().flatten()?;
            Some(op.apply(&av, &bv, &cv).map(|v| Instant::new(t, v)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if instants.is_empty() {
        return Ok(None);
    }
    InstantSet::new(instants).change_context(Unsupported).map(Temporal::InstantSet).map(Some)
}

/// Applies a quaternary scalar function pointwise. See [`lift3`] for the
/// same discrete-only limitation.
pub fn lift4(op: &dyn Lift4, a: &Temporal, b: &Temporal, c: &Temporal, d: &Temporal) -> Result<Option<Temporal>, error_stack::Report<Unsupported>> {
    let timestamps = match a {
        Temporal::Instant(i) => vec![i.timestamp()],
        Temporal::InstantSet(s) => s.instants().iter().map(Instant::timestamp).collect(),
        _ => return Err(error_stack::Report::new(Unsupported).attach_printable("lift4 only supports discrete operands")),
    };
    let instants = timestamps
        .into_iter()
        .filter_map(|t| {
            let av = a.value_at_timestamp(t).ok().flatten()?;
            let bv = b.value_at_timestamp(t).ok().flatten()?;
            let cv = c.value_at_timestamp(t).ok().flatten()?;
            let dv = d.value_at_timestamp(t).ok().flatten()?;
            Some(op.apply(&av, &bv, &cv, &dv).map(|v| Instant::new(t, v)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if instants.is_empty() {
        return Ok(None);
    }
    InstantSet::new(instants).change_context(Unsupported).map(Temporal::InstantSet).map(Some)
}
