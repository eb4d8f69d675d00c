use crate::model::pattern::{Pattern, PatternKind};

/// Whether `candidate` may legally follow `reference`.
///
/// The rocket beats everything, a bomb beats every non-bomb, bombs compare by
/// rank, and any other pairing needs the same kind, run length and card count
/// with a strictly higher primary value.
pub fn can_beat(candidate: &Pattern, reference: &Pattern) -> bool {
    use PatternKind::{Bomb, Invalid, Rocket};

    match (candidate.kind(), reference.kind()) {
        (Invalid, _) | (_, Invalid) => false,
        (_, Rocket) => false,
        (Rocket, _) => true,
        (Bomb, Bomb) => candidate.primary_value() > reference.primary_value(),
        (Bomb, _) => true,
        (_, Bomb) => false,
        (kind, reference_kind) => {
            kind == reference_kind
                && candidate.length() == reference.length()
                && candidate.card_count() == reference.card_count()
                && candidate.primary_value() > reference.primary_value()
        }
    }
}
