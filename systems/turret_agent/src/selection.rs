use path_defence_core::{EnemyHandle, Position};

/// Picks the most advanced live enemy within `range` of `origin`.
///
/// Progress must be strictly greater to replace the current best, so ties
/// keep the candidate encountered first.
#[must_use]
pub fn select_target<'a>(
    origin: Position,
    range: f64,
    candidates: impl IntoIterator<Item = &'a EnemyHandle>,
) -> Option<&'a EnemyHandle> {
    let mut best: Option<(&EnemyHandle, u64)> = None;
    for candidate in candidates {
        if !candidate.is_live() || origin.distance_to(candidate.position()) > range {
            continue;
        }
        let progress = candidate.progress();
        match best {
            Some((_, leading)) if progress <= leading => {}
            _ => best = Some((candidate, progress)),
        }
    }
    best.map(|(enemy, _)| enemy)
}
