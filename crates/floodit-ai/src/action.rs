//! Canonical-byte actions shared by the agents.
//!
//! Action `i` (a Q-table column or a network output) stands for canonical byte
//! `i + 1`. Byte 0 is the upper-left color and is never chosen, even when the
//! settings allow replaying it.

use floodit_engine::GameState;
use rand::{Rng, seq::IndexedRandom as _};

/// Legal canonical bytes an agent may choose, ascending.
pub(crate) fn action_bytes(state: &GameState) -> impl Iterator<Item = u8> + '_ {
    state.playable_bytes().iter().copied().filter(|b| *b > 0)
}

/// A uniformly random legal action byte, `None` when there is none.
pub(crate) fn random_action<R>(state: &GameState, rng: &mut R) -> Option<u8>
where
    R: Rng + ?Sized,
{
    action_bytes(state).collect::<Vec<_>>().choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use floodit_engine::{Color, GameSettings};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn test_byte_zero_is_never_an_action() {
        let settings = GameSettings::new(2, vec![Color::RED, Color::BLUE])
            .unwrap()
            .with_prevent_same_brush(false);
        let state =
            GameState::from_cells(settings, vec![Color::RED, Color::BLUE, Color::RED, Color::RED])
                .unwrap();
        assert_eq!(state.playable_bytes(), &[0, 1]);
        assert_eq!(action_bytes(&state).collect::<Vec<_>>(), vec![1]);
        let mut rng = Pcg64::seed_from_u64(0);
        for _ in 0..10 {
            assert_eq!(random_action(&state, &mut rng), Some(1));
        }
    }

    #[test]
    fn test_finished_board_has_no_action() {
        let settings = GameSettings::new(2, vec![Color::RED, Color::BLUE]).unwrap();
        let state = GameState::from_cells(settings, vec![Color::BLUE; 4]).unwrap();
        assert_eq!(random_action(&state, &mut Pcg64::seed_from_u64(0)), None);
    }
}
