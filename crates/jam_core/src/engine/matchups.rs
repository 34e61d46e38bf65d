//! Defensive matchup assignment

use crate::models::PlayerId;
use crate::state::{Matchup, MatchState};

/// Greedy nearest pairing: each attacker (by id) takes the closest unassigned
/// defender. Ties go to the lower defender id.
pub fn assign_matchups(state: &MatchState) -> Vec<Matchup> {
    let offense_team = state.possession.team;
    let mut free: Vec<PlayerId> = state.roster_ids(offense_team.opponent());
    let mut matchups = Vec::new();

    for attacker in state.roster(offense_team) {
        let best = free
            .iter()
            .enumerate()
            .filter_map(|(slot, id)| state.player(*id).map(|d| (slot, d.id, d.position.distance(attacker.position))))
            .min_by(|a, b| a.2.total_cmp(&b.2).then(a.1.cmp(&b.1)));
        if let Some((slot, defender, _)) = best {
            free.remove(slot);
            matchups.push(Matchup { offense: attacker.id, defense: defender });
        }
    }
    matchups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::testkit::player;
    use crate::models::TeamSide;

    #[test]
    fn test_nearest_pairing() {
        let players = vec![
            player(0, TeamSide::Home, 10.0, 10.0),
            player(1, TeamSide::Home, 50.0, 30.0),
            player(2, TeamSide::Away, 48.0, 30.0),
            player(3, TeamSide::Away, 12.0, 10.0),
        ];
        let state = MatchState::new(players, &EngineConfig::default());
        let m = assign_matchups(&state);
        assert_eq!(
            m,
            vec![
                Matchup { offense: PlayerId(0), defense: PlayerId(3) },
                Matchup { offense: PlayerId(1), defense: PlayerId(2) },
            ]
        );
    }

    #[test]
    fn test_short_handed_defense() {
        let players = vec![
            player(0, TeamSide::Home, 10.0, 10.0),
            player(1, TeamSide::Home, 50.0, 30.0),
            player(2, TeamSide::Away, 48.0, 30.0),
        ];
        let state = MatchState::new(players, &EngineConfig::default());
        let m = assign_matchups(&state);
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].defense, PlayerId(2));
    }
}
