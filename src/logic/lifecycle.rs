//! Stage gating: which organizer actions are valid in which stage, and where they lead.

use crate::error::{Result, TournamentError};
use crate::models::{Stage, Tournament, TournamentId};
use crate::store::Database;

/// Everything that is gated by the tournament's stage.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// Register or withdraw a player. Existing groups and bracket are kept until regenerated.
    ChangeRoster,
    GenerateGroups,
    GenerateKnockout,
    ScoreGroupMatch,
    ScoreBracketMatch,
    /// Seed the bracket from group standings.
    Promote,
    Finish,
}

/// Stage the tournament ends up in after `action`, or `InvalidStage` if the action is not allowed.
pub fn transition(stage: Stage, action: Action) -> Result<Stage> {
    use Action::*;
    use Stage::*;
    let next = match (stage, action) {
        (Registration | Groups | Knockout, ChangeRoster) => stage,
        (Registration | Groups | Knockout, GenerateGroups) => Groups,
        (_, GenerateKnockout) => Knockout,
        (Groups, ScoreGroupMatch) => Groups,
        (Knockout, ScoreBracketMatch) => Knockout,
        (Groups, Promote) => Knockout,
        (Knockout, Finish) => Done,
        _ => return Err(TournamentError::InvalidStage { stage }),
    };
    Ok(next)
}

/// Check `action` against the tournament's current stage without moving it.
pub fn ensure_allowed(tournament: &Tournament, action: Action) -> Result<()> {
    transition(tournament.stage, action).map(|_| ())
}

/// Close the tournament. Requires the knockout final to have a winner.
pub fn finish_tournament(db: &mut Database, tournament_id: TournamentId) -> Result<()> {
    let next = transition(db.tournament(tournament_id)?.stage, Action::Finish)?;
    let decided = db
        .bracket_of(tournament_id)
        .last()
        .is_some_and(|final_match| final_match.winner.is_some());
    if !decided {
        return Err(TournamentError::Validation(
            "The final has no winner yet".into(),
        ));
    }
    db.tournament_mut(tournament_id)?.stage = next;
    Ok(())
}
