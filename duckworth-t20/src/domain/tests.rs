use super::*;

fn defended() -> MatchOutcome {
    MatchOutcome {
        home_team_id: TeamId(1),
        away_team_id: TeamId(2),
        toss_winner: Side::Away,
        bat_first: Side::Home,
        home_score: 182,
        home_wickets: 6,
        away_score: 170,
        away_wickets: 9,
        first_innings_score: 182,
        first_innings_wickets: 6,
        second_innings_score: 170,
        second_innings_wickets: 9,
        winner: Side::Home,
        winner_team_id: TeamId(1),
        result_type: ResultType::Runs,
        margin: 12,
    }
}

fn chased() -> MatchOutcome {
    MatchOutcome {
        home_team_id: TeamId(1),
        away_team_id: TeamId(2),
        toss_winner: Side::Home,
        bat_first: Side::Home,
        home_score: 150,
        home_wickets: 8,
        away_score: 154,
        away_wickets: 4,
        first_innings_score: 150,
        first_innings_wickets: 8,
        second_innings_score: 154,
        second_innings_wickets: 4,
        winner: Side::Away,
        winner_team_id: TeamId(2),
        result_type: ResultType::Wickets,
        margin: 6,
    }
}

#[test]
fn role_mapping_is_total() {
    assert_eq!(Role::Batsman, Role::from("Batter"));
    assert_eq!(Role::WicketKeeper, Role::from("wicket_keeper"));
    assert_eq!(Role::WicketKeeper, Role::from("WK"));
    assert_eq!(Role::AllRounder, Role::from("all-rounder"));
    assert_eq!(Role::Bowler, Role::from("Leg Spinner"));
    assert_eq!(Role::Bowler, Role::from("fast_bowler"));
    assert_eq!(Role::Unspecified, Role::from("twelfth man"));
    assert_eq!(Role::Unspecified, Role::from(""));
}

#[test]
fn role_deserialises_from_any_spelling() {
    let player: Player =
        serde_json::from_str(r#"{"id": 7, "name": "A Keeper", "role": "Wicket-Keeper"}"#).unwrap();
    assert_eq!(Role::WicketKeeper, player.role);
    assert_eq!(None, player.team_id);
    let player: Player = serde_json::from_str(r#"{"id": 8, "name": "No Role"}"#).unwrap();
    assert_eq!(Role::Unspecified, player.role);
}

#[test]
fn pitch_type_mapping() {
    assert_eq!(PitchType::BattingFriendly, PitchType::from("Flat, hard surface"));
    assert_eq!(PitchType::BowlingFriendly, PitchType::from("green top"));
    assert_eq!(PitchType::Neutral, PitchType::from("balanced"));
    assert_eq!(PitchType::Neutral, PitchType::default());
}

#[test]
fn toss_record_rates() {
    let record = TossRecord {
        bat_first_wins: 3,
        bat_first_total: 4,
        chase_wins: 1,
        chase_total: 0,
    };
    assert_eq!(4, record.sample_size());
    assert_eq!(0.75, record.bat_first_win_rate());
    assert_eq!(0.5, record.chase_win_rate());
}

#[test]
fn head_to_head_defaults_to_even() {
    assert_eq!(0.5, HeadToHead::default().home_win_pct());
    let h2h = HeadToHead {
        total_matches: 4,
        home_wins: 3,
        away_wins: 1,
    };
    assert_eq!(0.75, h2h.home_win_pct());
}

#[test]
fn career_stats_per_match() {
    let career = CareerStats {
        matches_played: 10,
        runs_scored: 250,
        wickets_taken: 5,
        ..CareerStats::default()
    };
    assert_eq!(25., career.runs_per_match());
    assert_eq!(0.5, career.wickets_per_match());
    assert_eq!(0., CareerStats::default().runs_per_match());
}

#[test]
fn validate_defended() {
    let outcome = defended();
    outcome.validate().unwrap();
    assert_eq!(183, outcome.target());
    assert_eq!(TeamId(2), outcome.loser_team_id());
    assert_eq!("Home XI won by 12 runs", outcome.describe("Home XI"));
}

#[test]
fn validate_chased() {
    let outcome = chased();
    outcome.validate().unwrap();
    assert_eq!("Away XI won by 6 wickets", outcome.describe("Away XI"));
}

#[test]
fn validate_rejects_all_out_chase() {
    let mut outcome = chased();
    outcome.away_wickets = 10;
    outcome.second_innings_wickets = 10;
    assert_eq!(Err(InvalidOutcome::AllOutChaseWin), outcome.validate());
}

#[test]
fn validate_rejects_short_chase() {
    let mut outcome = chased();
    outcome.away_score = 150;
    outcome.second_innings_score = 150;
    assert_eq!(
        Err(InvalidOutcome::ShortChase {
            target: 151,
            score: 150
        }),
        outcome.validate()
    );
}

#[test]
fn validate_rejects_wrong_margin() {
    let mut outcome = defended();
    outcome.margin = 11;
    assert_eq!(
        Err(InvalidOutcome::MarginMismatch {
            expected: 12,
            actual: 11
        }),
        outcome.validate()
    );
}

#[test]
fn validate_rejects_wrong_winner_id() {
    let mut outcome = defended();
    outcome.winner_team_id = TeamId(2);
    assert!(matches!(
        outcome.validate(),
        Err(InvalidOutcome::WinnerMismatch { .. })
    ));
}

#[test]
fn validate_rejects_wrong_result_type() {
    let mut outcome = defended();
    outcome.result_type = ResultType::Wickets;
    assert!(matches!(
        outcome.validate(),
        Err(InvalidOutcome::ResultTypeMismatch { .. })
    ));
}

#[test]
fn validate_rejects_swapped_innings() {
    let mut outcome = defended();
    outcome.bat_first = Side::Away;
    assert_eq!(Err(InvalidOutcome::InningsMismatch), outcome.validate());
}

#[test]
fn id_display() {
    assert_eq!("T4", TeamId(4).to_string());
    assert_eq!("P12", PlayerId(12).to_string());
}
