use std::sync::Mutex;

use assert_float_eq::*;

use duckworth::csv::CsvReader;
use duckworth::random::seeded;

use super::*;
use crate::data::League;
use crate::domain::{Projection, Role, Side};
use crate::error::ProjectionError;
use crate::features::{Feature, FeatureVector};
use crate::lineup::XI;
use crate::model::{ConstantModel, LogisticModel, ModelArtifact, Prediction};
use crate::store::{PlayerProjectionProvider, SnapshotTeamFeatureStore};
use crate::testing::{league, league_data, player_id, SQUAD_SIZE};

fn config() -> Config {
    Config {
        num_simulations: 20,
        workers: Some(2),
        seed: Some(7),
        ..Config::default()
    }
}

fn engine<'a>(league: &'a League, model: &'a dyn WinProbabilityModel) -> Engine<'a> {
    Engine::builder(config(), Sources::from_league(league))
        .with_model(model)
        .build()
        .unwrap()
}

fn season_request(league: &League, num_simulations: usize) -> SeasonRequest {
    SeasonRequest {
        fixtures: league.fixtures().to_vec(),
        num_simulations,
        ..SeasonRequest::default()
    }
}

#[test]
fn builder_requires_model() {
    let league = league(4);
    let result = Engine::builder(config(), Sources::from_league(&league)).build();
    assert!(matches!(result, Err(ConfigError::MissingModel)));
}

#[test]
fn builder_validates_config() {
    let league = league(4);
    let model = ConstantModel::new(0.5);
    let config = Config {
        competition: String::new(),
        ..config()
    };
    let result = Engine::builder(config, Sources::from_league(&league))
        .with_model(&model)
        .build();
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

struct SchemaModel(Vec<Feature>);
impl WinProbabilityModel for SchemaModel {
    fn feature_schema(&self) -> &[Feature] {
        &self.0
    }

    fn predict(&self, _: &FeatureVector) -> Prediction {
        Prediction::from_home_probability(0.5, vec![])
    }
}

#[test]
fn builder_validates_schema() {
    let league = league(4);
    let build = |model: &SchemaModel| {
        Engine::builder(config(), Sources::from_league(&league))
            .with_model(model)
            .build()
            .map(|_| ())
    };
    assert!(matches!(build(&SchemaModel(vec![])), Err(ConfigError::EmptySchema)));
    assert!(matches!(
        build(&SchemaModel(vec![Feature::TeamWinPct, Feature::TeamWinPct])),
        Err(ConfigError::DuplicateFeature(Feature::TeamWinPct))
    ));

    let model = LogisticModel::try_from(ModelArtifact {
        feature_names: vec![Feature::TeamWinPct.to_string()],
        intercept: 0.,
        coefficients: vec![1.],
        importances: None,
    })
    .unwrap();
    let engine = Engine::builder(config(), Sources::from_league(&league))
        .with_model(&model)
        .build()
        .unwrap();
    assert_eq!("sa20", engine.config().competition);
}

#[test]
fn predict_rejects_bad_requests() {
    let league = league(4);
    let model = ConstantModel::new(0.5);
    let engine = engine(&league, &model);
    let mut rand = seeded(1);

    let result = engine.predict_match(&MatchRequest::new(TeamId(1), TeamId(1), VenueId(1)), &mut rand);
    assert!(matches!(result, Err(PredictError::SameTeam(TeamId(1)))));

    let result = engine.predict_match(&MatchRequest::new(TeamId(1), TeamId(9), VenueId(1)), &mut rand);
    assert!(matches!(result, Err(PredictError::UnknownTeam(TeamId(9)))));

    let result = engine.predict_match(&MatchRequest::new(TeamId(1), TeamId(2), VenueId(9)), &mut rand);
    assert!(matches!(result, Err(PredictError::UnknownVenue(VenueId(9)))));
}

#[test]
fn predict_match() {
    let league = league(4);
    let model = ConstantModel::new(0.7);
    let engine = engine(&league, &model);
    let prediction = engine
        .predict_match(&MatchRequest::new(TeamId(1), TeamId(2), VenueId(1)), &mut seeded(3))
        .unwrap();

    assert_eq!("Team 1", prediction.home_team_name);
    assert_eq!("Team 2", prediction.away_team_name);
    assert_eq!("Kingsmead", prediction.venue_name);
    assert_float_absolute_eq!(0.7, prediction.home_win_probability, 1e-9);
    assert_float_absolute_eq!(0.3, prediction.away_win_probability, 1e-9);
    assert_float_absolute_eq!(0.7, prediction.confidence, 1e-9);

    let outcome = &prediction.outcome;
    outcome.validate().unwrap();
    assert_eq!(TeamId(1), outcome.home_team_id);
    assert_eq!(TeamId(2), outcome.away_team_id);
    assert!(prediction.summary.starts_with("Team 1") || prediction.summary.starts_with("Team 2"));

    for xi in [&prediction.home_xi, &prediction.away_xi] {
        assert_eq!(XI, xi.len());
        assert_eq!(1, xi.iter().filter(|player| player.role == Role::WicketKeeper).count());
    }
    let motm = prediction.man_of_the_match.unwrap();
    let best_impact = prediction
        .home_xi
        .iter()
        .chain(&prediction.away_xi)
        .map(Selection::impact)
        .fold(f64::MIN, f64::max);
    assert_eq!(best_impact, motm.impact());
}

#[test]
fn certain_home_win() {
    let league = league(4);
    let model = ConstantModel::new(1.);
    let engine = engine(&league, &model);
    let mut rand = seeded(11);
    for _ in 0..30 {
        let prediction = engine
            .predict_match(&MatchRequest::new(TeamId(3), TeamId(4), VenueId(2)), &mut rand)
            .unwrap();
        assert_eq!(Side::Home, prediction.outcome.winner);
        assert_eq!(TeamId(3), prediction.outcome.winner_team_id);
    }
}

#[test]
fn given_lineup_in_batting_order() {
    let league = league(4);
    let model = ConstantModel::new(0.5);
    let engine = engine(&league, &model);
    let home_lineup = vec![player_id(1, 12), player_id(1, 1), player_id(1, 0), PlayerId(9_999)];
    let request = MatchRequest::new(TeamId(1), TeamId(2), VenueId(2))
        .with_lineups(Some(home_lineup), None)
        .with_venue_avg_override(Some(190.));
    let prediction = engine.predict_match(&request, &mut seeded(5)).unwrap();

    assert_eq!(3, prediction.home_xi.len());
    assert_eq!(Role::Bowler, prediction.home_xi[2].role);
    assert_eq!(XI, prediction.away_xi.len());
    prediction.outcome.validate().unwrap();
}

/// Remembers the last feature vector it was asked to price.
#[derive(Default)]
struct RecordingModel {
    schema: Vec<Feature>,
    last: Mutex<Option<FeatureVector>>,
}
impl WinProbabilityModel for RecordingModel {
    fn feature_schema(&self) -> &[Feature] {
        &self.schema
    }

    fn predict(&self, features: &FeatureVector) -> Prediction {
        *self.last.lock().unwrap() = Some(features.clone());
        Prediction::from_home_probability(0.5, vec![])
    }
}

#[test]
fn given_lineup_capped_at_eleven() {
    let league = league(4);
    let model = RecordingModel {
        schema: vec![Feature::HomeLineupOverride],
        ..RecordingModel::default()
    };
    let engine = engine(&league, &model);
    let home_lineup = (0..SQUAD_SIZE).map(|index| player_id(1, index)).collect::<Vec<_>>();
    assert_eq!(13, home_lineup.len());
    let request = MatchRequest::new(TeamId(1), TeamId(2), VenueId(1)).with_lineups(Some(home_lineup), None);
    let prediction = engine.predict_match(&request, &mut seeded(8)).unwrap();

    assert_eq!(XI, prediction.home_xi.len());
    assert!(prediction
        .home_xi
        .iter()
        .all(|player| player.player_id != player_id(1, 11) && player.player_id != player_id(1, 12)));
    let features = model.last.lock().unwrap().clone().unwrap();
    assert_eq!(XI as f64, features[Feature::HomeLineupOverride]);
    assert_eq!(0., features[Feature::AwayLineupOverride]);
}

#[test]
fn features_follow_configured_competition() {
    let league = league(4);
    let snapshot = SnapshotTeamFeatureStore::read(CsvReader::from_reader(
        "competition,team_name,win_percentage\nsa20,Team 1,0.6\nilt20,Team 1,0.2\n".as_bytes(),
    ))
    .unwrap();
    let model = RecordingModel {
        schema: vec![Feature::TeamWinPct],
        ..RecordingModel::default()
    };
    let request = MatchRequest::new(TeamId(1), TeamId(2), VenueId(1));
    for (competition, win_pct) in [("sa20", 0.6), ("ilt20", 0.2), ("bbl", 0.)] {
        let config = Config {
            competition: competition.into(),
            ..config()
        };
        let sources = Sources::from_league(&league).with_team_features(&snapshot);
        let engine = Engine::builder(config, sources)
            .with_model(&model)
            .build()
            .unwrap();
        engine.predict_match(&request, &mut seeded(6)).unwrap();
        let features = model.last.lock().unwrap().clone().unwrap();
        assert_eq!(win_pct, features[Feature::TeamWinPct], "{competition}");
    }
}

struct UnavailableProjections;
impl PlayerProjectionProvider for UnavailableProjections {
    fn predict(&self, player_id: PlayerId) -> Result<Option<Projection>, ProjectionError> {
        Err(ProjectionError {
            player_id,
            reason: "service down".into(),
        })
    }
}

#[test]
fn failed_projections_default_to_zero() {
    let league = league(4);
    let model = ConstantModel::new(0.5);
    let sources = Sources::from_league(&league).with_projections(&UnavailableProjections);
    let engine = Engine::builder(config(), sources)
        .with_model(&model)
        .build()
        .unwrap();

    let prediction = engine
        .predict_match(&MatchRequest::new(TeamId(1), TeamId(2), VenueId(1)), &mut seeded(4))
        .unwrap();
    prediction.outcome.validate().unwrap();
    for xi in [&prediction.home_xi, &prediction.away_xi] {
        assert_eq!(XI, xi.len());
        assert!(xi
            .iter()
            .all(|player| player.predicted_runs == 0. && player.predicted_wickets == 0.));
    }

    let forecast = engine
        .simulate_season(&season_request(&league, 5), &CancellationToken::default())
        .unwrap();
    assert_eq!(4, forecast.predicted_standings.len());
    let orange_cap = forecast.awards.orange_cap.unwrap();
    assert_eq!(0., orange_cap.average);
}

#[test]
fn season_forecast() {
    let league = league(6);
    let model = ConstantModel::new(0.55);
    let engine = engine(&league, &model);
    let forecast = engine
        .simulate_season(&season_request(&league, 40), &CancellationToken::default())
        .unwrap();

    assert_eq!(40, forecast.num_simulations);
    assert_eq!(6, forecast.predicted_standings.len());
    assert!(forecast
        .predicted_standings
        .windows(2)
        .all(|pair| pair[0].mean_points >= pair[1].mean_points));
    let total: f64 = forecast.championship_probabilities.values().sum();
    assert_float_absolute_eq!(100., total, 1e-9);
    let total: f64 = forecast.playoff_probabilities.values().sum();
    assert_float_absolute_eq!(400., total, 1e-9);
    assert!(forecast.champion.is_some());
    assert!(forecast.awards.orange_cap.is_some());
    assert!(forecast.awards.purple_cap.is_some());
    assert_eq!(XI, forecast.awards.team_of_tournament.len());
}

/// Non-finite floats serialise as `null`, so a forecast in which every field is populated must
/// contain neither.
fn assert_no_nulls(value: &serde_json::Value, path: &str) {
    match value {
        serde_json::Value::Null => panic!("null at {path}"),
        serde_json::Value::Number(number) => {
            if let Some(number) = number.as_f64() {
                assert!(number.is_finite(), "{number} at {path}");
            }
        }
        serde_json::Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                assert_no_nulls(item, &format!("{path}[{index}]"));
            }
        }
        serde_json::Value::Object(fields) => {
            for (key, field) in fields {
                assert_no_nulls(field, &format!("{path}.{key}"));
            }
        }
        _ => {}
    }
}

#[test]
fn cold_start_forecast_is_finite() {
    let mut data = league_data(4);
    for venue in &mut data.venues {
        venue.stats.avg_first_innings_score = 0.;
        venue.stats.toss_record = None;
    }
    for player in &mut data.players {
        player.career = None;
    }
    data.projections.clear();
    data.results.clear();
    let league = League::try_from(data).unwrap();
    let model = ConstantModel::new(0.5);
    let engine = engine(&league, &model);
    let forecast = engine
        .simulate_season(&season_request(&league, 30), &CancellationToken::default())
        .unwrap();

    assert_eq!(4, forecast.predicted_standings.len());
    assert!(forecast.champion.is_some());
    assert!(forecast.awards.orange_cap.is_some());
    assert!(forecast.awards.purple_cap.is_some());
    assert!(forecast.awards.mvp.is_some());
    assert_no_nulls(&serde_json::to_value(&forecast).unwrap(), "forecast");
}

#[test]
fn season_forecast_is_reproducible() {
    let league = league(6);
    let model = ConstantModel::new(0.5);
    let cancel = CancellationToken::default();
    let request = SeasonRequest {
        seed: Some(99),
        ..season_request(&league, 30)
    };
    let forecast = |workers| {
        let config = Config {
            workers: Some(workers),
            ..config()
        };
        let engine = Engine::builder(config, Sources::from_league(&league))
            .with_model(&model)
            .build()
            .unwrap();
        let forecast = engine.simulate_season(&request, &cancel).unwrap();
        serde_json::to_string(&forecast).unwrap()
    };
    let single = forecast(1);
    assert_eq!(single, forecast(4));
    assert_eq!(single, forecast(16));
}

#[test]
fn empty_fixtures() {
    let league = league(4);
    let model = ConstantModel::new(0.5);
    let engine = engine(&league, &model);
    let request = SeasonRequest {
        num_simulations: 10,
        ..SeasonRequest::default()
    };
    let forecast = engine
        .simulate_season(&request, &CancellationToken::default())
        .unwrap();
    assert_eq!(10, forecast.num_simulations);
    assert!(forecast.predicted_standings.is_empty());
    assert!(forecast.champion.is_none());
}

#[test]
fn zero_simulations() {
    let league = league(4);
    let model = ConstantModel::new(0.5);
    let engine = engine(&league, &model);
    let result = engine.simulate_season(&season_request(&league, 0), &CancellationToken::default());
    assert!(matches!(
        result,
        Err(SimulationError::Config(ConfigError::NoSimulations))
    ));
}
