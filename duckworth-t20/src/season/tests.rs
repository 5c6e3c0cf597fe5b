use super::*;
use crate::data::League;
use crate::domain::{MatchId, VenueId, MAX_WICKETS};
use crate::features::Feature;
use crate::model::ConstantModel;
use crate::testing::{league, league_data, player_id};

const SEED: u64 = 42;

fn request(league: &League, num_simulations: usize) -> SeasonRequest {
    SeasonRequest {
        fixtures: league.fixtures().to_vec(),
        num_simulations,
        seed: Some(SEED),
        ..SeasonRequest::default()
    }
}

fn tables(league: &League, request: &SeasonRequest) -> SeasonTables {
    resolve_tables(&Sources::from_league(league), "sa20", 160., request, SEED)
}

#[test]
fn four_team_season() {
    let league = league(4);
    let tables = tables(&league, &request(&league, 1));
    let model = ConstantModel::new(0.5);
    let simulator = SeasonSimulator::new(&model);
    let season = simulator.simulate_one(&tables, 0, SEED);

    assert_eq!(4, season.outcomes.len());
    for outcome in &season.outcomes {
        outcome.validate().unwrap();
    }
    assert_eq!(4, season.standings.len());
    for (_, row) in &season.standings {
        assert_eq!(2, row.played);
        row.validate().unwrap();
    }
    let total_wins: u32 = season.standings.iter().map(|(_, row)| row.wins).sum();
    assert_eq!(4, total_wins);
    assert_eq!(4, season.bracket.ties.len());
    let champion = season.bracket.champion.unwrap();
    assert!((1..=4).contains(&champion.0));

    let accumulator = simulator
        .run(&tables, 1, SEED, &CancellationToken::default())
        .unwrap();
    assert_eq!(1, accumulator.simulations);
    assert_eq!(1, accumulator.championships.iter().sum::<u32>());
    assert_eq!(4, accumulator.playoffs.iter().sum::<u32>());
}

#[test]
fn certain_home_wins() {
    let league = league(6);
    let tables = tables(&league, &request(&league, 1));
    let model = ConstantModel::new(1.);
    let simulator = SeasonSimulator::new(&model);
    for sim_index in 0..20 {
        let season = simulator.simulate_one(&tables, sim_index, SEED);
        assert!(season.outcomes.iter().all(|outcome| outcome.winner == Side::Home));
    }
}

#[test]
fn wins_sum_to_fixtures_and_champion_qualified() {
    let league = league(6);
    let tables = tables(&league, &request(&league, 1));
    let model = ConstantModel::new(0.6);
    let simulator = SeasonSimulator::new(&model);
    for sim_index in 0..50 {
        let season = simulator.simulate_one(&tables, sim_index, SEED);
        let total_wins: u32 = season.standings.iter().map(|(_, row)| row.wins).sum();
        assert_eq!(tables.num_fixtures() as u32, total_wins);
        let qualifiers = season
            .standings
            .iter()
            .take(QUALIFIERS)
            .map(|(_, row)| row.team_id)
            .collect::<Vec<_>>();
        assert!(qualifiers.contains(&season.bracket.champion.unwrap()));
    }
}

#[test]
fn deterministic_across_worker_counts() {
    let league = league(6);
    let tables = tables(&league, &request(&league, 40));
    let model = ConstantModel::new(0.55);
    let cancel = CancellationToken::default();
    let run = |workers| {
        SeasonSimulator::new(&model)
            .with_workers(workers)
            .run(&tables, 40, SEED, &cancel)
            .unwrap()
    };
    let single = run(1);
    assert_eq!(40, single.simulations);
    assert_eq!(single, run(3));
    assert_eq!(single, run(8));
    assert_eq!(single, run(64));
}

#[test]
fn seed_changes_result() {
    let league = league(6);
    let tables = tables(&league, &request(&league, 10));
    let model = ConstantModel::new(0.5);
    let simulator = SeasonSimulator::new(&model).with_workers(2);
    let cancel = CancellationToken::default();
    let a = simulator.run(&tables, 10, 1, &cancel).unwrap();
    let b = simulator.run(&tables, 10, 2, &cancel).unwrap();
    assert_ne!(a, b);
}

#[test]
fn cold_start_is_finite() {
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
    let tables = tables(&league, &request(&league, 30));
    let model = ConstantModel::new(0.5);
    let simulator = SeasonSimulator::new(&model);

    for sim_index in 0..30 {
        for outcome in simulator.simulate_one(&tables, sim_index, SEED).outcomes {
            outcome.validate().unwrap();
            assert!((125..=230).contains(&outcome.first_innings_score));
            assert!(outcome.second_innings_wickets <= MAX_WICKETS);
        }
    }
    let accumulator = simulator
        .run(&tables, 30, SEED, &CancellationToken::default())
        .unwrap();
    let all_samples = accumulator
        .positions
        .iter()
        .chain(&accumulator.points)
        .chain(&accumulator.player_runs)
        .chain(&accumulator.player_wickets)
        .flatten();
    for &sample in all_samples {
        assert!(sample.is_finite());
        assert!(sample >= 0.);
    }
}

#[test]
fn prepass_resolves_lineups() {
    let league = league(4);
    let tables = tables(&league, &request(&league, 1));
    assert_eq!(&[TeamId(1), TeamId(2), TeamId(3), TeamId(4)], tables.team_ids());
    assert_eq!(4 * XI, tables.players().len());
    for lineup in &tables.lineups {
        assert_eq!(XI, lineup.len());
    }
    let first = &tables.players()[0];
    assert_eq!(player_id(1, 0), first.id);
    assert_eq!(26., first.projection.predicted_runs);
    assert_eq!(0., tables.fixtures[0].features.build()[Feature::HomeLineupOverride]);
}

#[test]
fn custom_xi_overrides_squad() {
    let league = league(4);
    let mut request = request(&league, 1);
    let mut custom = (0..5).map(|index| player_id(1, index)).collect::<Vec<_>>();
    custom.push(PlayerId(9_999));
    request.custom_xis.insert(TeamId(1), custom);
    let tables = tables(&league, &request);

    assert_eq!(5, tables.lineups[0].len());
    // M1 is T1 at home; M4 is T4 hosting T1
    let m1 = tables.fixtures[0].features.build();
    assert_eq!(5., m1[Feature::HomeLineupOverride]);
    assert_eq!(0., m1[Feature::AwayLineupOverride]);
    let m4 = tables.fixtures[3].features.build();
    assert_eq!(5., m4[Feature::AwayLineupOverride]);
}

#[test]
fn unknown_fixture_team_plays_cold() {
    let league = league(4);
    let mut request = request(&league, 1);
    request.fixtures.push(Fixture {
        match_id: MatchId(99),
        home_team_id: TeamId(9),
        away_team_id: TeamId(1),
        venue_id: VenueId(7),
    });
    let tables = tables(&league, &request);
    assert_eq!(5, tables.team_ids().len());
    assert!(tables.lineups[4].is_empty());

    let model = ConstantModel::new(0.5);
    let season = SeasonSimulator::new(&model).simulate_one(&tables, 0, SEED);
    assert_eq!(5, season.outcomes.len());
    season.outcomes[4].validate().unwrap();
    assert_eq!(5, season.standings.len());
}

#[test]
fn head_to_head_feeds_features() {
    let league = league(4);
    let tables = tables(&league, &request(&league, 1));
    let m1 = tables.fixtures[0].features.build();
    assert_eq!(3., m1[Feature::H2hTotalMatches]);
    assert_eq!(2., m1[Feature::H2hHomeWins]);
    assert_eq!(158., m1[Feature::VenueAvgScore]);
}

#[test]
fn cancelled_run() {
    let league = league(4);
    let tables = tables(&league, &request(&league, 100));
    let model = ConstantModel::new(0.5);
    let cancel = CancellationToken::default();
    cancel.cancel();
    let result = SeasonSimulator::new(&model).run(&tables, 100, SEED, &cancel);
    assert!(matches!(result, Err(SimulationError::Cancelled)));
}

#[test]
fn zero_simulations_rejected() {
    let league = league(4);
    let tables = tables(&league, &request(&league, 0));
    let model = ConstantModel::new(0.5);
    let result = SeasonSimulator::new(&model).run(&tables, 0, SEED, &CancellationToken::default());
    assert!(matches!(
        result,
        Err(SimulationError::Config(ConfigError::NoSimulations))
    ));
}
