use stanza::style::HAlign::Left;
use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Col, Row, Table};

use crate::aggregate::{AwardSummary, CapAward, SeasonForecast};
use crate::engine::MatchPrediction;
use crate::lineup::Selection;

fn left(min_width: usize) -> Col {
    Col::new(Styles::default().with(MinWidth(min_width)).with(Left))
}

fn right(min_width: usize) -> Col {
    Col::new(Styles::default().with(MinWidth(min_width)).with(HAlign::Right))
}

fn header(cells: &[&str]) -> Row {
    Row::new(
        Styles::default().with(Header(true)),
        cells.iter().map(|&cell| cell.into()).collect(),
    )
}

pub fn tabulate_standings(forecast: &SeasonForecast) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            right(3),
            left(20),
            right(8),
            right(8),
            right(16),
            right(8),
            right(8),
            right(8),
            right(8),
        ])
        .with_row(header(&[
            "#",
            "Team",
            "Avg pos",
            "Avg pts",
            "Pts p10–p90",
            "Wins",
            "Playoff %",
            "Final %",
            "Title %",
        ]));
    for (index, team) in forecast.predicted_standings.iter().enumerate() {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}", index + 1).into(),
                team.team_name.clone().into(),
                format!("{:.2}", team.mean_position).into(),
                format!("{:.2}", team.mean_points).into(),
                format!("{:.0}–{:.0}", team.points_p10, team.points_p90).into(),
                format!("{:.2}", team.mean_wins).into(),
                format!("{:.1}", team.playoff_probability).into(),
                format!("{:.1}", team.finals_probability).into(),
                format!("{:.1}", team.championship_probability).into(),
            ],
        ));
    }
    table
}

fn cap_row(award: &str, cap: &Option<CapAward>) -> Row {
    let cells = match cap {
        Some(cap) => vec![
            award.into(),
            cap.player_name.clone().into(),
            cap.team_name.clone().into(),
            format!("{:.1} ({:.0}–{:.0})", cap.average, cap.range[0], cap.range[1]).into(),
        ],
        None => vec![award.into(), "-".into(), "-".into(), "-".into()],
    };
    Row::new(Styles::default(), cells)
}

pub fn tabulate_awards(awards: &AwardSummary) -> Table {
    let mut table = Table::default()
        .with_cols(vec![left(14), left(20), left(20), right(16)])
        .with_row(header(&["Award", "Player", "Team", "Value"]));
    table.push_row(cap_row("Orange cap", &awards.orange_cap));
    table.push_row(cap_row("Purple cap", &awards.purple_cap));
    if let Some(mvp) = &awards.mvp {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                "MVP".into(),
                mvp.player_name.clone().into(),
                mvp.team_name.clone().into(),
                format!("{:.1}", mvp.composite).into(),
            ],
        ));
    }
    for (index, pick) in awards.team_of_tournament.iter().enumerate() {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("XI #{}", index + 1).into(),
                pick.player_name.clone().into(),
                pick.team_name.clone().into(),
                format!("{:.1}", pick.composite).into(),
            ],
        ));
    }
    for upset in &awards.upset_tracker {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                "Upset".into(),
                "".into(),
                upset.team_name.clone().into(),
                format!("{} → {:.2}", upset.expected_position, upset.actual_position).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_prediction(prediction: &MatchPrediction) -> Table {
    let outcome = &prediction.outcome;
    let mut table = Table::default()
        .with_cols(vec![left(20), right(10), right(10)])
        .with_row(header(&[
            "",
            prediction.home_team_name.as_str(),
            prediction.away_team_name.as_str(),
        ]));
    let mut push = |label: &str, home: String, away: String| {
        table.push_row(Row::new(
            Styles::default(),
            vec![label.into(), home.into(), away.into()],
        ));
    };
    push(
        "Win probability",
        format!("{:.3}", prediction.home_win_probability),
        format!("{:.3}", prediction.away_win_probability),
    );
    push(
        "Score",
        format!("{}/{}", outcome.home_score, outcome.home_wickets),
        format!("{}/{}", outcome.away_score, outcome.away_wickets),
    );
    push(
        "Top scorer",
        top_scorer(&prediction.home_xi),
        top_scorer(&prediction.away_xi),
    );
    table
}

fn top_scorer(xi: &[Selection]) -> String {
    xi.iter()
        .max_by(|a, b| a.predicted_runs.total_cmp(&b.predicted_runs))
        .map(|player| format!("{} ({:.0})", player.name, player.predicted_runs))
        .unwrap_or_else(|| "-".into())
}

pub fn tabulate_xi(xi: &[Selection]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![right(3), left(20), left(14), right(6), right(6)])
        .with_row(header(&["#", "Player", "Role", "Runs", "Wkts"]));
    for (index, player) in xi.iter().enumerate() {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}", index + 1).into(),
                player.name.clone().into(),
                player.role.to_string().into(),
                format!("{:.1}", player.predicted_runs).into(),
                format!("{:.2}", player.predicted_wickets).into(),
            ],
        ));
    }
    table
}
