//! Turns raw ESPN scoreboard payloads into [`Game`]s.

use crate::domain::model::{Game, GameState, LeagueKey, Team};
use crate::utils::error::{Result, ScoreboardError};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    id: String,
    date: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    status: RawStatus,
    competitions: Vec<RawCompetition>,
    #[serde(default)]
    links: Vec<RawLink>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatus {
    #[serde(default)]
    clock: f64,
    #[serde(default)]
    period: u32,
    #[serde(default)]
    display_clock: Option<String>,
    #[serde(rename = "type")]
    kind: RawStatusType,
}

#[derive(Debug, Deserialize)]
struct RawStatusType {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct RawCompetition {
    competitors: Vec<RawCompetitor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompetitor {
    home_away: String,
    team: RawTeam,
    #[serde(default)]
    score: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTeam {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    abbreviation: String,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    #[serde(default)]
    rel: Vec<String>,
    href: String,
}

impl From<RawTeam> for Team {
    fn from(raw: RawTeam) -> Self {
        let name = raw
            .name
            .or_else(|| raw.display_name.clone())
            .unwrap_or_else(|| raw.abbreviation.clone());
        Team {
            id: raw.id,
            display_name: raw.display_name.unwrap_or_else(|| name.clone()),
            name,
            abbreviation: raw.abbreviation,
            logo: raw.logo,
            color: raw.color,
        }
    }
}

/// Accepts `2025-07-03T18:05Z`, RFC 3339, and the same forms without a
/// zone (taken as UTC).
pub fn parse_event_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let trimmed = s.trim_end_matches('Z');
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_score(score: Option<&Value>) -> u32 {
    match score {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0) as u32,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Object(obj)) => parse_score(obj.get("value").or_else(|| obj.get("displayValue"))),
        _ => 0,
    }
}

/// Parses one event object (a scoreboard entry or a single-game payload).
pub fn parse_event(event: &Value, league: &LeagueKey) -> Result<Game> {
    let event_id = event
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("N/A")
        .to_string();
    let raw: RawEvent = serde_json::from_value(event.clone())
        .map_err(|e| ScoreboardError::parse(format!("event {}", event_id), e.to_string()))?;

    let date = parse_event_date(&raw.date).ok_or_else(|| {
        ScoreboardError::parse(
            format!("event {}", raw.id),
            format!("unrecognised date '{}'", raw.date),
        )
    })?;

    let mut competitors = raw
        .competitions
        .into_iter()
        .next()
        .map(|competition| competition.competitors)
        .unwrap_or_default();
    let home_index = competitors.iter().position(|c| c.home_away == "home");
    let away_index = competitors.iter().position(|c| c.home_away == "away");
    let (Some(home_index), Some(away_index)) = (home_index, away_index) else {
        return Err(ScoreboardError::parse(
            format!("event {}", raw.id),
            "could not find home/away competitors",
        ));
    };
    // Remove the higher index first so the lower one stays valid.
    let (home, away) = if home_index > away_index {
        let home = competitors.remove(home_index);
        (home, competitors.remove(away_index))
    } else {
        let away = competitors.remove(away_index);
        (competitors.remove(home_index), away)
    };

    let event_link = raw
        .links
        .into_iter()
        .find(|link| link.rel.iter().any(|rel| rel == "summary"))
        .map(|link| link.href);

    let state = GameState::from_espn(
        raw.status.kind.id.as_deref(),
        raw.status.kind.state.as_deref(),
        raw.status.kind.completed,
    );

    Ok(Game {
        name: raw.name.unwrap_or_else(|| "N/A".to_string()),
        short_name: raw.short_name.unwrap_or_else(|| "N/A".to_string()),
        id: raw.id,
        league: Some(league.clone()),
        date,
        state,
        clock_seconds: raw.status.clock,
        period: raw.status.period,
        display_clock: raw.status.display_clock,
        home_score: parse_score(home.score.as_ref()),
        away_score: parse_score(away.score.as_ref()),
        home: home.team.into(),
        away: away.team.into(),
        event_link,
    })
}

/// Parses every event of a scoreboard payload. Events that cannot be read
/// are logged and skipped.
pub fn parse_scoreboard(raw: &Value, league: &LeagueKey) -> Vec<Game> {
    let Some(events) = raw.get("events").and_then(Value::as_array) else {
        tracing::warn!(league = %league, "No events found in scoreboard payload");
        return Vec::new();
    };

    events
        .iter()
        .filter_map(|event| match parse_event(event, league) {
            Ok(game) => Some(game),
            Err(e) => {
                tracing::warn!(league = %league, "Skipping event: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn event(id: &str, type_id: &str) -> Value {
        json!({
            "id": id,
            "date": "2025-07-03T18:05Z",
            "name": "Boston Red Sox at New York Yankees",
            "shortName": "BOS @ NYY",
            "status": {
                "clock": 0.0,
                "displayClock": "0:00",
                "period": 7,
                "type": {"id": type_id, "state": "in", "completed": false}
            },
            "competitions": [{
                "competitors": [
                    {"homeAway": "home", "score": "5",
                     "team": {"id": "10", "name": "Yankees", "displayName": "New York Yankees",
                              "abbreviation": "NYY", "color": "132448"}},
                    {"homeAway": "away", "score": 3,
                     "team": {"id": "2", "displayName": "Boston Red Sox", "abbreviation": "BOS"}}
                ]
            }],
            "links": [
                {"rel": ["summary", "desktop", "event"], "href": "https://espn.com/mlb/game/_/gameId/1"}
            ]
        })
    }

    #[test]
    fn test_parse_event_fields() {
        let league = LeagueKey::new("baseball", "mlb");
        let game = parse_event(&event("401", "2"), &league).unwrap();

        assert_eq!(game.id, "401");
        assert_eq!(game.date, Utc.with_ymd_and_hms(2025, 7, 3, 18, 5, 0).unwrap());
        assert_eq!(game.state, GameState::InProgress);
        assert_eq!(game.period, 7);
        assert_eq!(game.home.abbreviation, "NYY");
        assert_eq!(game.home.color.as_deref(), Some("132448"));
        assert_eq!(game.away.name, "Boston Red Sox");
        assert_eq!(game.away.display_name, "Boston Red Sox");
        assert_eq!((game.home_score, game.away_score), (5, 3));
        assert_eq!(
            game.event_link.as_deref(),
            Some("https://espn.com/mlb/game/_/gameId/1")
        );
        assert_eq!(game.status_line(&Utc), "Inn 7");
    }

    #[test]
    fn test_parse_scoreboard_skips_bad_events() {
        let league = LeagueKey::new("baseball", "mlb");
        let mut no_home = event("3", "1");
        no_home["competitions"][0]["competitors"][0]["homeAway"] = json!("neutral");
        let mut bad_date = event("4", "1");
        bad_date["date"] = json!("tomorrow-ish");

        let raw = json!({
            "events": [event("1", "3"), {"id": "2"}, no_home, bad_date, event("5", "1")]
        });
        let games = parse_scoreboard(&raw, &league);

        let ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5"]);
        assert!(games[0].is_final());
        assert!(games[1].is_pregame());
    }

    #[test]
    fn test_missing_events_yields_empty_list() {
        let league = LeagueKey::new("hockey", "nhl");
        assert!(parse_scoreboard(&json!({}), &league).is_empty());
        assert!(parse_scoreboard(&json!({"events": []}), &league).is_empty());
    }

    #[test]
    fn test_event_date_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 7, 3, 18, 5, 0).unwrap();
        assert_eq!(parse_event_date("2025-07-03T18:05Z"), Some(expected));
        assert_eq!(parse_event_date("2025-07-03T18:05"), Some(expected));
        assert_eq!(parse_event_date("2025-07-03T18:05:00Z"), Some(expected));
        assert_eq!(parse_event_date("2025-07-03T13:05:00-05:00"), Some(expected));
        assert_eq!(parse_event_date("July 3rd"), None);
    }

    #[test]
    fn test_scores_default_to_zero() {
        assert_eq!(parse_score(None), 0);
        assert_eq!(parse_score(Some(&json!("n/a"))), 0);
        assert_eq!(parse_score(Some(&json!({"value": 2.0, "displayValue": "2"}))), 2);
    }
}
