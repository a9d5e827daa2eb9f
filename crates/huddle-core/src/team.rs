// NFL team abbreviations.
//
// Includes relocated franchises (OAK, SD, STL) and the alternate codes
// different providers use for the same team (LA/LAR, JAC/JAX, WAS/WSH).

const TEAM_NAMES: &[(&str, &str)] = &[
    ("ARI", "Cardinals"),
    ("ATL", "Falcons"),
    ("BAL", "Ravens"),
    ("BUF", "Bills"),
    ("CAR", "Panthers"),
    ("CHI", "Bears"),
    ("CIN", "Bengals"),
    ("CLE", "Browns"),
    ("DAL", "Cowboys"),
    ("DEN", "Broncos"),
    ("DET", "Lions"),
    ("GB", "Packers"),
    ("HOU", "Texans"),
    ("IND", "Colts"),
    ("JAC", "Jaguars"),
    ("JAX", "Jaguars"),
    ("KC", "Chiefs"),
    ("LA", "Rams"),
    ("LAC", "Chargers"),
    ("LAR", "Rams"),
    ("LV", "Raiders"),
    ("MIA", "Dolphins"),
    ("MIN", "Vikings"),
    ("NE", "Patriots"),
    ("NO", "Saints"),
    ("NYG", "Giants"),
    ("NYJ", "Jets"),
    ("OAK", "Raiders"),
    ("PHI", "Eagles"),
    ("PIT", "Steelers"),
    ("SD", "Chargers"),
    ("SEA", "Seahawks"),
    ("SF", "49ers"),
    ("STL", "Rams"),
    ("TB", "Buccaneers"),
    ("TEN", "Titans"),
    ("WAS", "Commanders"),
    ("WSH", "Commanders"),
];

/// All known team abbreviations.
pub fn abbreviations() -> impl Iterator<Item = &'static str> {
    TEAM_NAMES.iter().map(|(abbr, _)| *abbr)
}

/// Nickname for a team abbreviation, if known.
pub fn team_name(abbr: &str) -> Option<&'static str> {
    TEAM_NAMES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(abbr))
        .map(|(_, name)| *name)
}

/// Nickname for display, falling back to the abbreviation itself.
pub fn display_name(abbr: &str) -> &str {
    team_name(abbr).unwrap_or(abbr)
}

/// ESPN `proTeamId` to abbreviation.
pub fn from_espn_id(id: u32) -> Option<&'static str> {
    let abbr = match id {
        1 => "ATL",
        2 => "BUF",
        3 => "CHI",
        4 => "CIN",
        5 => "CLE",
        6 => "DAL",
        7 => "DEN",
        8 => "DET",
        9 => "GB",
        10 => "TEN",
        11 => "IND",
        12 => "KC",
        13 => "LV",
        14 => "LAR",
        15 => "MIA",
        16 => "MIN",
        17 => "NE",
        18 => "NO",
        19 => "NYG",
        20 => "NYJ",
        21 => "PHI",
        22 => "ARI",
        23 => "PIT",
        24 => "LAC",
        25 => "SF",
        26 => "SEA",
        27 => "TB",
        28 => "WSH",
        29 => "CAR",
        30 => "JAX",
        33 => "BAL",
        34 => "HOU",
        _ => return None,
    };
    Some(abbr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_abbreviations() {
        assert_eq!(team_name("KC"), Some("Chiefs"));
        assert_eq!(team_name("kc"), Some("Chiefs"));
        assert_eq!(team_name("XYZ"), None);
        assert_eq!(display_name("XYZ"), "XYZ");
        assert_eq!(display_name("SF"), "49ers");
    }

    #[test]
    fn espn_ids_map_to_known_teams() {
        for id in (1..=30).chain([33, 34]) {
            let abbr = from_espn_id(id).expect("id should be mapped");
            assert!(team_name(abbr).is_some(), "{abbr} missing from name table");
        }
        assert_eq!(from_espn_id(31), None);
    }
}
