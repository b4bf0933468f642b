use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    NorthAmerica,
    SouthAmerica,
    Oceania,
    Unknown,
}

/// A resolved country: ISO alpha-2 code when known, else the normalized input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryInfo {
    pub key: String,
    pub continent: Continent,
}

/// Resolves "FR", "fr", "France" or "france" to the same country key.
pub fn resolve_country(country: &str) -> CountryInfo {
    let trimmed = country.trim();
    let upper = trimmed.to_ascii_uppercase();
    let lower = trimmed.to_lowercase();

    COUNTRIES
        .iter()
        .find(|(code, names, _)| *code == upper || names.iter().any(|n| *n == lower))
        .map(|(code, _, continent)| CountryInfo {
            key: code.to_string(),
            continent: *continent,
        })
        .unwrap_or(CountryInfo {
            key: if lower.is_empty() {
                "unknown".to_string()
            } else {
                lower
            },
            continent: Continent::Unknown,
        })
}

use Continent::*;

const COUNTRIES: &[(&str, &[&str], Continent)] = &[
    // Europe
    ("FR", &["france"], Europe),
    ("IT", &["italy", "italia"], Europe),
    ("ES", &["spain", "españa"], Europe),
    ("PT", &["portugal"], Europe),
    ("GR", &["greece"], Europe),
    ("DE", &["germany", "deutschland"], Europe),
    ("AT", &["austria"], Europe),
    ("CH", &["switzerland"], Europe),
    ("GB", &["united kingdom", "uk", "england", "scotland", "wales"], Europe),
    ("IE", &["ireland"], Europe),
    ("NL", &["netherlands"], Europe),
    ("BE", &["belgium"], Europe),
    ("DK", &["denmark"], Europe),
    ("SE", &["sweden"], Europe),
    ("NO", &["norway"], Europe),
    ("FI", &["finland"], Europe),
    ("IS", &["iceland"], Europe),
    ("HR", &["croatia"], Europe),
    ("ME", &["montenegro"], Europe),
    ("CZ", &["czech republic", "czechia"], Europe),
    ("HU", &["hungary"], Europe),
    ("PL", &["poland"], Europe),
    ("MT", &["malta"], Europe),
    ("CY", &["cyprus"], Europe),
    ("MC", &["monaco"], Europe),
    ("TR", &["turkey", "türkiye"], Europe),
    // Asia
    ("JP", &["japan"], Asia),
    ("CN", &["china"], Asia),
    ("KR", &["south korea", "korea"], Asia),
    ("TH", &["thailand"], Asia),
    ("VN", &["vietnam", "viet nam"], Asia),
    ("ID", &["indonesia"], Asia),
    ("MY", &["malaysia"], Asia),
    ("SG", &["singapore"], Asia),
    ("PH", &["philippines"], Asia),
    ("IN", &["india"], Asia),
    ("LK", &["sri lanka"], Asia),
    ("MV", &["maldives"], Asia),
    ("NP", &["nepal"], Asia),
    ("BT", &["bhutan"], Asia),
    ("KH", &["cambodia"], Asia),
    ("AE", &["united arab emirates", "uae"], Asia),
    ("OM", &["oman"], Asia),
    ("JO", &["jordan"], Asia),
    ("IL", &["israel"], Asia),
    ("QA", &["qatar"], Asia),
    // Africa
    ("MA", &["morocco"], Africa),
    ("EG", &["egypt"], Africa),
    ("ZA", &["south africa"], Africa),
    ("KE", &["kenya"], Africa),
    ("TZ", &["tanzania"], Africa),
    ("NA", &["namibia"], Africa),
    ("BW", &["botswana"], Africa),
    ("RW", &["rwanda"], Africa),
    ("MU", &["mauritius"], Africa),
    ("SC", &["seychelles"], Africa),
    ("TN", &["tunisia"], Africa),
    // North America (incl. Central America and Caribbean)
    ("US", &["united states", "usa", "united states of america"], NorthAmerica),
    ("CA", &["canada"], NorthAmerica),
    ("MX", &["mexico", "méxico"], NorthAmerica),
    ("CR", &["costa rica"], NorthAmerica),
    ("BZ", &["belize"], NorthAmerica),
    ("PA", &["panama"], NorthAmerica),
    ("CU", &["cuba"], NorthAmerica),
    ("BS", &["bahamas"], NorthAmerica),
    ("JM", &["jamaica"], NorthAmerica),
    ("BB", &["barbados"], NorthAmerica),
    ("LC", &["saint lucia", "st lucia"], NorthAmerica),
    ("DO", &["dominican republic"], NorthAmerica),
    ("TC", &["turks and caicos"], NorthAmerica),
    // South America
    ("BR", &["brazil", "brasil"], SouthAmerica),
    ("AR", &["argentina"], SouthAmerica),
    ("CL", &["chile"], SouthAmerica),
    ("PE", &["peru", "perú"], SouthAmerica),
    ("CO", &["colombia"], SouthAmerica),
    ("EC", &["ecuador"], SouthAmerica),
    ("UY", &["uruguay"], SouthAmerica),
    ("BO", &["bolivia"], SouthAmerica),
    // Oceania
    ("AU", &["australia"], Oceania),
    ("NZ", &["new zealand"], Oceania),
    ("FJ", &["fiji"], Oceania),
    ("PF", &["french polynesia", "tahiti"], Oceania),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_and_name_resolve_to_same_key() {
        assert_eq!(resolve_country("FR"), resolve_country("France"));
        assert_eq!(resolve_country(" fr ").continent, Continent::Europe);
    }

    #[test]
    fn test_unknown_country_keeps_normalized_name() {
        let info = resolve_country("Atlantis");
        assert_eq!(info.key, "atlantis");
        assert_eq!(info.continent, Continent::Unknown);
    }

    #[test]
    fn test_empty_country_is_unknown() {
        assert_eq!(resolve_country("").key, "unknown");
    }

    #[test]
    fn test_continents() {
        assert_eq!(resolve_country("JP").continent, Continent::Asia);
        assert_eq!(resolve_country("mexico").continent, Continent::NorthAmerica);
        assert_eq!(resolve_country("PE").continent, Continent::SouthAmerica);
        assert_eq!(resolve_country("Tahiti").continent, Continent::Oceania);
    }
}
