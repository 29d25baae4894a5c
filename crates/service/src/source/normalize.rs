use common::types::RawRecord;

use crate::catalog::MovieRecord;

const DEFAULT_KIND: &str = "Movie";

/// Turn a scraped listing entry into a catalog record. Never fails; missing
/// pieces become empty strings.
pub fn normalize(raw: RawRecord) -> MovieRecord {
    let kind = raw
        .title_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_KIND)
        .to_string();
    let name = extract_name(&raw.title, &kind);
    let duration = extract_duration(&raw.metadata, &kind);
    let genre = raw
        .genres
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    MovieRecord { name, kind, duration, genre }
}

/// Drop the `"12. "` rank prefix and a trailing `"(TV Series)"` style tag.
fn extract_name(title: &str, kind: &str) -> String {
    let mut name = title.trim();
    if let Some((rank, rest)) = name.split_once(". ") {
        if !rank.is_empty() && rank.bytes().all(|b| b.is_ascii_digit()) {
            name = rest.trim_start();
        }
    }
    let suffix = format!("({})", kind.to_lowercase());
    if name.to_lowercase().ends_with(&suffix) {
        // lowercasing can change byte lengths outside ASCII, so cut by chars
        let keep = name.chars().count().saturating_sub(suffix.chars().count());
        let cut = name.char_indices().nth(keep).map_or(name.len(), |(i, _)| i);
        name = &name[..cut];
    }
    name.trim().to_string()
}

/// Running time for movies, airing period for everything else.
fn extract_duration(metadata: &[String], kind: &str) -> String {
    let is_movie = kind.eq_ignore_ascii_case(DEFAULT_KIND);
    metadata
        .iter()
        .map(|t| t.trim())
        .find(|t| if is_movie { is_running_time(t) } else { is_period(t) })
        .unwrap_or_default()
        .to_string()
}

/// `"2h 46m"`, `"1h"`, `"45m"`.
fn is_running_time(token: &str) -> bool {
    !token.is_empty()
        && token.split_whitespace().all(|part| {
            part.strip_suffix('h')
                .or_else(|| part.strip_suffix('m'))
                .is_some_and(|num| !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()))
        })
}

/// `"2024"`, `"2019-2024"`, `"2022–"`, `"2019–2024"`.
fn is_period(token: &str) -> bool {
    let mut parts = token.split(|c| c == '-' || c == '–');
    let Some(start) = parts.next() else { return false };
    let year = |s: &str| s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit());
    year(start) && parts.all(|p| p.is_empty() || year(p))
}
