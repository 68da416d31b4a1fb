//! Unit tests for the comma-separated catalog format and catalog lookups.

use anistream::services::catalog_service::{bundled_catalog, parse_csv};
use anistream::types::anime::{Episode, EpisodeLink};
use anistream::types::errors::CatalogError;
use rstest::rstest;

const SAMPLE: &str = "\
name,episode,url,link
Frieren,Episode 1,https://img.test/frieren.jpg,https://cdn.test/frieren/1.m3u8
Mushishi,Episode 1,https://img.test/mushishi.jpg,https://cdn.test/mushishi/1.mp4
Frieren,Episode 2,https://img.test/frieren.jpg,https://cdn.test/frieren/2.m3u8
";

#[test]
fn test_groups_rows_by_name_in_first_appearance_order() {
    let catalog = parse_csv(SAMPLE).unwrap();
    let names: Vec<&str> = catalog.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Frieren", "Mushishi"]);

    let frieren = catalog.get("Frieren").unwrap();
    let titles: Vec<&str> = frieren.episodes.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Episode 1", "Episode 2"]);
    assert_eq!(frieren.poster_url.as_deref(), Some("https://img.test/frieren.jpg"));
    assert_eq!(catalog.episode_count(), 3);
}

#[test]
fn test_header_is_optional() {
    let without_header = SAMPLE.lines().skip(1).collect::<Vec<_>>().join("\n");
    assert_eq!(parse_csv(&without_header).unwrap(), parse_csv(SAMPLE).unwrap());
}

#[test]
fn test_header_only_skipped_on_first_row() {
    // A show literally called "name" after the first row is data.
    let text = "Frieren,Ep 1,,https://cdn.test/f1.mp4\nname,Ep 1,,https://cdn.test/n1.mp4\n";
    let catalog = parse_csv(text).unwrap();
    assert_eq!(catalog.len(), 2);
    assert!(catalog.get("name").is_some());
}

#[test]
fn test_blank_lines_and_crlf_are_tolerated() {
    let text = "name,episode,url,link\r\n\r\nA,1,,https://cdn.test/a.mp4\r\n\r\n";
    let catalog = parse_csv(text).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get("A").unwrap().episodes[0].link, "https://cdn.test/a.mp4");
    assert!(catalog.get("A").unwrap().poster_url.is_none());
}

#[test]
fn test_quoted_fields_with_commas_and_escapes() {
    let text = r#""Kaguya-sama: Love, Is War","Episode ""1""",,https://cdn.test/k1.mp4"#;
    let catalog = parse_csv(text).unwrap();
    let anime = catalog.get("Kaguya-sama: Love, Is War").unwrap();
    assert_eq!(anime.episodes[0].title, "Episode \"1\"");
    assert_eq!(anime.episodes[0].anime_name, "Kaguya-sama: Love, Is War");
}

#[test]
fn test_quoted_field_may_span_lines() {
    let text = "name,episode,url,link\n\"Frieren\",\"Ep 1\nPart A\",,https://cdn.test/f1.mp4\nFrieren,Ep 2,,https://cdn.test/f2.mp4\n";
    let catalog = parse_csv(text).unwrap();
    let titles: Vec<&str> = catalog
        .get("Frieren")
        .unwrap()
        .episodes
        .iter()
        .map(|e| e.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Ep 1\nPart A", "Ep 2"]);
}

#[test]
fn test_line_numbers_count_breaks_inside_quotes() {
    let text = "name,episode,url,link\r\nA,\"Ep 1\r\nPart A\",,https://cdn.test/a.mp4\r\nB,1\r\n";
    match parse_csv(text) {
        Err(CatalogError::Parse { line, .. }) => assert_eq!(line, 4),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[rstest]
#[case::too_few_fields("name,episode,url,link\nA,1,https://img.test/a.jpg\n", 2)]
#[case::unterminated_quote("A,\"1,,https://cdn.test/a.mp4\n", 1)]
#[case::empty_name("A,1,,https://cdn.test/a.mp4\n,2,,https://cdn.test/b.mp4\n", 2)]
fn test_malformed_rows_report_line(#[case] text: &str, #[case] expected_line: usize) {
    match parse_csv(text) {
        Err(CatalogError::Parse { line, .. }) => assert_eq!(line, expected_line),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_empty_input_gives_empty_catalog() {
    assert!(parse_csv("").unwrap().is_empty());
    assert!(parse_csv("name,episode,url,link\n").unwrap().is_empty());
}

#[rstest]
#[case("https://cdn.test/show/ep1.m3u8", EpisodeLink::Hls)]
#[case("https://cdn.test/show/ep1.M3U8?token=abc", EpisodeLink::Hls)]
#[case("https://cdn.test/show/ep1.mp4", EpisodeLink::Direct)]
#[case("https://cdn.test/show/ep1.webm#t=10", EpisodeLink::Direct)]
#[case("https://cdn.test/show/ep1.ts", EpisodeLink::Direct)]
#[case("https://player.test/embed/abc123", EpisodeLink::Embed)]
#[case("https://player.test", EpisodeLink::Embed)]
#[case("https://player.test/watch.php?id=1", EpisodeLink::Embed)]
fn test_link_classification(#[case] link: &str, #[case] expected: EpisodeLink) {
    let ep = Episode::new("Show", "Episode 1", link);
    assert_eq!(ep.link_kind(), expected);
    assert_eq!(ep.is_downloadable(), expected != EpisodeLink::Embed);
}

#[test]
fn test_search_is_case_insensitive_substring() {
    let catalog = parse_csv(SAMPLE).unwrap();
    let hits: Vec<&str> = catalog.search("FRIE").iter().map(|a| a.name.as_str()).collect();
    assert_eq!(hits, vec!["Frieren"]);
    assert!(catalog.search("naruto").is_empty());
    assert_eq!(catalog.search("  ").len(), 2);
}

#[test]
fn test_find_episode_by_link() {
    let catalog = parse_csv(SAMPLE).unwrap();
    let ep = catalog.find_episode("https://cdn.test/frieren/2.m3u8").unwrap();
    assert_eq!(ep.title, "Episode 2");
    assert_eq!(ep.anime_name, "Frieren");
    assert!(catalog.find_episode("https://cdn.test/nope.mp4").is_none());
}

#[test]
fn test_bundled_catalog_has_downloadable_episodes() {
    let catalog = bundled_catalog();
    assert!(catalog.len() >= 2);
    assert!(catalog
        .iter()
        .flat_map(|a| a.episodes.iter())
        .any(|e| e.is_downloadable()));
}
