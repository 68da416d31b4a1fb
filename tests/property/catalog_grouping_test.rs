//! Property-based tests for catalog parsing.
//!
//! For any valid comma-separated catalog, the number of anime equals the
//! number of distinct names, and every anime's episodes appear in input order.

use anistream::services::catalog_service::parse_csv;
use proptest::prelude::*;

/// A row: anime index into a small name pool, and an episode number.
fn arb_rows() -> impl Strategy<Value = Vec<(usize, u32)>> {
    prop::collection::vec((0usize..6, 1u32..500), 1..40)
}

const NAMES: [&str; 6] = [
    "Frieren",
    "Mushishi",
    "Kaguya-sama: Love, Is War",
    "Steins;Gate",
    "Cowboy Bebop",
    "\"Oshi no Ko\"",
];

/// Quotes a field the way a spreadsheet export would.
fn quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn render(rows: &[(usize, u32)], header: bool) -> String {
    let mut text = String::new();
    if header {
        text.push_str("name,episode,url,link\n");
    }
    for (i, (name, ep)) in rows.iter().enumerate() {
        text.push_str(&format!(
            "{},Episode {},https://img.test/{}.jpg,https://cdn.test/{}/{}.mp4\n",
            quote(NAMES[*name]),
            ep,
            name,
            name,
            i
        ));
    }
    text
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn distinct_names_become_distinct_anime(rows in arb_rows(), header in any::<bool>()) {
        let catalog = parse_csv(&render(&rows, header)).expect("valid catalog should parse");

        let mut distinct: Vec<&str> = Vec::new();
        for (name, _) in &rows {
            if !distinct.contains(&NAMES[*name]) {
                distinct.push(NAMES[*name]);
            }
        }
        let names: Vec<&str> = catalog.iter().map(|a| a.name.as_str()).collect();
        prop_assert_eq!(names, distinct);
        prop_assert_eq!(catalog.episode_count(), rows.len());
    }

    #[test]
    fn episodes_keep_input_order(rows in arb_rows()) {
        let catalog = parse_csv(&render(&rows, true)).expect("valid catalog should parse");

        for anime in catalog.iter() {
            let expected: Vec<String> = rows
                .iter()
                .enumerate()
                .filter(|(_, (name, _))| NAMES[*name] == anime.name)
                .map(|(i, (name, _))| format!("https://cdn.test/{}/{}.mp4", name, i))
                .collect();
            let links: Vec<String> = anime.episodes.iter().map(|e| e.link.clone()).collect();
            prop_assert_eq!(links, expected);
        }
    }
}
