//! Property tests for the markup normalizer.

use proptest::prelude::*;
use resolvekit_normalizer::normalize;
use resolvekit_shared::Block;

fn item_text() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,24}"
}

fn block_markup() -> impl Strategy<Value = String> {
    prop_oneof![
        item_text().prop_map(|t| format!("<h2>{t}</h2>")),
        item_text().prop_map(|t| format!("<p>{t}</p>")),
        item_text().prop_map(|t| format!("<p><b>{t}</b></p>")),
        item_text().prop_map(|t| format!("<p style=\"font-size:24pt\">{t}</p>")),
        prop::collection::vec(item_text(), 1..4)
            .prop_map(|items| format!("<ol>{}</ol>", wrap_items(&items))),
        prop::collection::vec(item_text(), 1..4)
            .prop_map(|items| format!("<ul>{}</ul>", wrap_items(&items))),
        Just("<p>&nbsp;</p>".to_string()),
        item_text().prop_map(|t| format!("<div><p>{t}</p><ul><li>{t}</li></ul></div>")),
    ]
}

fn wrap_items(items: &[String]) -> String {
    items.iter().map(|i| format!("<li>{i}</li>")).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn list_type_is_preserved(
        items in prop::collection::vec(item_text(), 1..6),
        ordered in any::<bool>(),
    ) {
        let tag = if ordered { "ol" } else { "ul" };
        let doc = normalize(&format!("<{tag}>{}</{tag}>", wrap_items(&items)));
        let lists: Vec<bool> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::List { ordered, .. } => Some(*ordered),
                _ => None,
            })
            .collect();
        prop_assert_eq!(lists, vec![ordered]);
    }

    #[test]
    fn orphan_items_follow_their_list_style(
        items in prop::collection::vec(item_text(), 1..6),
        ordered in any::<bool>(),
    ) {
        let style = if ordered { "decimal" } else { "disc" };
        let raw: String = items
            .iter()
            .map(|i| format!("<li style=\"list-style-type:{style}\">{i}</li>"))
            .collect();
        let lists: Vec<bool> = normalize(&raw)
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::List { ordered, .. } => Some(*ordered),
                _ => None,
            })
            .collect();
        prop_assert_eq!(lists, vec![ordered]);
    }

    #[test]
    fn normalizing_normalized_markup_is_stable(
        blocks in prop::collection::vec(block_markup(), 0..8),
    ) {
        let raw = blocks.join("\n");
        let first = normalize(&raw);
        let second = normalize(&first.to_html());
        prop_assert_eq!(first, second);
    }
}
