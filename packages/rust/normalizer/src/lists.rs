//! Grouping of loose list items (Word list paragraphs, orphan `<li>`) into lists.

use resolvekit_shared::{Block, ListItem};

/// Intermediate walker output: finished blocks plus list items that still
/// need to be grouped with their neighbours.
#[derive(Debug, Clone)]
pub(crate) enum Draft {
    Block(Block),
    LooseItem {
        ordered: bool,
        level: u32,
        item: ListItem,
    },
}

/// Fold consecutive loose items into lists.
///
/// A change of list type starts a new list rather than flipping the current
/// one. Items nested deeper than level 1 become details of the previous item.
pub(crate) fn group(drafts: Vec<Draft>) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(drafts.len());
    let mut current: Option<(bool, Vec<ListItem>)> = None;

    for draft in drafts {
        match draft {
            Draft::Block(block) => {
                close(&mut current, &mut blocks);
                blocks.push(block);
            }
            Draft::LooseItem {
                ordered,
                level,
                item,
            } => {
                if level > 1 {
                    if let Some((_, items)) = current.as_mut() {
                        if let Some(last) = items.last_mut() {
                            last.details.push(item.text);
                            last.details.extend(item.details);
                            continue;
                        }
                    }
                }
                match current.as_mut() {
                    Some((kind, items)) if *kind == ordered => items.push(item),
                    _ => {
                        close(&mut current, &mut blocks);
                        current = Some((ordered, vec![item]));
                    }
                }
            }
        }
    }
    close(&mut current, &mut blocks);
    blocks
}

fn close(current: &mut Option<(bool, Vec<ListItem>)>, blocks: &mut Vec<Block>) {
    if let Some((ordered, items)) = current.take() {
        blocks.push(Block::List { ordered, items });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvekit_shared::Span;

    fn loose(ordered: bool, level: u32, text: &str) -> Draft {
        Draft::LooseItem {
            ordered,
            level,
            item: ListItem::new(text),
        }
    }

    #[test]
    fn consecutive_items_form_one_list() {
        let blocks = group(vec![loose(true, 1, "a"), loose(true, 1, "b")]);
        assert_eq!(
            blocks,
            vec![Block::List {
                ordered: true,
                items: vec![ListItem::new("a"), ListItem::new("b")],
            }]
        );
    }

    #[test]
    fn type_change_splits_instead_of_flipping() {
        let blocks = group(vec![loose(true, 1, "a"), loose(false, 1, "b")]);
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0], Block::List { ordered: true, .. }));
        assert!(matches!(blocks[1], Block::List { ordered: false, .. }));
    }

    #[test]
    fn deeper_levels_become_details() {
        let blocks = group(vec![loose(false, 1, "parent"), loose(false, 2, "child")]);
        let Block::List { items, .. } = &blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].details, vec!["child".to_string()]);
    }

    #[test]
    fn block_between_items_closes_list() {
        let para = Draft::Block(Block::Paragraph {
            spans: vec![Span::plain("between")],
        });
        let blocks = group(vec![loose(false, 1, "a"), para, loose(false, 1, "b")]);
        assert_eq!(blocks.len(), 3);
    }
}
