//! Server-side row height estimation.
//!
//! The windowed renderer needs a size for every row before it has been
//! measured. These estimates are computed once at read time and shipped with
//! each item, so the client never renders a zero-height placeholder.

use crate::item::ItemKind;

const BASE_HEIGHT: u32 = 60;
const LINE_HEIGHT: u32 = 20;
const CHARS_PER_LINE: usize = 80;
const ATTACHMENT_EXTRA: u32 = 80;
const SYSTEM_HEIGHT: u32 = 40;
const THREAD_INDENT_EXTRA: u32 = 20;
const PARENT_PREVIEW_EXTRA: u32 = 30;
const MIN_HEIGHT: u32 = 40;

#[derive(Clone, Copy, Debug)]
pub struct EstimateInput<'a> {
    pub content: &'a str,
    pub kind: ItemKind,
    pub thread_level: u8,
    pub has_parent_preview: bool,
}

/// Estimates the rendered height of one item, in pixels.
pub fn estimate_height(input: &EstimateInput<'_>) -> u32 {
    // System rows render as a fixed-height divider regardless of content.
    if input.kind == ItemKind::System {
        return SYSTEM_HEIGHT;
    }

    let lines = input.content.chars().count().div_ceil(CHARS_PER_LINE);
    let mut height = BASE_HEIGHT + LINE_HEIGHT * lines as u32;

    if input.kind == ItemKind::Attachment {
        height += ATTACHMENT_EXTRA;
    }
    height += THREAD_INDENT_EXTRA * input.thread_level as u32;
    if input.has_parent_preview {
        height += PARENT_PREVIEW_EXTRA;
    }

    height.max(MIN_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: &str) -> u32 {
        estimate_height(&EstimateInput {
            content,
            kind: ItemKind::Text,
            thread_level: 0,
            has_parent_preview: false,
        })
    }

    #[test]
    fn short_text_gets_base_plus_one_line() {
        assert_eq!(text("hi"), 80);
    }

    #[test]
    fn line_count_rounds_up() {
        assert_eq!(text(&"x".repeat(80)), 80);
        assert_eq!(text(&"x".repeat(81)), 100);
        assert_eq!(text(&"x".repeat(160)), 100);
    }

    #[test]
    fn empty_content_is_base_height() {
        assert_eq!(text(""), 60);
    }

    #[test]
    fn attachment_adds_fixed_extra() {
        let h = estimate_height(&EstimateInput {
            content: "photo",
            kind: ItemKind::Attachment,
            thread_level: 0,
            has_parent_preview: false,
        });
        assert_eq!(h, 80 + 80);
    }

    #[test]
    fn system_height_is_flat_and_content_independent() {
        for content in ["", "joined", &"x".repeat(4_000)] {
            let h = estimate_height(&EstimateInput {
                content,
                kind: ItemKind::System,
                thread_level: 0,
                has_parent_preview: false,
            });
            assert_eq!(h, 40);
        }
    }

    #[test]
    fn thread_level_and_preview_add_up() {
        let h = estimate_height(&EstimateInput {
            content: "reply",
            kind: ItemKind::Text,
            thread_level: 1,
            has_parent_preview: true,
        });
        assert_eq!(h, 60 + 20 + 20 + 30);
    }

    #[test]
    fn estimate_never_drops_below_floor() {
        for kind in [ItemKind::Text, ItemKind::Attachment, ItemKind::System] {
            let h = estimate_height(&EstimateInput {
                content: "",
                kind,
                thread_level: 0,
                has_parent_preview: false,
            });
            assert!(h >= 40);
        }
    }
}
