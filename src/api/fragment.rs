//! Scanner for the reminder-list HTML fragments served by
//! `/calendar/reminders/<category>`.
//!
//! The fragment grammar is fixed by the server templates: a flat run of
//! `.reminder-item` elements, optionally followed by a `.show-more-btn`
//! affordance that must never be appended into the list. This is not a
//! general HTML parser.

/// One reminder entry extracted from a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub id: i64,
    pub category: Option<String>,
    pub text: String,
}

/// Extract reminder items from a fragment, dropping any embedded
/// affordance node. Items without a parseable `data-reminder-id` are
/// skipped; they could not be acknowledged anyway.
pub fn parse_reminder_fragment(html: &str) -> Vec<ReminderItem> {
    let mut items = Vec::new();

    let mut pos = 0;
    // Depth of the currently captured reminder-item subtree, if any.
    let mut item_depth: Option<usize> = None;
    // Depth of an excluded subtree (the affordance) inside an item.
    let mut skip_depth: Option<usize> = None;
    let mut depth = 0usize;
    let mut current: Option<(Option<i64>, Option<String>, String)> = None;

    while let Some(open) = html[pos..].find('<') {
        let open = pos + open;

        // Text run before this tag
        if let (Some(_), None, Some((_, _, text))) =
            (item_depth, skip_depth, current.as_mut())
        {
            text.push_str(&html[pos..open]);
        }

        let Some(close) = html[open..].find('>') else {
            break;
        };
        let close = open + close;
        let tag = &html[open + 1..close];
        pos = close + 1;

        if let Some(name) = tag.strip_prefix('/') {
            let name = name.trim();
            if !is_void(name) && depth > 0 {
                depth -= 1;
            }
            if skip_depth.is_some_and(|d| depth < d) {
                skip_depth = None;
            }
            if item_depth.is_some_and(|d| depth < d) {
                item_depth = None;
                if let Some((Some(id), category, text)) = current.take() {
                    items.push(ReminderItem {
                        id,
                        category,
                        text: collapse_whitespace(&text),
                    });
                }
                current = None;
            }
            continue;
        }

        if tag.starts_with('!') {
            continue;
        }

        let name = tag
            .split_whitespace()
            .next()
            .unwrap_or("")
            .trim_end_matches('/');
        let self_closing = tag.ends_with('/') || is_void(name);
        let class = attr_value(tag, "class").unwrap_or_default();

        if !self_closing {
            depth += 1;
        }

        if item_depth.is_none() && class.split_whitespace().any(|c| c == "reminder-item") {
            if self_closing {
                continue;
            }
            item_depth = Some(depth);
            current = Some((
                attr_value(tag, "data-reminder-id").and_then(|v| v.parse().ok()),
                attr_value(tag, "data-category"),
                String::new(),
            ));
            continue;
        }

        // Strip the affordance and any spinner markup nested in it.
        if item_depth.is_some()
            && skip_depth.is_none()
            && !self_closing
            && class.split_whitespace().any(|c| c == "show-more-btn")
        {
            skip_depth = Some(depth);
        }
    }

    items
}

/// Read the list total the server embeds on its affordance node
/// (`data-total`), when the fragment carries one.
pub fn affordance_total(html: &str) -> Option<usize> {
    let mut pos = 0;
    while let Some(open) = html[pos..].find('<') {
        let open = pos + open;
        let close = open + html[open..].find('>')?;
        let tag = &html[open + 1..close];
        pos = close + 1;
        if tag.starts_with('/') || tag.starts_with('!') {
            continue;
        }
        let class = attr_value(tag, "class").unwrap_or_default();
        if class.split_whitespace().any(|c| c == "show-more-btn") {
            return attr_value(tag, "data-total").and_then(|v| v.parse().ok());
        }
    }
    None
}

fn attr_value(tag: &str, name: &str) -> Option<String> {
    let needle = format!("{}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')? + start;
    Some(tag[start..end].to_string())
}

fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_items_with_id_category_and_text() {
        let html = r#"
            <div class="reminder-item" data-reminder-id="9" data-category="vet">
                <span class="reminder-title">Rex</span> vaccine booster due
                <button class="btn-complete"><i class="bi bi-check"></i></button>
            </div>
            <div class="reminder-item" data-reminder-id="12" data-category="vet">
                Luna dental cleaning
            </div>
        "#;
        let items = parse_reminder_fragment(html);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 9);
        assert_eq!(items[0].category.as_deref(), Some("vet"));
        assert_eq!(items[0].text, "Rex vaccine booster due");
        assert_eq!(items[1].id, 12);
        assert_eq!(items[1].text, "Luna dental cleaning");
    }

    #[test]
    fn strips_embedded_affordance() {
        let html = r#"
            <div class="reminder-item" data-reminder-id="3">Milo flea treatment</div>
            <button class="show-more-btn" data-total="12">Show 5 more</button>
        "#;
        let items = parse_reminder_fragment(html);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "Milo flea treatment");
    }

    #[test]
    fn affordance_text_nested_in_item_is_dropped() {
        let html = r#"
            <div class="reminder-item" data-reminder-id="3">
                Milo flea treatment
                <div class="show-more-btn"><span>Show less</span></div>
            </div>
        "#;
        let items = parse_reminder_fragment(html);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "Milo flea treatment");
    }

    #[test]
    fn affordance_total_reads_data_total() {
        let html = r#"
            <div class="reminder-item" data-reminder-id="3">Milo flea treatment</div>
            <button class="show-more-btn expanded" data-total="12">Show less</button>
        "#;
        assert_eq!(affordance_total(html), Some(12));
        assert_eq!(affordance_total("<div class=\"reminder-item\"></div>"), None);
    }

    #[test]
    fn empty_or_unparseable_fragments_yield_nothing() {
        assert!(parse_reminder_fragment("").is_empty());
        assert!(parse_reminder_fragment("   \n  ").is_empty());
        assert!(parse_reminder_fragment("<div class=\"empty-reminders\">none</div>").is_empty());
        // Item without an id cannot be acknowledged and is skipped
        assert!(parse_reminder_fragment("<div class=\"reminder-item\">x</div>").is_empty());
    }
}
