use std::cmp::Ordering;

use serde::Serialize;

pub const ITEMS_PER_PAGE: usize = 10;
pub const MAX_PAGE_BUTTONS: usize = 5;
pub const UNASSIGNED_GROUP: &str = "Unassigned";

#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_results: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

pub fn total_pages(total_results: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_results.div_ceil(page_size).max(1)
}

/// Slice one page out of `items`. The requested page is clamped into range.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, requested_page: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let current_page = requested_page.clamp(1, total_pages);
    let start = (current_page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    let page_items = if start < items.len() {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };
    Page {
        items: page_items,
        total_results: items.len(),
        total_pages,
        current_page,
    }
}

fn compare_group_keys(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

pub fn group_key(warband: &str) -> String {
    if warband.is_empty() {
        UNASSIGNED_GROUP.to_string()
    } else {
        warband.to_string()
    }
}

/// Bucket items by their exact warband string. Groups are ordered
/// case-insensitively, spellings that differ only in case keep first-seen
/// order, and item order is preserved inside each group.
pub fn group_by_warband<T, F>(items: Vec<T>, warband_of: F) -> Vec<(String, Vec<T>)>
where
    F: Fn(&T) -> &str,
{
    let mut groups: Vec<(String, Vec<T>)> = Vec::new();
    for item in items {
        let key = group_key(warband_of(&item));
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, bucket)) => bucket.push(item),
            None => groups.push((key, vec![item])),
        }
    }
    groups.sort_by(|(a, _), (b, _)| compare_group_keys(a, b));
    groups
}

/// Stable reorder so that items of one warband are contiguous, groups in
/// display order.
pub fn order_by_warband<T, F>(items: Vec<T>, warband_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    group_by_warband(items, warband_of)
        .into_iter()
        .flat_map(|(_, bucket)| bucket)
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageControl {
    Previous { disabled: bool },
    Page { number: usize, active: bool },
    Ellipsis,
    Next { disabled: bool },
}

/// Previous/Next plus a window of page links around the current page.
/// Nothing is rendered for a single page.
pub fn page_controls(total_pages: usize, current_page: usize) -> Vec<PageControl> {
    if total_pages <= 1 {
        return Vec::new();
    }
    let current = current_page.clamp(1, total_pages);
    let start = current.saturating_sub(MAX_PAGE_BUTTONS / 2).max(1);
    let end = (start + MAX_PAGE_BUTTONS - 1).min(total_pages);

    let mut out = vec![PageControl::Previous {
        disabled: current == 1,
    }];
    if start > 1 {
        out.push(PageControl::Page {
            number: 1,
            active: false,
        });
        if start > 2 {
            out.push(PageControl::Ellipsis);
        }
    }
    for number in start..=end {
        out.push(PageControl::Page {
            number,
            active: number == current,
        });
    }
    if end < total_pages {
        if end < total_pages - 1 {
            out.push(PageControl::Ellipsis);
        }
        out.push(PageControl::Page {
            number: total_pages,
            active: false,
        });
    }
    out.push(PageControl::Next {
        disabled: current == total_pages,
    });
    out
}

/// Page numbers among the controls, in order.
pub fn window_numbers(controls: &[PageControl]) -> Vec<usize> {
    controls
        .iter()
        .filter_map(|c| match c {
            PageControl::Page { number, .. } => Some(*number),
            _ => None,
        })
        .collect()
}
