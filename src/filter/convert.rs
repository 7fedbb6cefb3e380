//! Converters between the legacy flat filter list, the persisted row shapes,
//! and the canonical [`FilterTree`].

use tracing::warn;
use uuid::Uuid;

use super::model::{ConditionType, FilterConfig, FilterTree, Operator, ViewFilter, ViewFilterGroup};

/// Wrap a flat filter list into a single group.
///
/// An empty input yields the pass-through tree.
#[must_use]
pub fn filter_configs_to_tree(configs: &[FilterConfig], combine_as: ConditionType) -> FilterTree {
    if configs.is_empty() {
        return FilterTree::empty();
    }
    FilterTree::group(
        combine_as,
        configs.iter().cloned().map(FilterTree::leaf).collect(),
    )
}

/// Degrade a tree to the legacy flat list.
///
/// The flat shape cannot express OR grouping; when the tree carries real OR
/// semantics the leaves are returned as a best-effort AND list and the loss
/// is logged. Tree-aware consumers must not use this path.
#[must_use]
pub fn filter_tree_to_configs(tree: &FilterTree) -> Vec<FilterConfig> {
    if tree.has_or_semantics() {
        warn!("flattening a filter tree with OR groups to a flat list; grouping semantics are lost");
    }
    tree.leaves().into_iter().cloned().collect()
}

/// Reconstruct the canonical tree from persisted `view_filters` /
/// `view_filter_groups` rows.
///
/// Filters are bucketed under their `filter_group_id`; each non-empty bucket
/// becomes a sub-group with that group's condition type, and all sub-groups
/// are AND-combined with the ungrouped filters at the root. A filter whose
/// group row no longer exists is treated as ungrouped, and a filter with an
/// unknown operator string is dropped as a no-op; neither case fails the view.
#[must_use]
pub fn db_filters_to_tree(filters: &[ViewFilter], groups: &[ViewFilterGroup]) -> FilterTree {
    let mut ordered_filters: Vec<&ViewFilter> = filters.iter().collect();
    ordered_filters.sort_by_key(|f| f.order_index);

    let mut ordered_groups: Vec<&ViewFilterGroup> = groups.iter().collect();
    ordered_groups.sort_by_key(|g| g.order_index);

    let mut ungrouped: Vec<FilterTree> = Vec::new();
    let mut buckets: Vec<(&ViewFilterGroup, Vec<FilterTree>)> =
        ordered_groups.iter().map(|g| (*g, Vec::new())).collect();

    for filter in ordered_filters {
        let Some(leaf) = view_filter_to_config(filter) else {
            continue;
        };
        let leaf = FilterTree::leaf(leaf);
        match &filter.filter_group_id {
            Some(group_id) => {
                if let Some((_, bucket)) = buckets.iter_mut().find(|(g, _)| &g.id == group_id) {
                    bucket.push(leaf);
                } else {
                    // Orphaned group reference: fall back to ungrouped.
                    warn!(
                        filter_id = %filter.id,
                        group_id = %group_id,
                        "filter references a missing filter group; treating as ungrouped"
                    );
                    ungrouped.push(leaf);
                }
            }
            None => ungrouped.push(leaf),
        }
    }

    let mut children = ungrouped;
    for (group, bucket) in buckets {
        // A group with zero filters is dropped entirely.
        if !bucket.is_empty() {
            children.push(FilterTree::group(group.condition_type, bucket));
        }
    }

    if children.is_empty() {
        FilterTree::empty()
    } else {
        FilterTree::group(ConditionType::And, children)
    }
}

/// Convert a persisted filter row into a runtime condition.
///
/// Returns `None` when the operator string is unknown; the caller drops the
/// condition rather than failing.
#[must_use]
pub fn view_filter_to_config(filter: &ViewFilter) -> Option<FilterConfig> {
    match Operator::parse(&filter.operator) {
        Some(operator) => Some(FilterConfig::new(
            filter.field_name.clone(),
            operator,
            filter.value.clone(),
        )),
        None => {
            warn!(
                filter_id = %filter.id,
                operator = %filter.operator,
                "unknown filter operator; condition degrades to a no-op"
            );
            None
        }
    }
}

/// AND-combine several trees into one.
///
/// Empty inputs are pruned first; zero non-empty inputs yield the
/// pass-through tree and exactly one non-empty input is returned unwrapped,
/// so no needless nesting is introduced.
#[must_use]
pub fn and_filter_trees(trees: Vec<FilterTree>) -> FilterTree {
    let mut non_empty: Vec<FilterTree> = trees.into_iter().filter(|t| !t.is_empty()).collect();
    match non_empty.len() {
        0 => FilterTree::empty(),
        1 => match non_empty.pop() {
            Some(tree) => tree,
            None => FilterTree::empty(),
        },
        _ => FilterTree::group(ConditionType::And, non_empty),
    }
}

/// Decompose a tree into persisted `view_filters` / `view_filter_groups`
/// rows for a view.
///
/// The persisted shape is one level of grouping under an implicit AND root:
/// direct leaf children become ungrouped filters, direct group children
/// become group rows. Deeper nesting cannot be represented and is flattened
/// into the nearest group (logged, same constraint as the flat legacy shape).
#[must_use]
pub fn tree_to_db_filters(
    tree: &FilterTree,
    view_id: &str,
) -> (Vec<ViewFilter>, Vec<ViewFilterGroup>) {
    let mut filters = Vec::new();
    let mut groups = Vec::new();

    let children: Vec<&FilterTree> = match tree {
        FilterTree::Group { children, .. } => children.iter().collect(),
        leaf @ FilterTree::Leaf(_) => vec![leaf],
    };

    for child in children {
        match child {
            FilterTree::Leaf(config) => {
                push_filter_row(&mut filters, view_id, config, None);
            }
            FilterTree::Group {
                condition_type,
                children,
            } => {
                if children.iter().all(FilterTree::is_empty) {
                    continue;
                }
                let group_id = Uuid::new_v4().to_string();
                let order_index = i32::try_from(groups.len()).unwrap_or(i32::MAX);
                groups.push(ViewFilterGroup {
                    id: group_id.clone(),
                    view_id: view_id.to_string(),
                    condition_type: *condition_type,
                    order_index,
                });
                for leaf in child.leaves() {
                    push_filter_row(&mut filters, view_id, leaf, Some(&group_id));
                }
                if children.iter().any(|c| matches!(c, FilterTree::Group { .. })) {
                    warn!(
                        view_id = %view_id,
                        "nested filter groups flattened into their parent for persistence"
                    );
                }
            }
        }
    }

    (filters, groups)
}

fn push_filter_row(
    filters: &mut Vec<ViewFilter>,
    view_id: &str,
    config: &FilterConfig,
    group_id: Option<&str>,
) {
    let order_index = i32::try_from(filters.len()).unwrap_or(i32::MAX);
    filters.push(ViewFilter {
        id: Uuid::new_v4().to_string(),
        view_id: view_id.to_string(),
        field_name: config.field.clone(),
        operator: config.operator.as_str().to_string(),
        value: config.value.clone(),
        filter_group_id: group_id.map(ToString::to_string),
        order_index,
    });
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
