//! Renderer-facing row assembly and ordering
//!
//! The core hands the renderer an ordered sequence of [`Row`]s; the
//! binary only draws them. Sorting, head/tail truncation, sum footers
//! and the brief-mode line list all live here so they can be tested
//! without a terminal.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::diff::{container_diff, mebibytes};
use crate::filter::RowFilter;
use crate::join::JoinedPod;
use crate::models::Mode;

/// Sentinel shown in the mode column when a pod has no recommendation.
pub const NO_DATA: &str = "---";

/// One report row: a single container of a single running pod.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub namespace: String,
    pub name: String,
    pub mode: Option<Mode>,
    /// False when the pod had no recommendation at all; the mode column
    /// then shows the no-data sentinel.
    pub has_recommendation: bool,
    pub container: String,
    pub requested_cpu: i64,
    pub recommended_cpu: Option<i64>,
    pub cpu_diff: Option<i64>,
    pub requested_mib: f64,
    pub recommended_mib: Option<f64>,
    pub memory_diff: Option<i64>,
    pub combined: Option<i64>,
}

impl Row {
    /// Text for the mode column.
    pub fn mode_label(&self) -> String {
        if !self.has_recommendation {
            NO_DATA.to_string()
        } else {
            self.mode.map(|m| m.to_string()).unwrap_or_default()
        }
    }

    /// Value of a 1-based column, for sorting.
    fn cell(&self, column: usize) -> Cell {
        match column {
            1 => Cell::Text(self.namespace.clone()),
            2 => Cell::Text(self.name.clone()),
            3 => Cell::Text(self.mode_label()),
            4 => Cell::Text(self.container.clone()),
            5 => Cell::Number(self.requested_cpu as f64),
            6 => opt_number(self.recommended_cpu.map(|v| v as f64)),
            7 => opt_number(self.cpu_diff.map(|v| v as f64)),
            8 => Cell::Number(self.requested_mib),
            9 => opt_number(self.recommended_mib),
            10 => opt_number(self.memory_diff.map(|v| v as f64)),
            11 => opt_number(self.combined.map(|v| v as f64)),
            _ => Cell::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

fn opt_number(v: Option<f64>) -> Cell {
    v.map(Cell::Number).unwrap_or(Cell::Missing)
}

impl Cell {
    // Missing sorts before any value; numbers and text never mix
    // within one column.
    fn compare(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Missing, Cell::Missing) => Ordering::Equal,
            (Cell::Missing, _) => Ordering::Less,
            (_, Cell::Missing) => Ordering::Greater,
            (Cell::Number(a), Cell::Number(b)) => a.total_cmp(b),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            (Cell::Text(_), Cell::Number(_)) => Ordering::Greater,
            (Cell::Number(_), Cell::Text(_)) => Ordering::Less,
        }
    }
}

/// Sort and truncation parameters.
#[derive(Debug, Clone, Default)]
pub struct SortSpec {
    /// 1-based column indexes; a negative index sorts descending.
    /// Empty means the default (namespace, name, container).
    pub columns: Vec<i32>,
    pub head: Option<usize>,
    pub tail: Option<usize>,
}

/// Default sort columns: namespace, workload/pod name, container.
const DEFAULT_SORT: [i32; 3] = [1, 2, 4];

/// Build the filtered row sequence from joined pods.
pub fn assemble_rows(pods: &[JoinedPod], filter: &RowFilter) -> Vec<Row> {
    let mut rows = Vec::new();

    for pod in pods {
        let mode = pod.recommendation.as_ref().and_then(|m| m.mode);
        for container in &pod.containers {
            if !filter.includes(pod.full_match(container), mode) {
                continue;
            }

            let d = container_diff(container);
            rows.push(Row {
                namespace: pod.namespace.clone(),
                name: pod.name.clone(),
                mode,
                has_recommendation: pod.recommendation.is_some(),
                container: container.name.clone(),
                requested_cpu: container.cpu_milli,
                recommended_cpu: container.target.map(|t| t.cpu_milli),
                cpu_diff: d.cpu,
                requested_mib: mebibytes(container.memory_bytes),
                recommended_mib: container.target.map(|t| mebibytes(t.memory_bytes)),
                memory_diff: d.memory,
                combined: d.combined(),
            });
        }
    }

    rows
}

/// Sort rows and apply head-then-tail truncation.
pub fn order_rows(mut rows: Vec<Row>, spec: &SortSpec) -> Vec<Row> {
    let columns: &[i32] = if spec.columns.is_empty() {
        &DEFAULT_SORT
    } else {
        &spec.columns
    };

    rows.sort_by(|a, b| {
        for &col in columns {
            let descending = col < 0;
            let index = col.unsigned_abs() as usize;
            let mut ord = a.cell(index).compare(&b.cell(index));
            if descending {
                ord = ord.reverse();
            }
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    if let Some(head) = spec.head {
        rows.truncate(head);
    }
    if let Some(tail) = spec.tail {
        if rows.len() > tail {
            rows.drain(..rows.len() - tail);
        }
    }

    rows
}

/// Sums for the numeric value columns, used as optional table footers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColumnSums {
    pub requested_cpu: i64,
    pub recommended_cpu: i64,
    pub requested_mib: f64,
    pub recommended_mib: f64,
}

pub fn column_sums(rows: &[Row]) -> ColumnSums {
    let mut sums = ColumnSums::default();
    for row in rows {
        sums.requested_cpu += row.requested_cpu;
        sums.recommended_cpu += row.recommended_cpu.unwrap_or(0);
        sums.requested_mib += row.requested_mib;
        sums.recommended_mib += row.recommended_mib.unwrap_or(0.0);
    }
    sums
}

/// Brief-mode output: deduplicated `namespace/workload` lines in
/// insertion order, preferring the matched recommendation's target
/// name, then the pod's owner name, then the bare pod name.
pub fn brief_lines(pods: &[JoinedPod], filter: &RowFilter) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut lines = Vec::new();

    for pod in pods {
        let mode = pod.recommendation.as_ref().and_then(|m| m.mode);
        for container in &pod.containers {
            if !filter.includes(pod.full_match(container), mode) {
                continue;
            }

            let name = pod
                .recommendation
                .as_ref()
                .map(|m| m.name.as_str())
                .or(pod.owner_name.as_deref())
                .unwrap_or(&pod.name);
            let line = format!("{}/{}", pod.namespace, name);
            if seen.insert(line.clone()) {
                lines.push(line);
            }
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::{JoinedContainer, JoinedPod, WorkloadMatch};
    use crate::models::ContainerTarget;

    fn joined(namespace: &str, name: &str, container: &str, matched: bool) -> JoinedPod {
        JoinedPod {
            name: name.to_string(),
            namespace: namespace.to_string(),
            owner_name: Some(format!("{name}-owner")),
            recommendation: matched.then(|| WorkloadMatch {
                name: format!("{name}-workload"),
                mode: Some(Mode::Auto),
            }),
            containers: vec![JoinedContainer {
                name: container.to_string(),
                cpu_milli: 150,
                memory_bytes: 2 * 1_048_576,
                target: matched.then_some(ContainerTarget {
                    cpu_milli: 100,
                    memory_bytes: 1_048_576,
                }),
            }],
        }
    }

    fn passthrough() -> RowFilter {
        RowFilter::new(&[], false, true)
    }

    #[test]
    fn rows_carry_diffs_and_mib_values() {
        let pods = vec![joined("ns", "web", "app", true)];
        let rows = assemble_rows(&pods, &passthrough());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.cpu_diff, Some(50));
        assert_eq!(row.memory_diff, Some(100));
        assert_eq!(row.combined, Some(150));
        assert_eq!(row.requested_mib, 2.0);
        assert_eq!(row.recommended_mib, Some(1.0));
        assert_eq!(row.mode_label(), "Auto");
    }

    #[test]
    fn unmatched_pod_shows_no_data_sentinel_under_all_pods() {
        let pods = vec![joined("ns", "web", "app", false)];
        let rows = assemble_rows(&pods, &passthrough());
        assert_eq!(rows[0].mode_label(), NO_DATA);
        assert_eq!(rows[0].recommended_cpu, None);
        assert_eq!(rows[0].cpu_diff, None);
    }

    #[test]
    fn unmatched_pod_is_excluded_by_default() {
        let pods = vec![joined("ns", "web", "app", false)];
        let rows = assemble_rows(&pods, &RowFilter::new(&[], false, false));
        assert!(rows.is_empty());
    }

    #[test]
    fn default_sort_is_namespace_name_container() {
        let pods = vec![
            joined("b", "x", "c1", true),
            joined("a", "y", "c2", true),
            joined("a", "x", "c9", true),
            joined("a", "x", "c0", true),
        ];
        let rows = order_rows(assemble_rows(&pods, &passthrough()), &SortSpec::default());
        let order: Vec<_> = rows
            .iter()
            .map(|r| format!("{}/{}/{}", r.namespace, r.name, r.container))
            .collect();
        assert_eq!(order, ["a/x/c0", "a/x/c9", "a/y/c2", "b/x/c1"]);
    }

    #[test]
    fn negative_column_sorts_descending() {
        let pods = vec![joined("a", "x", "c", true), joined("b", "x", "c", true)];
        let spec = SortSpec {
            columns: vec![-1],
            ..Default::default()
        };
        let rows = order_rows(assemble_rows(&pods, &passthrough()), &spec);
        assert_eq!(rows[0].namespace, "b");
        assert_eq!(rows[1].namespace, "a");
    }

    #[test]
    fn head_then_tail_truncation() {
        let pods = vec![
            joined("a", "p1", "c", true),
            joined("b", "p2", "c", true),
            joined("c", "p3", "c", true),
        ];
        let spec = SortSpec {
            columns: vec![],
            head: Some(2),
            tail: Some(1),
        };
        let rows = order_rows(assemble_rows(&pods, &passthrough()), &spec);
        // Head keeps (a, b); tail keeps the last of those two.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].namespace, "b");
    }

    #[test]
    fn sums_cover_the_value_columns() {
        let pods = vec![joined("a", "p1", "c", true), joined("b", "p2", "c", false)];
        let sums = column_sums(&assemble_rows(&pods, &passthrough()));
        assert_eq!(sums.requested_cpu, 300);
        assert_eq!(sums.recommended_cpu, 100);
        assert_eq!(sums.requested_mib, 4.0);
        assert_eq!(sums.recommended_mib, 1.0);
    }

    #[test]
    fn brief_lines_dedupe_in_insertion_order() {
        let mut twin = joined("ns", "web", "app", true);
        twin.name = "web-2".to_string();
        twin.recommendation = Some(WorkloadMatch {
            name: "web-workload".to_string(),
            mode: Some(Mode::Auto),
        });
        let pods = vec![
            joined("ns", "web", "app", true),
            twin,
            joined("ns", "solo", "app", false),
        ];
        let lines = brief_lines(&pods, &passthrough());
        assert_eq!(lines, ["ns/web-workload", "ns/solo-owner"]);
    }

    #[test]
    fn brief_falls_back_to_pod_name_without_owner() {
        let mut pod = joined("ns", "bare", "app", false);
        pod.owner_name = None;
        let lines = brief_lines(&[pod], &passthrough());
        assert_eq!(lines, ["ns/bare"]);
    }
}
