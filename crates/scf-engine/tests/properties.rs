use proptest::prelude::*;
use scf_engine::coverage::{self, overlap, CoverageIndex, Subject};
use scf_engine::timeline::{assign_new_controls, DragMode, MonthWindow, Timeline, WindowMode};
use scf_engine::FilterSpec;
use scf_model::{Catalog, CoreLevel, FilterKey, Framework, ScfControl, ScfMapping};
use std::collections::BTreeSet;

fn arb_control(index: usize) -> impl Strategy<Value = ScfControl> {
    (
        0i32..=10,
        prop::collection::vec(any::<bool>(), Framework::ALL.len()),
        prop::collection::vec(any::<bool>(), CoreLevel::ALL.len()),
        prop::collection::vec(0usize..6, 0..4),
    )
        .prop_map(move |(weight, fws, lvls, risks)| {
            let mut control = ScfControl::new(format!("C-{index:02}")).with_weight(weight);
            for (fw, on) in Framework::ALL.iter().zip(fws) {
                if on {
                    control = control.with_framework(*fw);
                }
            }
            for (lvl, on) in CoreLevel::ALL.iter().zip(lvls) {
                if on {
                    control = control.with_core(*lvl);
                }
            }
            control.risk_threat_summary = risks
                .iter()
                .map(|r| format!("R-{r}"))
                .collect::<Vec<_>>()
                .join("\n");
            control
        })
}

fn arb_catalog() -> impl Strategy<Value = Catalog> {
    (1usize..12)
        .prop_flat_map(|n| (0..n).map(arb_control).collect::<Vec<_>>())
        .prop_map(|controls| {
            let mappings = controls
                .iter()
                .flat_map(|c| {
                    c.frameworks()
                        .map(|fw| ScfMapping::new(fw.mapping_name(), "X", c.object_id.clone()))
                        .collect::<Vec<_>>()
                })
                .collect();
            let risks = (0..6).map(|r| scf_model::ScfRisk::new(format!("R-{r}"))).collect();
            Catalog::new()
                .with_controls(controls)
                .with_mappings(mappings)
                .with_risks(risks)
        })
}

fn arb_filter() -> impl Strategy<Value = FilterSpec> {
    (
        0i32..=10,
        prop::sample::subsequence(Framework::ALL.to_vec(), 0..3),
        prop::sample::subsequence(CoreLevel::ALL.to_vec(), 0..2),
    )
        .prop_map(|(w, fws, lvls)| {
            let mut spec = FilterSpec::new().with_min_weight(w);
            for fw in fws {
                spec = spec.with_coverage(fw);
            }
            for lvl in lvls {
                spec = spec.with_core(lvl);
            }
            spec
        })
}

fn all_keys() -> Vec<FilterKey> {
    Framework::ALL
        .iter()
        .map(|fw| FilterKey::Framework(*fw))
        .chain(CoreLevel::ALL.iter().map(|lvl| FilterKey::Core(*lvl)))
        .collect()
}

#[derive(Debug, Clone)]
enum Reorder {
    SetOrder(Vec<usize>),
    MoveRow(usize, usize),
}

fn arb_reorder() -> impl Strategy<Value = Reorder> {
    prop_oneof![
        prop::collection::vec(0usize..16, 0..6).prop_map(Reorder::SetOrder),
        (0usize..16, 0usize..12).prop_map(|(key, to)| Reorder::MoveRow(key, to)),
    ]
}

proptest! {
    #[test]
    fn filtered_controls_respect_weight_and_flags(catalog in arb_catalog(), spec in arb_filter()) {
        for control in spec.apply(catalog.controls()) {
            prop_assert!(control.weight >= spec.min_weight);
            let keys: Vec<FilterKey> = spec.flag_keys().collect();
            prop_assert!(keys.is_empty() || keys.iter().any(|k| control.satisfies(*k)));
        }
    }

    #[test]
    fn coverage_ratios_are_bounded(
        catalog in arb_catalog(),
        picks in prop::collection::vec(any::<bool>(), 12),
    ) {
        let selected: BTreeSet<String> = catalog
            .controls()
            .iter()
            .zip(picks)
            .filter(|(_, on)| *on)
            .map(|(c, _)| c.object_id.clone())
            .collect();
        let index = CoverageIndex::new(&catalog);
        let report = coverage::compute(&catalog, &index, &selected, 3);

        for fw in &report.frameworks {
            prop_assert!(fw.selected_mapped <= fw.mapped);
            prop_assert!((0.0..=1.0).contains(&fw.ratio));
        }
        prop_assert!((0.0..=1.0).contains(&report.risks.ratio));
        prop_assert!(report.risks.referenced <= report.risks.total);
    }

    #[test]
    fn overlap_percentages_are_bounded(catalog in arb_catalog(), a in 0usize..7, b in 0usize..4) {
        let result = overlap(
            &catalog,
            Subject::Framework(Framework::ALL[a]),
            Subject::Core(CoreLevel::ALL[b]),
        );
        prop_assert!((0.0..=100.0).contains(&result.a_covers_b_percent));
        prop_assert!((0.0..=100.0).contains(&result.b_covers_a_percent));
        let smaller = result.subject_a_controls.min(result.subject_b_controls);
        prop_assert!(result.intersection_controls <= smaller);
    }

    #[test]
    fn drags_keep_windows_ordered(
        start in 0u32..20,
        width in 1u32..10,
        drags in prop::collection::vec((0u8..3, -30i32..30), 1..20),
    ) {
        let key = FilterKey::Framework(Framework::Soc2);
        let mut timeline = Timeline::default();
        timeline.set_windows(WindowMode::Merge, &[(key, MonthWindow::new(start, start + width))]);

        for (mode, delta) in drags {
            let mode = match mode {
                0 => DragMode::ResizeStart,
                1 => DragMode::ResizeEnd,
                _ => DragMode::Move,
            };
            let window = timeline.drag(key, mode, delta).unwrap();
            prop_assert!(window.end_month > window.start_month);
            prop_assert!(window.end_month <= timeline.axis_months());
        }
    }

    #[test]
    fn new_controls_partition_goal_union(catalog in arb_catalog(), spec in arb_filter()) {
        let selected: BTreeSet<String> =
            catalog.controls().iter().map(|c| c.object_id.clone()).collect();
        let flags: Vec<FilterKey> = spec.flag_keys().collect();
        let mut timeline = Timeline::default();
        let mut goals = timeline.plan(&flags, &catalog, &selected);
        assign_new_controls(&mut goals);

        let union: BTreeSet<&String> = goals.iter().flat_map(|g| &g.control_ids).collect();
        let mut claimed: BTreeSet<&String> = BTreeSet::new();
        for goal in &goals {
            prop_assert!(!goal.control_ids.is_empty());
            for id in &goal.new_control_ids {
                prop_assert!(claimed.insert(id));
            }
        }
        prop_assert_eq!(claimed, union);
    }

    #[test]
    fn reordering_keeps_goal_rows_a_permutation(
        catalog in arb_catalog(),
        before in arb_filter(),
        after in arb_filter(),
        edits in prop::collection::vec(arb_reorder(), 0..8),
    ) {
        let keys = all_keys();
        let selected: BTreeSet<String> =
            catalog.controls().iter().map(|c| c.object_id.clone()).collect();
        let mut timeline = Timeline::default();
        timeline.plan(&before.flag_keys().collect::<Vec<_>>(), &catalog, &selected);

        for edit in edits {
            match edit {
                Reorder::SetOrder(picks) => {
                    let named: Vec<FilterKey> =
                        picks.iter().map(|i| keys[i % keys.len()]).collect();
                    timeline.set_order(&named);
                }
                Reorder::MoveRow(key, to) => {
                    let _ = timeline.move_row(keys[key % keys.len()], to);
                }
            }
        }

        let goals = timeline.plan(&after.flag_keys().collect::<Vec<_>>(), &catalog, &selected);
        let goal_keys: BTreeSet<FilterKey> = goals.iter().map(|g| g.key).collect();
        let order = timeline.order();
        let unique: BTreeSet<FilterKey> = order.iter().copied().collect();
        prop_assert_eq!(unique.len(), order.len());
        prop_assert_eq!(unique, goal_keys);
        prop_assert_eq!(goals.len(), order.len());
    }
}
