use horizon_core::{
    CreateGoal, CreateItem, Database, Frequency, GoalFilter, ItemStatus, MetricStrategy,
    RecurrenceRule, TrackerError, UpdateItemRequest, Weekday,
};
use jiff::civil::date;
use jiff::{civil, Timestamp};
use tempfile::NamedTempFile;

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

/// A fixed instant so tests control the clock.
fn fixed_now() -> Timestamp {
    "2025-01-06T12:00:00Z".parse().expect("valid timestamp")
}

/// The calendar day matching [`fixed_now`] (a Monday).
fn fixed_today() -> civil::Date {
    civil::date(2025, 1, 6)
}

fn plain_goal(title: &str) -> CreateGoal {
    CreateGoal {
        title: title.to_string(),
        ..Default::default()
    }
}

fn plain_item(goal_id: u64, title: &str) -> CreateItem {
    CreateItem {
        goal_id,
        title: title.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_database_initialization() {
    let (_temp_file, _db) = create_test_db();

    assert!(_temp_file.path().exists());
}

#[test]
fn test_create_and_get_goal() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(
            &CreateGoal {
                title: "Write a novel".to_string(),
                description: Some("80k words".to_string()),
                success_metric: Some("pages".to_string()),
                target_value: Some(300.0),
                ..Default::default()
            },
            fixed_today(),
            fixed_now(),
        )
        .expect("Failed to create goal");

    assert!(goal.id > 0);
    assert_eq!(goal.start_date, fixed_today());

    let retrieved = db
        .get_goal(goal.id)
        .expect("Failed to get goal")
        .expect("Goal should exist");
    assert_eq!(retrieved.title, "Write a novel");
    assert_eq!(retrieved.target_value, Some(300.0));
    assert!(retrieved.items.is_empty());
}

#[test]
fn test_metric_without_target_is_rejected() {
    let (_temp_file, mut db) = create_test_db();

    let result = db.create_goal(
        &CreateGoal {
            title: "Vague goal".to_string(),
            success_metric: Some("pages".to_string()),
            ..Default::default()
        },
        fixed_today(),
        fixed_now(),
    );

    assert!(matches!(result, Err(TrackerError::InvalidInput { .. })));
}

#[test]
fn test_create_item_defaults() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(&plain_goal("Goal"), fixed_today(), fixed_now())
        .expect("Failed to create goal");
    let item = db
        .create_item(&plain_item(goal.id, "First task"), fixed_today(), fixed_now())
        .expect("Failed to create item");

    assert_eq!(item.goal_id, goal.id);
    assert_eq!(item.status, ItemStatus::Todo);
    assert!(item.completion_date.is_none());
    assert!(item.recurrence_rule.is_none());
}

#[test]
fn test_toggle_couples_status_and_completion_date() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(&plain_goal("Goal"), fixed_today(), fixed_now())
        .expect("Failed to create goal");
    let item = db
        .create_item(&plain_item(goal.id, "Task"), fixed_today(), fixed_now())
        .expect("Failed to create item");

    let done = db.toggle_item(item.id, fixed_now()).expect("Failed to toggle");
    assert_eq!(done.status, ItemStatus::Done);
    assert_eq!(done.completion_date, Some(fixed_now()));

    // Invariant holds after read-back, not just on the returned value.
    let read_back = db
        .get_item(item.id)
        .expect("Failed to get item")
        .expect("Item should exist");
    assert_eq!(read_back.status, ItemStatus::Done);
    assert!(read_back.completion_date.is_some());

    // Toggling twice returns to the original status and nullity.
    let back = db.toggle_item(item.id, fixed_now()).expect("Failed to toggle");
    assert_eq!(back.status, ItemStatus::Todo);
    assert!(back.completion_date.is_none());

    let read_back = db
        .get_item(item.id)
        .expect("Failed to get item")
        .expect("Item should exist");
    assert!(read_back.completion_date.is_none());
}

#[test]
fn test_update_status_through_request() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(&plain_goal("Goal"), fixed_today(), fixed_now())
        .expect("Failed to create goal");
    let item = db
        .create_item(&plain_item(goal.id, "Task"), fixed_today(), fixed_now())
        .expect("Failed to create item");

    let updated = db
        .update_item(
            item.id,
            UpdateItemRequest {
                status: Some(ItemStatus::Done),
                ..Default::default()
            },
            fixed_now(),
        )
        .expect("Failed to update item");
    assert_eq!(updated.status, ItemStatus::Done);
    assert!(updated.completion_date.is_some());

    // Requesting the current status again must not churn the timestamp.
    let later = "2025-01-07T09:00:00Z".parse().unwrap();
    let unchanged = db
        .update_item(
            item.id,
            UpdateItemRequest {
                status: Some(ItemStatus::Done),
                ..Default::default()
            },
            later,
        )
        .expect("Failed to update item");
    assert_eq!(unchanged.completion_date, updated.completion_date);
}

#[test]
fn test_attach_rejects_cross_goal_parent() {
    let (_temp_file, mut db) = create_test_db();

    let goal_a = db
        .create_goal(&plain_goal("Goal A"), fixed_today(), fixed_now())
        .expect("Failed to create goal");
    let goal_b = db
        .create_goal(&plain_goal("Goal B"), fixed_today(), fixed_now())
        .expect("Failed to create goal");
    let item_a = db
        .create_item(&plain_item(goal_a.id, "In A"), fixed_today(), fixed_now())
        .expect("Failed to create item");
    let item_b = db
        .create_item(&plain_item(goal_b.id, "In B"), fixed_today(), fixed_now())
        .expect("Failed to create item");

    let result = db.attach_item(item_a.id, Some(item_b.id), fixed_now());
    assert!(matches!(result, Err(TrackerError::InvalidInput { .. })));

    // Tree unchanged.
    let read_back = db.get_item(item_a.id).unwrap().unwrap();
    assert!(read_back.parent_id.is_none());
}

#[test]
fn test_attach_rejects_cycles() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(&plain_goal("Goal"), fixed_today(), fixed_now())
        .expect("Failed to create goal");
    let root = db
        .create_item(&plain_item(goal.id, "Root"), fixed_today(), fixed_now())
        .unwrap();
    let child = db
        .create_item(
            &CreateItem {
                parent_id: Some(root.id),
                ..plain_item(goal.id, "Child")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let grandchild = db
        .create_item(
            &CreateItem {
                parent_id: Some(child.id),
                ..plain_item(goal.id, "Grandchild")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();

    // Attaching the root under its own grandchild would create a cycle.
    let result = db.attach_item(root.id, Some(grandchild.id), fixed_now());
    assert!(matches!(result, Err(TrackerError::InvalidInput { .. })));

    // Self-parenting is a cycle too.
    let result = db.attach_item(root.id, Some(root.id), fixed_now());
    assert!(matches!(result, Err(TrackerError::InvalidInput { .. })));

    // Tree unchanged.
    let read_back = db.get_item(root.id).unwrap().unwrap();
    assert!(read_back.parent_id.is_none());
}

#[test]
fn test_descendants_are_depth_first_parent_before_children() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(&plain_goal("Goal"), fixed_today(), fixed_now())
        .unwrap();
    let root = db
        .create_item(&plain_item(goal.id, "Root"), fixed_today(), fixed_now())
        .unwrap();
    let left = db
        .create_item(
            &CreateItem {
                parent_id: Some(root.id),
                ..plain_item(goal.id, "Left")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let right = db
        .create_item(
            &CreateItem {
                parent_id: Some(root.id),
                ..plain_item(goal.id, "Right")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let left_child = db
        .create_item(
            &CreateItem {
                parent_id: Some(left.id),
                ..plain_item(goal.id, "Left child")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();

    let descendants = db.descendants(root.id).expect("Failed to traverse");
    let ids: Vec<u64> = descendants.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![left.id, left_child.id, right.id]);

    // Traversal is restartable: a second call yields the same fresh walk.
    let again: Vec<u64> = db
        .descendants(root.id)
        .unwrap()
        .iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(ids, again);
}

#[test]
fn test_delete_subtree_spares_siblings_and_ancestors() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(&plain_goal("Goal"), fixed_today(), fixed_now())
        .unwrap();
    let root = db
        .create_item(&plain_item(goal.id, "Root"), fixed_today(), fixed_now())
        .unwrap();
    let doomed = db
        .create_item(
            &CreateItem {
                parent_id: Some(root.id),
                ..plain_item(goal.id, "Doomed")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let doomed_child = db
        .create_item(
            &CreateItem {
                parent_id: Some(doomed.id),
                ..plain_item(goal.id, "Doomed child")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let sibling = db
        .create_item(
            &CreateItem {
                parent_id: Some(root.id),
                ..plain_item(goal.id, "Sibling")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();

    let deleted = db
        .delete_subtree(doomed.id, fixed_now())
        .expect("Failed to delete subtree");
    assert_eq!(deleted, 2);

    assert!(db.get_item(doomed.id).unwrap().is_none());
    assert!(db.get_item(doomed_child.id).unwrap().is_none());
    assert!(db.get_item(root.id).unwrap().is_some());
    assert!(db.get_item(sibling.id).unwrap().is_some());
}

#[test]
fn test_delete_goal_cascades_to_all_items() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(&plain_goal("Goal"), fixed_today(), fixed_now())
        .unwrap();
    let a = db
        .create_item(&plain_item(goal.id, "A"), fixed_today(), fixed_now())
        .unwrap();
    let b = db
        .create_item(&plain_item(goal.id, "B"), fixed_today(), fixed_now())
        .unwrap();
    let c = db
        .create_item(&plain_item(goal.id, "C"), fixed_today(), fixed_now())
        .unwrap();
    let b1 = db
        .create_item(
            &CreateItem {
                parent_id: Some(b.id),
                ..plain_item(goal.id, "B1")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let b2 = db
        .create_item(
            &CreateItem {
                parent_id: Some(b.id),
                ..plain_item(goal.id, "B2")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();

    db.delete_goal(goal.id).expect("Failed to delete goal");

    for id in [a.id, b.id, c.id, b1.id, b2.id] {
        assert!(db.get_item(id).unwrap().is_none());
    }
    assert!(db.get_goal(goal.id).unwrap().is_none());
    assert!(db.list_goals(None).unwrap().is_empty());
}

#[test]
fn test_delete_missing_goal_fails() {
    let (_temp_file, mut db) = create_test_db();

    let result = db.delete_goal(99);
    assert!(matches!(result, Err(TrackerError::GoalNotFound { id: 99 })));
}

fn weekly_template(db: &mut Database, goal_id: u64) -> horizon_core::PlanItem {
    db.create_item(
        &CreateItem {
            due_date: Some(date(2025, 1, 6)),
            recurrence: Some(RecurrenceRule {
                frequency: Frequency::Weekly,
                interval: 1,
                by_weekday: Some(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]),
                day_of_month: None,
                until: None,
            }),
            ..plain_item(goal_id, "Workout")
        },
        fixed_today(),
        fixed_now(),
    )
    .expect("Failed to create template")
}

#[test]
fn test_materialize_occurrence_is_unique_per_pair() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(&plain_goal("Fitness"), fixed_today(), fixed_now())
        .unwrap();
    let template = weekly_template(&mut db, goal.id);

    let first = db
        .materialize_occurrence(template.id, date(2025, 1, 13), fixed_now())
        .expect("Failed to materialize");
    assert_eq!(first.template_id, Some(template.id));
    assert_eq!(first.occurrence_date, Some(date(2025, 1, 13)));
    assert_eq!(first.status, ItemStatus::Todo);

    // Toggle the stored record, then materialize the same pair again: the
    // second writer must reuse the first record, status included.
    db.toggle_item(first.id, fixed_now()).unwrap();
    let second = db
        .materialize_occurrence(template.id, date(2025, 1, 13), fixed_now())
        .expect("Failed to re-materialize");
    assert_eq!(second.id, first.id);
    assert_eq!(second.status, ItemStatus::Done);
}

#[test]
fn test_materialize_rejects_dates_off_the_rule() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(&plain_goal("Fitness"), fixed_today(), fixed_now())
        .unwrap();
    let template = weekly_template(&mut db, goal.id);

    // Jan 14 2025 is a Tuesday; the rule only generates Mon/Wed/Fri.
    let result = db.materialize_occurrence(template.id, date(2025, 1, 14), fixed_now());
    assert!(matches!(result, Err(TrackerError::InvalidInput { .. })));
}

#[test]
fn test_query_window_merges_stored_and_virtual() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(&plain_goal("Fitness"), fixed_today(), fixed_now())
        .unwrap();
    let template = weekly_template(&mut db, goal.id);
    db.create_item(
        &CreateItem {
            due_date: Some(date(2025, 1, 14)),
            ..plain_item(goal.id, "One-off errand")
        },
        fixed_today(),
        fixed_now(),
    )
    .unwrap();

    // Two weeks after the anchor week: 6 virtual occurrences + 1 stored.
    let window = db
        .query_window(None, date(2025, 1, 13), date(2025, 1, 26))
        .expect("Failed to query window");
    assert_eq!(window.len(), 7);
    assert_eq!(window.iter().filter(|o| o.is_virtual()).count(), 6);

    // Materializing one occurrence replaces its virtual twin on re-query.
    let stored = db
        .materialize_occurrence(template.id, date(2025, 1, 13), fixed_now())
        .unwrap();
    let window = db
        .query_window(None, date(2025, 1, 13), date(2025, 1, 26))
        .expect("Failed to query window");
    assert_eq!(window.len(), 7);
    assert_eq!(window.iter().filter(|o| o.is_virtual()).count(), 5);
    let stored_entries: Vec<_> = window
        .iter()
        .filter(|o| o.item().template_id == Some(template.id) && !o.is_virtual())
        .collect();
    assert_eq!(stored_entries.len(), 1);
    assert_eq!(stored_entries[0].item().id, stored.id);

    // The template row itself never shows up as a window entry.
    assert!(window.iter().all(|o| o.item().id != template.id));
}

#[test]
fn test_window_orders_todo_by_due_date_then_priority() {
    let (_temp_file, mut db) = create_test_db();

    let urgent = db
        .create_goal(
            &CreateGoal {
                priority: Some(1),
                ..plain_goal("Urgent goal")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let relaxed = db
        .create_goal(
            &CreateGoal {
                priority: Some(4),
                ..plain_goal("Relaxed goal")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();

    let relaxed_early = db
        .create_item(
            &CreateItem {
                due_date: Some(date(2025, 1, 7)),
                ..plain_item(relaxed.id, "Relaxed early")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let urgent_late = db
        .create_item(
            &CreateItem {
                due_date: Some(date(2025, 1, 9)),
                ..plain_item(urgent.id, "Urgent late")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let relaxed_late = db
        .create_item(
            &CreateItem {
                due_date: Some(date(2025, 1, 9)),
                ..plain_item(relaxed.id, "Relaxed late")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let done_early = db
        .create_item(
            &CreateItem {
                due_date: Some(date(2025, 1, 7)),
                ..plain_item(urgent.id, "Already done")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    db.toggle_item(done_early.id, fixed_now()).unwrap();

    let window = db
        .query_window(None, date(2025, 1, 6), date(2025, 1, 12))
        .expect("Failed to query window");
    let ids: Vec<u64> = window.iter().map(|o| o.item().id).collect();

    // Todo first ordered by due date then goal priority; done trails.
    assert_eq!(
        ids,
        vec![relaxed_early.id, urgent_late.id, relaxed_late.id, done_early.id]
    );
    assert_eq!(window.last().unwrap().status(), ItemStatus::Done);
}

#[test]
fn test_completed_count_strategy_updates_goal_value() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(
            &CreateGoal {
                success_metric: Some("tasks".to_string()),
                target_value: Some(10.0),
                metric_strategy: MetricStrategy::CompletedCount,
                ..plain_goal("Ship it")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let a = db
        .create_item(&plain_item(goal.id, "A"), fixed_today(), fixed_now())
        .unwrap();
    let b = db
        .create_item(&plain_item(goal.id, "B"), fixed_today(), fixed_now())
        .unwrap();

    db.toggle_item(a.id, fixed_now()).unwrap();
    db.toggle_item(b.id, fixed_now()).unwrap();

    let goal = db.get_goal(goal.id).unwrap().unwrap();
    assert_eq!(goal.current_value, 2.0);
    assert_eq!(goal.progress_ratio(), Some(0.2));

    // Un-completing rolls the value back.
    db.toggle_item(b.id, fixed_now()).unwrap();
    let goal = db.get_goal(goal.id).unwrap().unwrap();
    assert_eq!(goal.current_value, 1.0);
}

#[test]
fn test_effort_sum_strategy_updates_goal_value() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(
            &CreateGoal {
                success_metric: Some("minutes".to_string()),
                target_value: Some(600.0),
                metric_strategy: MetricStrategy::EffortSum,
                ..plain_goal("Deep work")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let a = db
        .create_item(
            &CreateItem {
                effort: Some(30),
                ..plain_item(goal.id, "A")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    let b = db
        .create_item(
            &CreateItem {
                effort: Some(45),
                ..plain_item(goal.id, "B")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();

    db.toggle_item(a.id, fixed_now()).unwrap();
    db.toggle_item(b.id, fixed_now()).unwrap();

    let goal = db.get_goal(goal.id).unwrap().unwrap();
    assert_eq!(goal.current_value, 75.0);
}

#[test]
fn test_archived_goals_hide_from_default_summaries() {
    let (_temp_file, mut db) = create_test_db();

    let keep = db
        .create_goal(&plain_goal("Keep"), fixed_today(), fixed_now())
        .unwrap();
    let hide = db
        .create_goal(&plain_goal("Hide"), fixed_today(), fixed_now())
        .unwrap();

    db.archive_goal(hide.id, fixed_now())
        .expect("Failed to archive")
        .expect("Goal should exist");

    let summaries = db.list_goal_summaries(None).unwrap();
    let ids: Vec<u64> = summaries.iter().map(|s| s.id).collect();
    assert!(ids.contains(&keep.id));
    assert!(!ids.contains(&hide.id));

    let all = db
        .list_goal_summaries(Some(&GoalFilter {
            include_archived: true,
            ..Default::default()
        }))
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn test_window_rollup_counts() {
    let (_temp_file, mut db) = create_test_db();

    let goal = db
        .create_goal(&plain_goal("Goal"), fixed_today(), fixed_now())
        .unwrap();
    let a = db
        .create_item(
            &CreateItem {
                due_date: Some(date(2025, 1, 6)),
                ..plain_item(goal.id, "A")
            },
            fixed_today(),
            fixed_now(),
        )
        .unwrap();
    db.create_item(
        &CreateItem {
            due_date: Some(date(2025, 1, 7)),
            ..plain_item(goal.id, "B")
        },
        fixed_today(),
        fixed_now(),
    )
    .unwrap();
    db.toggle_item(a.id, fixed_now()).unwrap();

    let window = db
        .query_window(Some(goal.id), date(2025, 1, 6), date(2025, 1, 12))
        .unwrap();
    let rollup = horizon_core::WindowRollup::from_occurrences(
        date(2025, 1, 6),
        date(2025, 1, 12),
        &window,
    );
    assert_eq!(rollup.total, 2);
    assert_eq!(rollup.done, 1);
    assert_eq!(rollup.todo, 1);
}
