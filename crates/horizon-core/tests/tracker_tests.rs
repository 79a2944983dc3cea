use std::path::PathBuf;

use horizon_core::{
    params::{CreateGoal, CreateItem, DeleteGoal, Id, QueryWindow, ToggleOccurrence},
    Frequency, ItemStatus, MetricStrategy, RecurrenceRule, TrackerBuilder, Weekday,
};
use jiff::civil::date;
use jiff::{civil, Timestamp};
use tempfile::TempDir;

/// Helper function to create a temporary directory and database path
fn create_test_environment() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("test_horizon.db");
    (temp_dir, db_path)
}

fn fixed_now() -> Timestamp {
    "2025-01-06T12:00:00Z".parse().expect("valid timestamp")
}

fn fixed_today() -> civil::Date {
    civil::date(2025, 1, 6)
}

async fn build_tracker(db_path: PathBuf) -> horizon_core::Tracker {
    TrackerBuilder::new()
        .with_database_path(Some(db_path))
        .build()
        .await
        .expect("Failed to create tracker")
}

#[tokio::test]
async fn test_one_off_completion_flows_into_goal_progress() {
    // Scenario: a goal measured in pages with a completed-count mapping; a
    // one-off item due today toggled done must show under "done" in the
    // day window and move the goal's progress ratio.
    let (_temp_dir, db_path) = create_test_environment();
    let tracker = build_tracker(db_path).await;

    let goal = tracker
        .create_goal(
            &CreateGoal {
                title: "Read the stack of books".to_string(),
                success_metric: Some("pages".to_string()),
                target_value: Some(100.0),
                metric_strategy: MetricStrategy::CompletedCount,
                ..Default::default()
            },
            fixed_today(),
            fixed_now(),
        )
        .await
        .expect("Failed to create goal");

    let item = tracker
        .add_item(
            &CreateItem {
                goal_id: goal.id,
                title: "Read chapter one".to_string(),
                due_date: Some(fixed_today()),
                ..Default::default()
            },
            fixed_today(),
            fixed_now(),
        )
        .await
        .expect("Failed to add item");

    tracker
        .toggle_item(&Id { id: item.id }, fixed_now())
        .await
        .expect("Failed to toggle item");

    let window = tracker
        .query_window(&QueryWindow {
            goal_id: Some(goal.id),
            start: fixed_today(),
            end: fixed_today(),
        })
        .await
        .expect("Failed to query window");
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].status(), ItemStatus::Done);

    let ratio = tracker
        .progress_ratio(&Id { id: goal.id })
        .await
        .expect("Failed to compute progress");
    assert_eq!(ratio, Some(0.01));
}

#[tokio::test]
async fn test_weekly_template_expands_phase_locked() {
    // Scenario: weekly Mon/Wed/Fri template anchored on a Monday; the
    // following two weeks hold exactly six occurrences on those weekdays.
    let (_temp_dir, db_path) = create_test_environment();
    let tracker = build_tracker(db_path).await;

    let goal = tracker
        .create_goal(
            &CreateGoal {
                title: "Exercise".to_string(),
                ..Default::default()
            },
            fixed_today(),
            fixed_now(),
        )
        .await
        .expect("Failed to create goal");

    tracker
        .add_item(
            &CreateItem {
                goal_id: goal.id,
                title: "Morning run".to_string(),
                due_date: Some(date(2025, 1, 6)),
                recurrence: Some(RecurrenceRule {
                    frequency: Frequency::Weekly,
                    interval: 1,
                    by_weekday: Some(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]),
                    day_of_month: None,
                    until: None,
                }),
                ..Default::default()
            },
            fixed_today(),
            fixed_now(),
        )
        .await
        .expect("Failed to add template");

    let window = tracker
        .query_window(&QueryWindow {
            goal_id: Some(goal.id),
            start: date(2025, 1, 13),
            end: date(2025, 1, 26),
        })
        .await
        .expect("Failed to query window");

    let dates: Vec<civil::Date> = window
        .iter()
        .filter_map(|occurrence| occurrence.due_date())
        .collect();
    assert_eq!(
        dates,
        vec![
            date(2025, 1, 13),
            date(2025, 1, 15),
            date(2025, 1, 17),
            date(2025, 1, 20),
            date(2025, 1, 22),
            date(2025, 1, 24),
        ]
    );
    assert!(window.iter().all(|occurrence| occurrence.is_virtual()));
}

#[tokio::test]
async fn test_toggling_virtual_occurrence_materializes_once() {
    // Scenario: toggling one occurrence stores a record; re-querying the
    // window resolves the same pair to exactly one stored entry.
    let (_temp_dir, db_path) = create_test_environment();
    let tracker = build_tracker(db_path).await;

    let goal = tracker
        .create_goal(
            &CreateGoal {
                title: "Exercise".to_string(),
                ..Default::default()
            },
            fixed_today(),
            fixed_now(),
        )
        .await
        .expect("Failed to create goal");

    let template = tracker
        .add_item(
            &CreateItem {
                goal_id: goal.id,
                title: "Morning run".to_string(),
                due_date: Some(date(2025, 1, 6)),
                recurrence: Some(RecurrenceRule {
                    frequency: Frequency::Weekly,
                    interval: 1,
                    by_weekday: Some(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]),
                    day_of_month: None,
                    until: None,
                }),
                ..Default::default()
            },
            fixed_today(),
            fixed_now(),
        )
        .await
        .expect("Failed to add template");

    let stored = tracker
        .toggle_occurrence(
            &ToggleOccurrence {
                template_id: template.id,
                date: date(2025, 1, 8),
            },
            fixed_now(),
        )
        .await
        .expect("Failed to toggle occurrence");
    assert_eq!(stored.status, ItemStatus::Done);
    assert_eq!(stored.completion_date, Some(fixed_now()));

    let window = tracker
        .query_window(&QueryWindow {
            goal_id: Some(goal.id),
            start: date(2025, 1, 6),
            end: date(2025, 1, 12),
        })
        .await
        .expect("Failed to query window");

    // Mon/Wed/Fri of the anchor week: two virtual, one stored, no
    // virtual+stored duplicate for the toggled pair.
    assert_eq!(window.len(), 3);
    let on_toggled_date: Vec<_> = window
        .iter()
        .filter(|occurrence| occurrence.due_date() == Some(date(2025, 1, 8)))
        .collect();
    assert_eq!(on_toggled_date.len(), 1);
    assert!(!on_toggled_date[0].is_virtual());
    assert_eq!(on_toggled_date[0].item().id, stored.id);

    // Toggling the now-stored occurrence back works through the same entry
    // point and reuses the record.
    let back = tracker
        .toggle_occurrence(
            &ToggleOccurrence {
                template_id: template.id,
                date: date(2025, 1, 8),
            },
            fixed_now(),
        )
        .await
        .expect("Failed to toggle occurrence back");
    assert_eq!(back.id, stored.id);
    assert_eq!(back.status, ItemStatus::Todo);
    assert!(back.completion_date.is_none());
}

#[tokio::test]
async fn test_goal_deletion_cascades_through_the_tree() {
    // Scenario: deleting a goal with three items, one of which has two
    // children, removes all five and the goal itself.
    let (_temp_dir, db_path) = create_test_environment();
    let tracker = build_tracker(db_path).await;

    let goal = tracker
        .create_goal(
            &CreateGoal {
                title: "Doomed".to_string(),
                ..Default::default()
            },
            fixed_today(),
            fixed_now(),
        )
        .await
        .expect("Failed to create goal");

    let mut item_ids = Vec::new();
    let mut parent_of_two = 0;
    for title in ["First", "Second", "Third"] {
        let item = tracker
            .add_item(
                &CreateItem {
                    goal_id: goal.id,
                    title: title.to_string(),
                    ..Default::default()
                },
                fixed_today(),
                fixed_now(),
            )
            .await
            .expect("Failed to add item");
        if title == "Second" {
            parent_of_two = item.id;
        }
        item_ids.push(item.id);
    }
    for title in ["Child A", "Child B"] {
        let item = tracker
            .add_item(
                &CreateItem {
                    goal_id: goal.id,
                    title: title.to_string(),
                    parent_id: Some(parent_of_two),
                    ..Default::default()
                },
                fixed_today(),
                fixed_now(),
            )
            .await
            .expect("Failed to add child");
        item_ids.push(item.id);
    }

    let deleted = tracker
        .delete_goal(&DeleteGoal {
            id: goal.id,
            confirmed: true,
        })
        .await
        .expect("Failed to delete goal");
    assert!(deleted.is_some());

    for id in item_ids {
        let item = tracker
            .get_item(&Id { id })
            .await
            .expect("Failed to get item");
        assert!(item.is_none(), "item {id} should be gone");
    }
    let goals = tracker
        .list_goals(None)
        .await
        .expect("Failed to list goals");
    assert!(goals.is_empty());
}

#[tokio::test]
async fn test_database_persistence_across_connections() {
    let (_temp_dir, db_path) = create_test_environment();

    let goal_id = {
        let tracker = build_tracker(db_path.clone()).await;
        let goal = tracker
            .create_goal(
                &CreateGoal {
                    title: "Persistent".to_string(),
                    ..Default::default()
                },
                fixed_today(),
                fixed_now(),
            )
            .await
            .expect("Failed to create goal");
        goal.id
    };

    let tracker = build_tracker(db_path).await;
    let goal = tracker
        .get_goal(&Id { id: goal_id })
        .await
        .expect("Failed to get goal")
        .expect("Goal should persist");
    assert_eq!(goal.title, "Persistent");
}

#[tokio::test]
async fn test_window_view_groups_and_counts() {
    let (_temp_dir, db_path) = create_test_environment();
    let tracker = build_tracker(db_path).await;

    let goal = tracker
        .create_goal(
            &CreateGoal {
                title: "Week".to_string(),
                ..Default::default()
            },
            fixed_today(),
            fixed_now(),
        )
        .await
        .expect("Failed to create goal");

    let first = tracker
        .add_item(
            &CreateItem {
                goal_id: goal.id,
                title: "Monday thing".to_string(),
                due_date: Some(date(2025, 1, 6)),
                ..Default::default()
            },
            fixed_today(),
            fixed_now(),
        )
        .await
        .expect("Failed to add item");
    tracker
        .add_item(
            &CreateItem {
                goal_id: goal.id,
                title: "Friday thing".to_string(),
                due_date: Some(date(2025, 1, 10)),
                ..Default::default()
            },
            fixed_today(),
            fixed_now(),
        )
        .await
        .expect("Failed to add item");
    tracker
        .toggle_item(&Id { id: first.id }, fixed_now())
        .await
        .expect("Failed to toggle");

    let view = tracker
        .window_view(&QueryWindow {
            goal_id: None,
            start: date(2025, 1, 6),
            end: date(2025, 1, 12),
        })
        .await
        .expect("Failed to build view");

    assert_eq!(view.rollup.total, 2);
    assert_eq!(view.rollup.done, 1);
    assert_eq!(view.rollup.todo, 1);

    let rendered = format!("{view}");
    assert!(rendered.contains("## Todo"));
    assert!(rendered.contains("## Done"));
    assert!(rendered.contains("Friday thing"));
}
