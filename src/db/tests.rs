#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    use super::super::{
        count_by_status, count_high_priority_open, count_overdue, delete_task, get_task_by_id,
        init_pool, init_pool_at, insert_task, list_recent_tasks, list_tasks, update_task,
        update_task_status, DbPool, NewTask, PageRequest, SortField, SortOrder, TaskChanges,
        TaskFilter, TaskPriority, TaskRecord, TaskSort, TaskStatus,
    };

    async fn memory_pool() -> DbPool {
        init_pool("sqlite::memory:").await.unwrap()
    }

    async fn seed(
        pool: &DbPool,
        title: &str,
        description: &str,
        priority: TaskPriority,
        status: TaskStatus,
    ) -> TaskRecord {
        insert_task(
            pool,
            NewTask {
                title,
                description,
                priority,
                status,
                due_date: None,
            },
        )
        .await
        .unwrap()
    }

    fn titles(tasks: &[TaskRecord]) -> Vec<&str> {
        tasks.iter().map(|task| task.title.as_str()).collect()
    }

    #[tokio::test]
    async fn init_db_runs_migrations_and_enables_wal() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("taskmate.sqlite");

        let pool = init_pool_at(&db_path).await.unwrap();

        let journal_mode: String = sqlx::query_scalar("PRAGMA journal_mode;")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(journal_mode.to_lowercase(), "wal");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let pool = memory_pool().await;
        let due = Utc::now() + Duration::days(2);
        let task = insert_task(
            &pool,
            NewTask {
                title: "Demo Task",
                description: "desc",
                priority: TaskPriority::High,
                status: TaskStatus::Todo,
                due_date: Some(due),
            },
        )
        .await
        .unwrap();

        assert_eq!(task.id.len(), 36);
        assert_eq!(task.created_at, task.updated_at);
        assert!(task.due_at().is_some());

        let fetched = get_task_by_id(&pool, &task.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Demo Task");
        assert_eq!(fetched.priority, TaskPriority::High);
        assert!(get_task_by_id(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn check_constraints_reject_invalid_rows() {
        let pool = memory_pool().await;
        let result = sqlx::query(
            "INSERT INTO tasks (id, title, priority, status, created_at, updated_at) \
             VALUES ('x', 'bad', 'medium', 'done', '', '')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn update_applies_only_given_fields_and_refreshes_updated_at() {
        let pool = memory_pool().await;
        let task = insert_task(
            &pool,
            NewTask {
                title: "Original",
                description: "keep me",
                priority: TaskPriority::Low,
                status: TaskStatus::Todo,
                due_date: Some(Utc::now() + Duration::days(1)),
            },
        )
        .await
        .unwrap();
        tokio::time::sleep(StdDuration::from_millis(5)).await;

        let updated = update_task(
            &pool,
            &task.id,
            TaskChanges {
                title: Some("Renamed"),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, "keep me");
        assert_eq!(updated.priority, TaskPriority::Low);
        assert!(updated.due_date.is_some());
        assert!(updated.updated_at > task.updated_at);
        assert_eq!(updated.created_at, task.created_at);

        let cleared = update_task(
            &pool,
            &task.id,
            TaskChanges {
                due_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert!(cleared.due_date.is_none());

        let missing = update_task(&pool, "missing", TaskChanges::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn status_update_and_double_delete() {
        let pool = memory_pool().await;
        let task = seed(&pool, "Finish", "", TaskPriority::Medium, TaskStatus::Todo).await;

        let updated = update_task_status(&pool, &task.id, TaskStatus::Completed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);
        assert!(update_task_status(&pool, "missing", TaskStatus::Todo)
            .await
            .unwrap()
            .is_none());

        assert!(delete_task(&pool, &task.id).await.unwrap());
        assert!(!delete_task(&pool, &task.id).await.unwrap());
        assert!(get_task_by_id(&pool, &task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn filters_combine_with_and_and_search_matches_either_field() {
        let pool = memory_pool().await;
        seed(&pool, "Write Report", "quarterly", TaskPriority::High, TaskStatus::Todo).await;
        seed(&pool, "Groceries", "buy milk for the REPORT party", TaskPriority::Low, TaskStatus::Todo).await;
        seed(&pool, "Report bug", "", TaskPriority::High, TaskStatus::Completed).await;
        seed(&pool, "Gym", "", TaskPriority::High, TaskStatus::InProgress).await;

        let sort = TaskSort {
            field: SortField::Title,
            order: SortOrder::Asc,
        };
        let page = PageRequest::new(1, 50);

        let search = TaskFilter {
            search: Some("report".into()),
            ..Default::default()
        };
        let result = list_tasks(&pool, &search, sort, page).await.unwrap();
        assert_eq!(titles(&result.tasks), ["Groceries", "Report bug", "Write Report"]);
        assert_eq!(result.total, 3);

        let narrowed = TaskFilter {
            status: Some(TaskStatus::Todo),
            priority: Some(TaskPriority::High),
            search: Some("report".into()),
        };
        let result = list_tasks(&pool, &narrowed, sort, page).await.unwrap();
        assert_eq!(titles(&result.tasks), ["Write Report"]);
        assert_eq!(result.total, 1);
        // 状态计数覆盖全表
        assert_eq!(result.counts.total(), 4);
        assert_eq!(result.counts.todo, 2);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let pool = memory_pool().await;
        seed(&pool, "50% off sale", "", TaskPriority::Low, TaskStatus::Todo).await;
        seed(&pool, "500 emails", "", TaskPriority::Low, TaskStatus::Todo).await;

        let filter = TaskFilter {
            search: Some("50%".into()),
            ..Default::default()
        };
        let result = list_tasks(&pool, &filter, TaskSort::default(), PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(titles(&result.tasks), ["50% off sale"]);
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let pool = memory_pool().await;
        let eclair = seed(&pool, "Éclair order", "", TaskPriority::Low, TaskStatus::Todo).await;
        seed(&pool, "Gym", "Übung machen", TaskPriority::Low, TaskStatus::Todo).await;

        let search = |text: &str| TaskFilter {
            search: Some(text.to_string()),
            ..Default::default()
        };
        let sort = TaskSort::default();
        let page = PageRequest::new(1, 10);

        for text in ["éclair", "ÉCLAIR", "Éclair"] {
            let result = list_tasks(&pool, &search(text), sort, page).await.unwrap();
            assert_eq!(titles(&result.tasks), ["Éclair order"], "{text}");
        }
        let result = list_tasks(&pool, &search("übung"), sort, page).await.unwrap();
        assert_eq!(titles(&result.tasks), ["Gym"]);

        // 改名后按新标题匹配
        update_task(
            &pool,
            &eclair.id,
            TaskChanges {
                title: Some("Ölwechsel"),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let result = list_tasks(&pool, &search("ölwechsel"), sort, page).await.unwrap();
        assert_eq!(result.total, 1);
        let result = list_tasks(&pool, &search("éclair"), sort, page).await.unwrap();
        assert_eq!(result.total, 0);
    }

    #[tokio::test]
    async fn pages_slice_the_sorted_result() {
        let pool = memory_pool().await;
        for i in 0..7 {
            let title = format!("Task {}", i);
            seed(&pool, &title, "", TaskPriority::Medium, TaskStatus::Todo).await;
        }
        let sort = TaskSort {
            field: SortField::Title,
            order: SortOrder::Desc,
        };
        let filter = TaskFilter::default();

        let first = list_tasks(&pool, &filter, sort, PageRequest::new(1, 3)).await.unwrap();
        let last = list_tasks(&pool, &filter, sort, PageRequest::new(3, 3)).await.unwrap();
        let beyond = list_tasks(&pool, &filter, sort, PageRequest::new(4, 3)).await.unwrap();

        assert_eq!(titles(&first.tasks), ["Task 6", "Task 5", "Task 4"]);
        assert_eq!(titles(&last.tasks), ["Task 0"]);
        assert!(beyond.tasks.is_empty());
        assert_eq!(first.total, 7);
        assert_eq!(PageRequest::new(1, 3).page_count(first.total), 3);
    }

    #[tokio::test]
    async fn aggregates_for_chat_and_suggestions() {
        let pool = memory_pool().await;
        let now = Utc::now();
        for (title, priority, status, due) in [
            ("late", TaskPriority::High, TaskStatus::Todo, Some(now - Duration::days(1))),
            ("late but done", TaskPriority::High, TaskStatus::Completed, Some(now - Duration::days(1))),
            ("upcoming", TaskPriority::Low, TaskStatus::InProgress, Some(now + Duration::days(1))),
            ("someday", TaskPriority::High, TaskStatus::InProgress, None),
        ] {
            insert_task(
                &pool,
                NewTask {
                    title,
                    description: "",
                    priority,
                    status,
                    due_date: due,
                },
            )
            .await
            .unwrap();
            tokio::time::sleep(StdDuration::from_millis(2)).await;
        }

        assert_eq!(count_overdue(&pool, now).await.unwrap(), 1);
        assert_eq!(count_high_priority_open(&pool).await.unwrap(), 2);

        let counts = count_by_status(&pool).await.unwrap();
        assert_eq!((counts.todo, counts.in_progress, counts.completed), (1, 2, 1));

        let recent = list_recent_tasks(&pool, 2).await.unwrap();
        assert_eq!(titles(&recent), ["someday", "upcoming"]);
    }
}
