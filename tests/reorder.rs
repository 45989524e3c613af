#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use taskrank::db::tasks::Tasks;
    use taskrank::libs::error::OrderError;
    use taskrank::libs::order_key::OrderKey;
    use taskrank::libs::reorder::ReorderRequest;
    use taskrank::libs::task::{Task, TaskFilter};

    const OWNER: &str = "owner-1";

    fn setup() -> Tasks {
        Tasks::with_connection(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn insert_with_key(tasks: &mut Tasks, name: &str, key: &str) -> Task {
        let task = Task::new(OWNER, name, "", None, OrderKey::parse(key).unwrap());
        tasks.insert(&task).unwrap();
        task
    }

    fn between(task_id: &str, previous: Option<&Task>, next: Option<&Task>) -> ReorderRequest {
        ReorderRequest {
            task_id: task_id.to_string(),
            previous_task_id: previous.map(|t| t.id.clone()),
            next_task_id: next.map(|t| t.id.clone()),
        }
    }

    #[test]
    fn test_reorder_touches_exactly_one_row() {
        let mut tasks = setup();
        let first = insert_with_key(&mut tasks, "first", "a1");
        let second = insert_with_key(&mut tasks, "second", "a5");
        let third = insert_with_key(&mut tasks, "third", "b1");

        // Drag the third task between the first two.
        let key = tasks
            .reorder(OWNER, &between(&third.id, Some(&first), Some(&second)))
            .unwrap();
        assert!(OrderKey::parse("a1").unwrap() < key);
        assert!(key < OrderKey::parse("a5").unwrap());

        let listed = tasks.fetch_active(OWNER, &TaskFilter::All).unwrap();
        assert_eq!(
            listed.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec![first.id.as_str(), third.id.as_str(), second.id.as_str()]
        );
        // Neighbors were read, never written.
        assert_eq!(listed[0].order_key.as_str(), "a1");
        assert_eq!(listed[2].order_key.as_str(), "a5");
    }

    #[test]
    fn test_reorder_to_front_and_back() {
        let mut tasks = setup();
        let first = insert_with_key(&mut tasks, "first", "a1");
        let second = insert_with_key(&mut tasks, "second", "a5");

        let key = tasks
            .reorder(OWNER, &between(&second.id, None, Some(&first)))
            .unwrap();
        assert!(key < first.order_key);

        let key = tasks
            .reorder(OWNER, &between(&second.id, Some(&first), None))
            .unwrap();
        assert!(key > first.order_key);
    }

    #[test]
    fn test_reorder_only_task_gets_middle() {
        let mut tasks = setup();
        let only = insert_with_key(&mut tasks, "only", "zz");
        let key = tasks.reorder(OWNER, &between(&only.id, None, None)).unwrap();
        assert_eq!(key, OrderKey::middle());
    }

    #[test]
    fn test_exhaustion_triggers_renumber_then_succeeds() {
        let mut tasks = setup();
        let first = tasks.create(OWNER, "first", "", None).unwrap();
        let second = tasks.create(OWNER, "second", "", None).unwrap();
        let third = tasks.create(OWNER, "third", "", None).unwrap();

        // A restore-after-trash collision can leave two rows with the same
        // key; no key fits between them.
        tasks
            .write_order(OWNER, &second.id, &first.order_key)
            .unwrap();

        tasks
            .reorder(OWNER, &between(&third.id, Some(&first), Some(&second)))
            .unwrap();

        let listed = tasks.fetch_active(OWNER, &TaskFilter::All).unwrap();
        assert_eq!(
            listed.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec![first.id.as_str(), third.id.as_str(), second.id.as_str()]
        );
        // The renumber left every key distinct and strictly ascending.
        for window in listed.windows(2) {
            assert!(window[0].order_key < window[1].order_key);
        }
    }

    #[test]
    fn test_renumber_preserves_relative_order() {
        let mut tasks = setup();
        let a = insert_with_key(&mut tasks, "a", "0001");
        let b = insert_with_key(&mut tasks, "b", "0002");
        let c = insert_with_key(&mut tasks, "c", "zzzzzz");

        let renumbered = tasks.renumber(OWNER).unwrap();
        assert_eq!(renumbered, 3);

        let listed = tasks.fetch_active(OWNER, &TaskFilter::All).unwrap();
        assert_eq!(
            listed.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec![a.id.as_str(), b.id.as_str(), c.id.as_str()]
        );
        for window in listed.windows(2) {
            assert!(window[0].order_key < window[1].order_key);
        }
    }

    #[test]
    fn test_create_between_inserts_without_touching_neighbors() {
        let mut tasks = setup();
        let first = insert_with_key(&mut tasks, "first", "a1");
        let second = insert_with_key(&mut tasks, "second", "a2");

        let created = tasks
            .create_between(OWNER, "wedged", "", None, Some(&first.id), Some(&second.id))
            .unwrap();
        assert!(first.order_key < created.order_key);
        assert!(created.order_key < second.order_key);

        let listed = tasks.fetch_active(OWNER, &TaskFilter::All).unwrap();
        assert_eq!(
            listed.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec![first.id.as_str(), created.id.as_str(), second.id.as_str()]
        );
        assert_eq!(listed[0].order_key, first.order_key);
        assert_eq!(listed[2].order_key, second.order_key);
    }

    #[test]
    fn test_moved_task_must_exist_and_be_active() {
        let mut tasks = setup();
        let first = insert_with_key(&mut tasks, "first", "a1");

        let result = tasks.reorder(OWNER, &between("no-such-task", Some(&first), None));
        assert!(matches!(result, Err(OrderError::TaskNotFound(_))));

        let trashed = insert_with_key(&mut tasks, "trashed", "a5");
        tasks.soft_delete(OWNER, &trashed.id).unwrap();
        let result = tasks.reorder(OWNER, &between(&trashed.id, Some(&first), None));
        assert!(matches!(result, Err(OrderError::TaskNotFound(_))));
    }

    #[test]
    fn test_missing_neighbor_is_reported() {
        let mut tasks = setup();
        let moved = insert_with_key(&mut tasks, "moved", "a1");

        let request = ReorderRequest {
            task_id: moved.id.clone(),
            previous_task_id: Some("no-such-neighbor".to_string()),
            next_task_id: None,
        };
        assert!(matches!(
            tasks.reorder(OWNER, &request),
            Err(OrderError::NeighborNotFound(id)) if id == "no-such-neighbor"
        ));
    }

    #[test]
    fn test_deleted_neighbor_is_reported_as_missing() {
        let mut tasks = setup();
        let moved = insert_with_key(&mut tasks, "moved", "a1");
        let gone = insert_with_key(&mut tasks, "gone", "a5");
        tasks.soft_delete(OWNER, &gone.id).unwrap();

        let result = tasks.reorder(OWNER, &between(&moved.id, Some(&gone), None));
        assert!(matches!(result, Err(OrderError::NeighborNotFound(_))));
    }

    #[test]
    fn test_foreign_neighbor_is_not_an_anchor() {
        let mut tasks = setup();
        let moved = insert_with_key(&mut tasks, "moved", "a1");
        let foreign = Task::new("owner-2", "foreign", "", None, OrderKey::parse("a5").unwrap());
        tasks.insert(&foreign).unwrap();

        let result = tasks.reorder(OWNER, &between(&moved.id, None, Some(&foreign)));
        assert!(matches!(
            result,
            Err(OrderError::NeighborNotOwned(id)) if id == foreign.id
        ));
    }
}
