//! Selection bookkeeping across controller operations.

use std::collections::HashSet;

use pagecat::config::SelectionSpec;
use pagecat::error::PageCatError;
use pagecat::merge::Merger;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::{loaded_controller, selection_of};

#[tokio::test]
async fn test_random_toggles_never_duplicate_entries() {
    let (mut controller, ids) = loaded_controller(&[("a", 4), ("b", 3), ("c", 5)]).await;
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..500 {
        let id = ids[rng.gen_range(0..ids.len())];
        let pages = controller.session().document(id).unwrap().page_count();
        match rng.gen_range(0..10) {
            0 => {
                controller.select_all_pages(id);
            }
            1 => {
                controller.deselect_all_pages(id);
            }
            _ => {
                controller.toggle_page(id, rng.gen_range(1..=pages));
            }
        }

        let selection = selection_of(&controller);
        let unique: HashSet<_> = selection.iter().collect();
        assert_eq!(unique.len(), selection.len());
        assert!(controller.session().is_consistent());
    }
}

#[tokio::test]
async fn test_remove_document_keeps_remaining_order() {
    let (mut controller, ids) = loaded_controller(&[("a", 3), ("b", 2), ("c", 2)]).await;
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    controller.toggle_page(c, 2);
    controller.toggle_page(b, 1);
    controller.toggle_page(a, 3);
    controller.toggle_page(b, 2);
    controller.toggle_page(a, 1);

    let removed = controller.remove_document(b).unwrap();
    assert_eq!(removed.name(), "b.pdf");
    assert_eq!(selection_of(&controller), vec![(c, 2), (a, 3), (a, 1)]);
    assert!(controller.session().document(b).is_none());
    assert!(controller.remove_document(b).is_none());
}

#[tokio::test]
async fn test_select_all_then_deselect_all_restores_others() {
    let (mut controller, ids) = loaded_controller(&[("a", 3), ("b", 4)]).await;
    let (a, b) = (ids[0], ids[1]);

    controller.toggle_page(a, 2);
    controller.toggle_page(b, 3);
    controller.toggle_page(a, 1);
    let before: Vec<_> = selection_of(&controller)
        .into_iter()
        .filter(|(doc, _)| *doc != b)
        .collect();

    assert_eq!(controller.select_all_pages(b), 3);
    assert_eq!(controller.deselect_all_pages(b), 4);

    assert_eq!(selection_of(&controller), before);
    assert!(
        controller.session().document(b).unwrap().pages().iter().all(|p| !p.is_selected())
    );
}

#[tokio::test]
async fn test_select_all_appends_in_page_order() {
    let (mut controller, ids) = loaded_controller(&[("a", 3)]).await;
    let a = ids[0];

    controller.toggle_page(a, 2);
    controller.select_all_pages(a);
    assert_eq!(selection_of(&controller), vec![(a, 2), (a, 1), (a, 3)]);
}

#[tokio::test]
async fn test_apply_selection_specs() {
    let (mut controller, ids) = loaded_controller(&[("a", 4), ("b", 2)]).await;
    let (a, b) = (ids[0], ids[1]);

    for spec in ["2:2", "1:3-4", "1:1"] {
        let spec: SelectionSpec = spec.parse().unwrap();
        controller.apply_selection(&spec).unwrap();
    }
    assert_eq!(
        selection_of(&controller),
        vec![(b, 2), (a, 3), (a, 4), (a, 1)]
    );

    let err = controller
        .apply_selection(&"3:1".parse().unwrap())
        .unwrap_err();
    assert!(matches!(err, PageCatError::InvalidSelection { .. }));

    let err = controller
        .apply_selection(&"2:5".parse().unwrap())
        .unwrap_err();
    assert!(matches!(err, PageCatError::InvalidSelection { .. }));
    assert_eq!(selection_of(&controller).len(), 4);
}

#[tokio::test]
async fn test_clear_all_then_merge_is_a_user_error() {
    let (mut controller, ids) = loaded_controller(&[("a", 2), ("b", 1)]).await;
    controller.toggle_page(ids[0], 1);
    controller.toggle_page(ids[1], 1);

    controller.clear_all(|_| true).unwrap();
    assert!(controller.session().documents().is_empty());
    assert!(controller.session().selection().is_empty());
    assert!(!controller.view().merge_enabled);

    let err = Merger::new()
        .merge(controller.session(), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, PageCatError::NothingSelected));
    assert!(err.is_user_error());
}

#[tokio::test]
async fn test_declined_clear_keeps_everything() {
    let (mut controller, ids) = loaded_controller(&[("a", 2)]).await;
    controller.toggle_page(ids[0], 2);

    let err = controller.clear_all(|_| false).unwrap_err();
    assert!(matches!(err, PageCatError::Cancelled));
    assert_eq!(controller.session().documents().len(), 1);
    assert_eq!(selection_of(&controller), vec![(ids[0], 2)]);
}

#[tokio::test]
async fn test_ids_are_not_reused_after_clear() {
    let (mut controller, first) = loaded_controller(&[("a", 1)]).await;
    controller.clear_all(|_| true).unwrap();

    let second = controller
        .load_files(vec![crate::common::labeled_input("a", 1)])
        .await
        .unwrap();
    assert!(second[0] > first[0]);
}
