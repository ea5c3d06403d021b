use pdf_pages::*;

/// Tiny deterministic generator so mutation sequences are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

#[test]
fn test_initialize_is_permutation_of_page_numbers() {
    for n in 1..=12 {
        let registry = PageRegistry::initialize(n).unwrap();
        let mut indices = registry.display_order();
        indices.sort_unstable();
        assert_eq!(indices, (1..=n as u32).collect::<Vec<_>>());
        assert_eq!(registry.counts().included, n);
    }
}

#[test]
#[cfg(target_pointer_width = "64")]
fn test_initialize_rejects_counts_beyond_page_ids() {
    let count = u32::MAX as usize + 1;
    assert!(matches!(
        PageRegistry::initialize(count),
        Err(PagesError::TooManyPages(n)) if n == count
    ));
}

#[test]
fn test_reorder_first_to_last() {
    let mut registry = PageRegistry::initialize(3).unwrap();
    registry.reorder(0, 2).unwrap();
    assert_eq!(registry.display_order(), vec![2, 3, 1]);
    assert_eq!(registry.commit_plan().pages(), &[2, 3, 1]);
}

#[test]
fn test_reorder_last_to_first() {
    let mut registry = PageRegistry::initialize(4).unwrap();
    registry.reorder(3, 0).unwrap();
    assert_eq!(registry.display_order(), vec![4, 1, 2, 3]);
}

#[test]
fn test_toggle_twice_restores_state() {
    let mut registry = PageRegistry::initialize(5).unwrap();
    let before = registry.clone();
    assert!(registry.toggle(PageId(3)));
    assert_eq!(
        registry.counts(),
        PageCounts {
            included: 4,
            excluded: 1
        }
    );
    assert!(registry.toggle(PageId(3)));
    assert_eq!(registry, before);
}

#[test]
fn test_toggle_unknown_id_changes_nothing() {
    let mut registry = PageRegistry::initialize(2).unwrap();
    assert!(!registry.toggle(PageId(99)));
    assert_eq!(registry.counts().included, 2);
}

#[test]
fn test_ids_follow_pages_through_reorder() {
    let mut registry = PageRegistry::initialize(4).unwrap();
    registry.toggle(PageId(2));
    registry.reorder(1, 3).unwrap();
    assert_eq!(registry.position_of(PageId(2)), Some(3));
    let moved = registry.get(PageId(2)).unwrap();
    assert_eq!(moved.original_index, 2);
    assert!(moved.removed());
}

#[test]
fn test_select_and_deselect_all() {
    let mut registry = PageRegistry::initialize(6).unwrap();
    registry.deselect_all();
    assert_eq!(registry.counts().included, 0);
    assert!(registry.commit_plan().is_empty());
    registry.select_all();
    assert_eq!(registry.counts().excluded, 0);
}

#[test]
fn test_plan_matches_counts_under_random_mutations() {
    let mut rng = Lcg(7);
    for n in 1..=9 {
        let mut registry = PageRegistry::initialize(n).unwrap();
        for _ in 0..200 {
            match rng.next(4) {
                0 => {
                    registry.toggle(PageId(rng.next(n) as u32 + 1));
                }
                1 => {
                    let (source, target) = (rng.next(n), rng.next(n));
                    registry.reorder(source, target).unwrap();
                }
                2 if rng.next(10) == 0 => registry.deselect_all(),
                _ => {
                    // Out-of-range moves must leave the order alone
                    let before = registry.display_order();
                    assert!(registry.reorder(0, n).is_err());
                    assert_eq!(registry.display_order(), before);
                }
            }

            let counts = registry.counts();
            assert_eq!(counts.total(), n);
            assert_eq!(registry.len(), n);
            assert_eq!(registry.commit_plan().len(), counts.included);

            let mut indices = registry.display_order();
            indices.sort_unstable();
            assert_eq!(indices, (1..=n as u32).collect::<Vec<_>>());
        }
    }
}

#[test]
fn test_commit_plan_is_stable_without_mutation() {
    let mut registry = PageRegistry::initialize(5).unwrap();
    registry.reorder(4, 1).unwrap();
    registry.toggle(PageId(3));
    assert_eq!(registry.commit_plan(), registry.commit_plan());
    assert_eq!(registry.commit_plan().pages(), &[1, 5, 2, 4]);
}
