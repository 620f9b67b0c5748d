use anyhow::Result;

use innospace::{ReadView, ViewList};

#[test]
fn visibility_around_active_set() -> Result<()> {
    let view = ReadView::new(10, &[14, 12]);
    assert_eq!(view.low_limit, 15);
    assert_eq!(view.up_limit, 12);
    let expect = [
        (9, true),
        (10, true),
        (11, true),
        (12, false),
        (13, true),
        (14, false),
        (15, false),
    ];
    for (trx, visible) in expect {
        assert_eq!(view.sees(trx), visible, "trx {trx}");
    }
    assert!(view.sees(0));
    Ok(())
}

#[test]
fn copy_of_oldest_adds_old_creator() -> Result<()> {
    let mut list = ViewList::new();
    let first = list.open(10, &[14, 12]);
    let copy = list.oldest_copy_or_open_new(20, &[]);
    assert_eq!(list.len(), 2);

    let v = list.get(copy).expect("copy is live");
    assert_eq!(v.creator, 20);
    assert_eq!(v.trx_ids, vec![14, 12, 10]);
    assert_eq!(v.up_limit, 10);
    assert_eq!(v.low_limit, 15);
    assert!(!v.sees(10));
    assert!(v.sees(20));

    assert!(list.close(first));
    assert!(!list.close(first));
    assert_eq!(list.oldest().map(|(id, _)| id), Some(copy));
    Ok(())
}

#[test]
fn copy_does_not_duplicate_a_listed_creator() -> Result<()> {
    let mut list = ViewList::new();
    list.open(12, &[14, 12]);
    let copy = list.oldest_copy_or_open_new(30, &[]);
    assert_eq!(list.get(copy).expect("live").trx_ids, vec![14, 12]);
    Ok(())
}

#[test]
fn raising_creator_hides_nothing_new() -> Result<()> {
    let mut rng = oorandom::Rand64::new(10);
    for _ in 0..300 {
        let n = rng.rand_range(1..8) as usize;
        let active: Vec<u64> = (0..n).map(|_| rng.rand_range(1..100)).collect();
        let max = *active.iter().max().expect("non-empty");
        // creators at or below the newest active id keep the same limits
        let c1 = rng.rand_range(1..max + 1);
        let c2 = rng.rand_range(c1..max + 1);
        let v1 = ReadView::new(c1, &active);
        let v2 = ReadView::new(c2, &active);
        for trx in 1..=110u64 {
            if trx == c2 {
                continue;
            }
            if !v1.sees(trx) {
                assert!(!v2.sees(trx), "trx {trx} became visible: {c1} -> {c2} over {active:?}");
            }
        }
        for &a in &active {
            if a != c1 {
                assert!(!v1.sees(a));
            }
        }
    }
    Ok(())
}
