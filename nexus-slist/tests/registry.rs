//! Process-wide registration. Tests share one registry, so they are serial.

mod common;

use nexus_slist::{
    Allocator, Capability, List, ListError, Registered, register_allocate, register_deallocate,
    reset_registry,
};
use serial_test::serial;

fn registered_list(values: &[u32]) -> List {
    let mut list = List::new().unwrap();
    for &v in values {
        list.push_back(v).unwrap();
    }
    list
}

#[test]
#[serial]
fn create_before_registration_fails() {
    reset_registry();
    assert_eq!(
        List::new().err(),
        Some(ListError::Unconfigured(Capability::Allocate))
    );
    assert!(Registered.allocate_fn().is_none());
    assert!(Registered.deallocate_fn().is_none());
}

#[test]
#[serial]
fn reset_clears_both() {
    common::register_counting();
    assert!(Registered.require_allocate().is_ok());
    assert!(Registered.require_deallocate().is_ok());

    reset_registry();
    assert!(Registered.require_allocate().is_err());
    assert!(Registered.require_deallocate().is_err());
}

#[test]
#[serial]
fn allocate_only_binding() {
    reset_registry();
    common::reset();
    register_allocate(common::count_alloc);

    let mut list = List::new().unwrap();
    list.push_back(1).unwrap();
    list.push_front(0).unwrap();
    assert_eq!(list.len(), 2);

    assert_eq!(
        list.remove(0),
        Err(ListError::Unconfigured(Capability::Deallocate))
    );
    assert_eq!(list.len(), 2);

    assert_eq!(
        list.delete(),
        Err(ListError::Unconfigured(Capability::Deallocate))
    );
    assert_eq!(common::deallocations(), 0);
}

#[test]
#[serial]
fn late_registration_is_picked_up() {
    reset_registry();
    common::reset();
    register_allocate(common::count_alloc);

    let mut list = registered_list(&[1, 2, 3]);
    assert!(list.remove(1).is_err());

    register_deallocate(common::count_free);
    assert_eq!(list.remove(1), Ok(2));
    list.delete().unwrap();
    assert_eq!(common::live(), 0);
}

#[test]
#[serial]
fn delete_releases_every_block() {
    common::register_counting();

    let list = registered_list(&[1, 2, 3, 4, 5]);
    assert_eq!(common::allocations(), 6);

    list.delete().unwrap();
    assert_eq!(common::deallocations(), 6);
}

#[test]
#[serial]
fn delete_empty_list() {
    common::register_counting();

    let list = List::new().unwrap();
    list.delete().unwrap();
    assert_eq!((common::allocations(), common::deallocations()), (1, 1));
}

#[test]
#[serial]
fn drop_releases_every_block() {
    common::register_counting();
    {
        let list = registered_list(&[7, 8]);
        let _cursor = list.cursor(0).unwrap();
    }
    assert_eq!(common::allocations(), 4);
    assert_eq!(common::live(), 0);
}

#[test]
#[serial]
fn failed_allocation_leaves_list_unchanged() {
    common::register_counting();
    let mut list = registered_list(&[1, 2]);

    common::fail_next();
    assert!(matches!(
        list.push_back(3),
        Err(ListError::AllocationFailed { .. })
    ));
    common::fail_next();
    assert!(matches!(
        list.insert(1, 3),
        Err(ListError::AllocationFailed { .. })
    ));
    assert_eq!(list.iter().collect::<Vec<_>>(), vec![1, 2]);

    list.delete().unwrap();
    assert_eq!(common::live(), 0);
}

#[test]
#[serial]
fn round_trip() {
    common::register_counting();

    let mut list = List::new().unwrap();
    list.push_front(5).unwrap();
    list.push_back(10).unwrap();
    list.push_back(15).unwrap();
    assert_eq!(list.iter().collect::<Vec<_>>(), vec![5, 10, 15]);

    assert_eq!(list.find(10), Some(1));
    assert_eq!(list.remove(0), Ok(5));
    assert_eq!(list.iter().collect::<Vec<_>>(), vec![10, 15]);
    assert_eq!(list.len(), 2);

    list.delete().unwrap();
    assert_eq!(common::live(), 0);
}

#[test]
#[serial]
fn cursor_walk_over_registered_list() {
    common::register_counting();
    let list = registered_list(&[3, 1, 4, 1, 5]);

    let mut cursor = list.cursor(0).unwrap();
    let mut seen = vec![cursor.data().unwrap()];
    while cursor.advance().is_ok() {
        seen.push(cursor.data().unwrap());
    }
    assert_eq!(seen, vec![3, 1, 4, 1, 5]);
    assert_eq!(cursor.index(), 4);

    cursor.delete().unwrap();
    list.delete().unwrap();
    assert_eq!(common::live(), 0);
}
