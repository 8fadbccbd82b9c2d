use super::*;

#[test]
fn test_user_method_inlining_detects_cycle() {
    let mut guard = RecursionGuard::with_profile(RecursionProfile::UserMethodInlining);
    assert!(guard.enter(1u32).is_entered());
    assert!(guard.enter(2u32).is_entered());
    assert_eq!(guard.enter(1u32), RecursionResult::Cycle);
    assert!(!guard.is_exceeded());

    guard.leave(2);
    guard.leave(1);
    assert_eq!(guard.depth(), 0);
    assert!(guard.enter(1u32).is_entered());
    guard.leave(1);
}

#[test]
fn test_projection_allows_reentry_up_to_depth() {
    let mut guard = RecursionGuard::with_profile(RecursionProfile::ProjectionInlining { max_depth: 2 });
    assert!(guard.enter(7u32).is_entered());
    assert!(guard.enter(7u32).is_entered());
    assert_eq!(guard.active_count(&7), 2);

    let third = guard.enter(7u32);
    assert_eq!(third, RecursionResult::DepthExceeded);
    assert!(third.is_exceeded());
    assert!(guard.is_exceeded());

    guard.leave(7);
    guard.leave(7);
    assert_eq!(guard.active_count(&7), 0);
}

#[test]
fn test_zero_depth_profile_still_allows_one_entry() {
    let mut guard = RecursionGuard::with_profile(RecursionProfile::ProjectionInlining { max_depth: 0 });
    assert_eq!(guard.max_reentries(), 1);
    assert!(guard.enter(1u32).is_entered());
    assert!(guard.enter(1u32).is_cycle());
    guard.leave(1);
}

#[test]
fn test_total_depth_limit() {
    let profile = RecursionProfile::Custom {
        max_reentries: 1,
        max_depth: 3,
        max_iterations: 100,
    };
    let mut guard = RecursionGuard::with_profile(profile);
    for key in 0u32..3 {
        assert!(guard.enter(key).is_entered());
    }
    assert_eq!(guard.enter(3u32), RecursionResult::DepthExceeded);
    for key in (0u32..3).rev() {
        guard.leave(key);
    }
}

#[test]
fn test_iteration_limit_is_sticky() {
    let profile = RecursionProfile::Custom {
        max_reentries: 1,
        max_depth: 10,
        max_iterations: 2,
    };
    let mut guard = RecursionGuard::with_profile(profile);
    assert!(guard.enter(1u32).is_entered());
    guard.leave(1);
    assert!(guard.enter(1u32).is_entered());
    guard.leave(1);
    assert_eq!(guard.enter(1u32), RecursionResult::IterationExceeded);
    assert!(guard.is_exceeded());
}
