use super::*;

#[test]
fn pack_roundtrip() {
    let loc = SrcLoc::new(3, 120, 14, 5);
    assert_eq!(loc.file_id(), 3);
    assert_eq!(loc.line(), 120);
    assert_eq!(loc.col(), 14);
    assert_eq!(loc.width(), 5);
    assert!(loc.is_known());
}

#[test]
fn zero_is_unknown() {
    assert!(!SrcLoc::NONE.is_known());
    assert_eq!(SrcLoc::NONE.line(), 0);
    assert_eq!(SrcLoc::NONE.file_id(), 0);
}

#[test]
fn fields_saturate() {
    let loc = SrcLoc::new(u32::MAX, u32::MAX, u32::MAX, u32::MAX);
    assert_eq!(loc.file_id(), (1 << 20) - 1);
    assert_eq!(loc.line(), (1 << 20) - 1);
    assert_eq!(loc.col(), (1 << 12) - 1);
    assert_eq!(loc.width(), (1 << 12) - 1);
}

#[test]
fn union_covers_both_columns() {
    let a = SrcLoc::new(1, 4, 10, 3);
    let b = SrcLoc::new(1, 4, 20, 5);
    let u = SrcLoc::union(a, b);
    assert_eq!(u.col(), 10);
    assert_eq!(u.width(), 15);
}

#[test]
fn union_prefers_known() {
    let a = SrcLoc::new(1, 4, 10, 3);
    assert_eq!(SrcLoc::union(SrcLoc::NONE, a), a);
    assert_eq!(SrcLoc::union(a, SrcLoc::NONE), a);
}

#[test]
fn min_treats_unknown_as_largest() {
    let a = SrcLoc::new(1, 4, 10, 3);
    assert_eq!(SrcLoc::min(SrcLoc::NONE, a), a);
    assert_eq!(SrcLoc::min(a, SrcLoc::NONE), a);
}

#[test]
fn locmap_slot_zero_reserved() {
    let mut lm = LocMap::new();
    let id = lm.intern_file("main.cn");
    assert_eq!(id, 1);
    assert!(lm.file(0).is_none());
    assert_eq!(lm.file(id).unwrap().name, "main.cn");
}

#[test]
fn origin_from_loc() {
    let loc = SrcLoc::new(2, 7, 3, 4);
    let origin = Origin::from_loc(loc);
    assert_eq!(origin.file_id, 2);
    assert_eq!(origin.line, 7);
    assert_eq!(origin.column, 3);
    assert_eq!(origin.width, 4);
    assert_eq!(origin.focus_col, 0);
}
