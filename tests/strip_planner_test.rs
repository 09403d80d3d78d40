use pclm_convert::pclm::{PageStrips, StripPlan};

// ============================================================
// 1. Partition laws
// ============================================================

#[test]
fn test_strip_count_and_coverage() {
    for height in 1..=200u32 {
        for preferred in [1u32, 3, 16, 64, 200, 255] {
            let plan = StripPlan::new(height, preferred);
            assert_eq!(
                plan.strip_count() as u32,
                height.div_ceil(preferred),
                "strip count for height {height}, preferred {preferred}"
            );
            assert_eq!(
                plan.heights().iter().sum::<u32>(),
                height,
                "heights must sum to page height"
            );
            // All strips but the last are exactly the preferred height.
            for &h in &plan.heights()[..plan.strip_count() - 1] {
                assert_eq!(h, preferred);
            }
            assert!(*plan.heights().last().unwrap() <= preferred);
        }
    }
}

#[test]
fn test_even_division_has_no_short_strip() {
    let plan = StripPlan::new(32, 16);
    assert_eq!(plan.heights(), &[16, 16]);
}

#[test]
fn test_remainder_strip() {
    let plan = StripPlan::new(20, 16);
    assert_eq!(plan.heights(), &[16, 4]);
}

#[test]
fn test_single_short_page() {
    let plan = StripPlan::new(5, 16);
    assert_eq!(plan.heights(), &[5]);
}

// ============================================================
// 2. Buffer allocation and row routing
// ============================================================

#[test]
fn test_allocate_sizes_buffers_per_strip() {
    let plan = StripPlan::new(20, 16);
    let strips = PageStrips::allocate(&plan, 10).expect("allocate");
    let sizes: Vec<usize> = strips.strips().iter().map(|s| s.data.len()).collect();
    assert_eq!(sizes, vec![160, 40]);
}

#[test]
fn test_allocation_overflow_is_fatal() {
    let plan = StripPlan::new(1 << 20, 1 << 16);
    assert!(PageStrips::allocate(&plan, usize::MAX / 2).is_err());
}

#[test]
fn test_rows_land_in_owning_strip() {
    let plan = StripPlan::new(20, 16);
    let mut strips = PageStrips::allocate(&plan, 4).expect("allocate");

    for row in 0..20u32 {
        let data = vec![row as u8; 4];
        strips.write_row(row, &data);
    }

    let all = strips.into_strips();
    assert_eq!(all[0].start_row, 0);
    assert_eq!(all[1].start_row, 16);
    // First row of the second strip is page row 16.
    assert_eq!(&all[1].data[..4], &[16, 16, 16, 16]);
    // Last row of the first strip is page row 15.
    assert_eq!(&all[0].data[60..64], &[15, 15, 15, 15]);
}

#[test]
fn test_out_of_range_row_is_dropped() {
    let plan = StripPlan::new(8, 16);
    let mut strips = PageStrips::allocate(&plan, 2).expect("allocate");

    strips.write_row(8, &[0xFF, 0xFF]);
    strips.write_row(100, &[0xFF, 0xFF]);

    let all = strips.into_strips();
    assert!(
        all[0].data.iter().all(|&b| b == 0),
        "out-of-range rows must not touch any buffer"
    );
}

#[test]
fn test_unwritten_rows_are_blank() {
    let plan = StripPlan::new(4, 16);
    let strips = PageStrips::allocate(&plan, 3).expect("allocate");
    assert!(strips.strips()[0].data.iter().all(|&b| b == 0));
}
