use magnitude_charts::binning::SegmentGrid;
use magnitude_charts::prelude::*;
use magnitude_charts::{make_bins, SegmentedScale};
use pretty_assertions::assert_eq;

fn scenario() -> MagnitudeChart {
    let config = ChartConfig::new(
        vec![5.0, 50.0, 500.0, 5000.0],
        vec![0.0, 10.0, 100.0, 1000.0, 10000.0],
    )
    .with_bin_size(vec![2.0, 20.0, 200.0, 2000.0]);
    MagnitudeChart::new(config).expect("valid chart config")
}

#[test]
fn each_decade_gets_its_own_bin() {
    let chart = scenario();
    let bins: Vec<_> = chart
        .bins()
        .iter()
        .map(|b| (b.segment, b.x0, b.x1, b.values.clone()))
        .collect();
    assert_eq!(
        bins,
        vec![
            (0, 4.0, 6.0, vec![5.0]),
            (1, 40.0, 60.0, vec![50.0]),
            (2, 400.0, 600.0, vec![500.0]),
            (3, 4000.0, 6000.0, vec![5000.0]),
        ]
    );
    assert_eq!(chart.y_scales().max_counts(), vec![1.0; 4]);
}

#[test]
fn auto_extended_maximum_is_binned() {
    let chart = MagnitudeChart::new(ChartConfig::new(vec![1.0, 2.0, 3.0, 50.0], vec![0.0, 10.0]))
        .expect("valid chart config");
    assert_eq!(chart.boundaries(), &[0.0, 10.0, 50.0]);
    assert_eq!(chart.bins().total(), chart.data().len());
    let top = chart.bins().last().expect("bin holding the maximum");
    assert_eq!((top.segment, top.x1, top.values.clone()), (1, 50.0, vec![50.0]));
    assert_eq!(chart.y_scales().max_counts()[1], 1.0);
}

#[test]
fn forward_and_inverse_round_trip() {
    let mut chart = scenario();
    let probes: Vec<f64> = (0..=400).map(|i| i as f64 * 25.0).collect();

    for geometry in [PrismGeometry::Flat, PrismGeometry::Offset] {
        for mode in [PrismMode::Install, PrismMode::Hover] {
            chart.set_prism_geometry(geometry);
            chart.set_prism_mode(mode);
            let xs = chart.scale();
            for &v in &probes {
                let back = xs.inverse(xs.forward(v));
                assert!(
                    (back - v).abs() <= 1e-9 * v.abs().max(1.0),
                    "{geometry:?}/{mode:?}: {v} -> {back}"
                );
            }
        }
    }

    chart.drag_boundary(2, 120.0);
    let xs = chart.scale();
    for &v in &probes {
        assert!((xs.inverse(xs.forward(v)) - v).abs() <= 1e-9 * v.abs().max(1.0));
    }
}

#[test]
fn bins_partition_every_segment() {
    let boundaries = [0.0, 1.0, 10.0, 100.0, 1000.0];
    let sizes = [0.3, 2.5, 7.0, 333.0];
    for (w, &size) in boundaries.windows(2).zip(&sizes) {
        let grid = SegmentGrid::new(w[0], w[1], size);
        let edges: Vec<_> = grid.iter().collect();
        assert_eq!(edges.first().map(|e| e.0), Some(w[0]));
        assert_eq!(edges.last().map(|e| e.1), Some(w[1]));
        assert!(edges.windows(2).all(|p| p[0].1 == p[1].0 && p[0].0 < p[0].1));
    }

    let values: Vec<f64> = (0..2000).map(|i| (i as f64 * 0.61).powf(1.3)).collect();
    let inside = values.iter().filter(|&&v| (0.0..=1000.0).contains(&v)).count();
    let set = make_bins(&values, &boundaries, &sizes);
    assert_eq!(set.total(), inside);
    for bin in &set {
        let (lo, hi) = (boundaries[bin.segment], boundaries[bin.segment + 1]);
        assert!(bin.x0 >= lo && bin.x1 <= hi, "{bin:?} leaks out of [{lo}, {hi}]");
        assert!(bin.values.iter().all(|&v| bin.contains(v)));
    }
}

#[test]
fn boundary_value_belongs_to_segment_it_starts() {
    let config = ChartConfig::new(vec![], vec![0.0, 1.0, 10.0, 100.0])
        .with_x_bins(vec![0.0, 0.2, 0.6, 1.0]);
    let chart = MagnitudeChart::new(config).expect("valid chart config");
    let xs = chart.scale();

    assert_eq!(chart.x_bins(), &[0.0, 80.0, 240.0, 400.0]);
    assert_eq!(xs.segment_range(0).1, 80.0);
    assert_eq!(xs.forward(1.0), 80.0);
    for (i, &b) in chart.boundaries().iter().enumerate().take(3) {
        assert_eq!(xs.segment_index_of(b), i);
    }
    assert_eq!(xs.segment_index_of(100.0), 2);
}

#[test]
fn drag_always_lands_inside_clamp_interval() {
    let mut chart = scenario();
    let prism_width = PrismConfig::default().width;
    for candidate in (-10..=50).map(|i| i as f64 * 10.0) {
        for i in 1..=3 {
            let x = chart.x_bins().to_vec();
            let lo = x[i - 1] + 50.0;
            let hi = x[i + 1] - prism_width - 50.0;
            match chart.drag_boundary(i, candidate) {
                Some(px) => {
                    assert!(px >= lo && px <= hi, "boundary {i}: {px} outside [{lo}, {hi}]");
                    assert_eq!(chart.x_bins()[i], px);
                }
                None => assert!(lo > hi, "boundary {i} refused a drag with room to move"),
            }
        }
    }
    assert_eq!(chart.boundaries(), &[0.0, 10.0, 100.0, 1000.0, 10000.0]);
}

#[test]
fn offset_zones_shift_segment_starts() {
    let config = ChartConfig::new(vec![], vec![0.0, 1.0, 10.0, 100.0]).with_prism(PrismConfig {
        width: 20.0,
        geometry: PrismGeometry::Offset,
        ..PrismConfig::default()
    });
    let chart = MagnitudeChart::new(config).expect("valid chart config");
    let xs = chart.scale();
    let x = chart.x_bins();
    assert_eq!(xs.forward(1.0), x[1] + 20.0);
    assert_eq!(xs.inverse(x[1] + 10.0), 1.0);
    assert_eq!(xs.forward(0.0), 0.0);
    assert_eq!(chart.y_scales().get(0).map(|s| s.range().1), Some(PrismConfig::default().apex_offset));
}

#[test]
fn scales_can_be_built_without_a_chart() {
    let b = [0.0, 10.0];
    let x = [0.0, 100.0];
    let active = [false, false];
    let xs = SegmentedScale::new(&b, &x, &active, 10.0, PrismGeometry::Flat);
    assert_eq!(xs.forward(2.5), 25.0);
    assert_eq!(xs.inverse(-40.0), 0.0);
    assert!(!xs.inside_prism_zone(9.9));
}
