use mandelzoom_core::{
    DoubleDouble, EscapeTimeEngine, IterationBudget, Precision, RenderWindow, Scalar,
};

/// Count every pixel of a window sequentially into a flat row-major Vec.
fn count_grid<T: Scalar>(window: &RenderWindow<T>, budget: IterationBudget) -> Vec<u32> {
    let engine = EscapeTimeEngine::new(budget, window.precision());
    let mut counts = Vec::with_capacity(window.pixel_count());
    for y in 0..window.height_px() {
        for x in 0..window.width_px() {
            counts.push(engine.count(&window.pixel_to_complex(x, y)));
        }
    }
    counts
}

#[test]
fn headless_full_set_render() {
    let budget = IterationBudget::new(256).unwrap();
    let window =
        RenderWindow::<f64>::from_f64(Precision::default(), 100, 80, (-0.75, 0.0), (3.6, 2.6))
            .unwrap();

    let counts = count_grid(&window, budget);

    assert_eq!(counts.len(), 100 * 80);
    let interior = counts.iter().filter(|&&n| n == 256).count();
    let escaped = counts.iter().filter(|&&n| n < 256).count();
    assert!(interior > 0, "should have some interior points");
    assert!(escaped > 0, "should have some escaped points");
    assert_eq!(interior + escaped, 8000);
}

#[test]
fn centre_of_even_window_is_origin() {
    let budget = IterationBudget::new(50).unwrap();
    let window =
        RenderWindow::<f64>::from_f64(Precision::default(), 4, 4, (0.0, 0.0), (4.0, 4.0)).unwrap();
    let counts = count_grid(&window, budget);
    // Pixel (2, 2) samples exactly 0 + 0i.
    assert_eq!(counts[2 * 4 + 2], 50);
    // Corner (0, 0) samples -2 + 2i, outside the radius-2 disc.
    assert_eq!(counts[0], 0);
}

#[test]
fn backends_agree_on_a_shallow_view() {
    let p = Precision::default();
    let budget = IterationBudget::new(64).unwrap();
    let f = RenderWindow::<f64>::from_f64(p, 32, 32, (1.5, 0.5), (1.0, 1.0)).unwrap();
    let d = RenderWindow::<DoubleDouble>::from_f64(p, 32, 32, (1.5, 0.5), (1.0, 1.0)).unwrap();
    // Everything here escapes within a few steps, so rounding cannot diverge.
    assert_eq!(count_grid(&f, budget), count_grid(&d, budget));
}

#[test]
fn headless_render_is_deterministic() {
    let budget = IterationBudget::new(200).unwrap();
    let window =
        RenderWindow::<f64>::from_f64(Precision::default(), 64, 48, (-0.5, 0.0), (3.0, 2.25))
            .unwrap();
    assert_eq!(count_grid(&window, budget), count_grid(&window, budget));
}
