
use approx::assert_abs_diff_eq;
use surface_pricer::{
    PricingError, SVIParams, SVISurface, VolatilitySource, DEFAULT_SURFACE_MATURITIES,
};
use test_utils::{maturity_ladder, strike_ladder, REFERENCE_RATE};

/// At-the-forward, six-month reference point: w(0) = a + b*sigma = 0.12, vol = sqrt(0.24)
#[test]
fn test_reference_atm_volatility() {
    let surface = SVISurface::default();
    let spot = 100.0;
    let maturity = 0.5;
    let forward = spot * (REFERENCE_RATE * maturity).exp();

    let vol = surface
        .implied_volatility(forward, spot, maturity, REFERENCE_RATE)
        .unwrap();
    assert_abs_diff_eq!(vol, 0.4899, epsilon = 1e-4);
    assert_abs_diff_eq!(vol, (0.12_f64 / 0.5).sqrt(), epsilon = 1e-12);
}

#[test]
fn test_total_variance_matches_closed_form() {
    let surface = SVISurface::new(SVIParams::new(0.02, 0.3, 0.25, 0.1, 0.15).unwrap()).unwrap();
    for &k in &[-1.0, -0.3, 0.0, 0.1, 0.4, 1.2] {
        let km = k - 0.1;
        let expected = 0.02 + 0.3 * (0.25 * km + (km * km + 0.15 * 0.15_f64).sqrt());
        assert_abs_diff_eq!(surface.total_variance(k), expected, epsilon = 1e-15);
    }
}

#[test]
fn test_implied_volatility_is_deterministic() {
    let surface = SVISurface::default();
    for &t in &maturity_ladder() {
        for &k in &strike_ladder() {
            let first = surface.implied_volatility(k, 100.0, t, REFERENCE_RATE).unwrap();
            let second = surface.implied_volatility(k, 100.0, t, REFERENCE_RATE).unwrap();
            assert_eq!(first.to_bits(), second.to_bits());
        }
    }
}

#[test]
fn test_volatility_scales_with_inverse_root_maturity() {
    // Same log-moneyness at both maturities when the rate is zero
    let surface = SVISurface::default();
    let short = surface.implied_volatility(90.0, 100.0, 0.25, 0.0).unwrap();
    let long = surface.implied_volatility(90.0, 100.0, 1.0, 0.0).unwrap();
    assert_abs_diff_eq!(short / long, 2.0, epsilon = 1e-12);
}

#[test]
fn test_domain_errors() {
    let surface = SVISurface::default();
    for (strike, spot) in [(0.0, 100.0), (-10.0, 100.0), (100.0, 0.0), (100.0, -1.0)] {
        let err = surface.implied_volatility(strike, spot, 1.0, 0.0).unwrap_err();
        assert!(matches!(err, PricingError::InputDomain(_)), "{:?}", err);
    }
    assert!(matches!(
        surface.implied_volatility(100.0, 100.0, -0.5, 0.0),
        Err(PricingError::InputDomain(_))
    ));
}

#[test]
fn test_negative_variance_is_a_parameter_consistency_error() {
    // w(0) = -0.2 + 0.1 * 0.1 < 0
    let params = SVIParams::new(-0.2, 0.1, 0.0, 0.0, 0.1).unwrap();
    let surface = SVISurface::new(params).unwrap();

    let err = surface.implied_volatility(100.0, 100.0, 1.0, 0.0).unwrap_err();
    match err {
        PricingError::ParameterConsistency {
            log_moneyness,
            total_variance,
        } => {
            assert_abs_diff_eq!(log_moneyness, 0.0, epsilon = 1e-15);
            assert_abs_diff_eq!(total_variance, -0.19, epsilon = 1e-12);
        }
        other => panic!("unexpected error {:?}", other),
    }

    // Far enough in the wings the variance is positive again
    assert!(surface.implied_volatility(1000.0, 100.0, 1.0, 0.0).is_ok());
}

#[test]
fn test_default_surface_grid() {
    let surface = SVISurface::default();
    let spot = 15500.0;
    let points = surface
        .generate_surface(spot, None, None, REFERENCE_RATE)
        .unwrap();

    assert_eq!(points.len(), 20 * DEFAULT_SURFACE_MATURITIES.len());

    // Maturity-major ordering
    for (i, point) in points.iter().enumerate() {
        assert_eq!(point.maturity, DEFAULT_SURFACE_MATURITIES[i / 20]);
        assert_abs_diff_eq!(point.moneyness, point.strike / spot, epsilon = 1e-15);
        assert!(point.implied_vol > 0.0);
    }
    assert_abs_diff_eq!(points[0].strike, 0.7 * spot, epsilon = 1e-9);
    assert_abs_diff_eq!(points[19].strike, 1.3 * spot, epsilon = 1e-9);
    assert_eq!(points[0].strike, points[20].strike);
}

#[test]
fn test_explicit_grid_shape() {
    let surface = SVISurface::default();

    let single = surface
        .generate_surface(100.0, Some(&[105.0][..]), Some(&[0.75][..]), 0.01)
        .unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].strike, 105.0);
    assert_eq!(single[0].maturity, 0.75);
    assert_eq!(
        single[0].implied_vol,
        surface.implied_volatility(105.0, 100.0, 0.75, 0.01).unwrap()
    );

    let strikes = [90.0, 100.0, 110.0];
    let maturities = [1.0, 0.5];
    let grid = surface
        .generate_surface(100.0, Some(&strikes[..]), Some(&maturities[..]), 0.01)
        .unwrap();
    let order: Vec<(f64, f64)> = grid.iter().map(|p| (p.maturity, p.strike)).collect();
    assert_eq!(
        order,
        vec![
            (1.0, 90.0),
            (1.0, 100.0),
            (1.0, 110.0),
            (0.5, 90.0),
            (0.5, 100.0),
            (0.5, 110.0),
        ]
    );

    let no_strikes: [f64; 0] = [];
    let empty = surface
        .generate_surface(100.0, Some(&no_strikes[..]), None, 0.01)
        .unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_grid_fails_on_first_inconsistent_point() {
    let surface = SVISurface::new(SVIParams::new(-0.2, 0.1, 0.0, 0.0, 0.1).unwrap()).unwrap();
    let result = surface.generate_surface(100.0, None, None, 0.0);
    assert!(matches!(
        result,
        Err(PricingError::ParameterConsistency { .. })
    ));
}

#[test]
fn test_surface_behind_trait_object() {
    let boxed: Box<dyn VolatilitySource> = Box::new(SVISurface::default());
    let direct = SVISurface::default()
        .implied_volatility(95.0, 100.0, 0.5, 0.02)
        .unwrap();
    assert_eq!(boxed.implied_volatility(95.0, 100.0, 0.5, 0.02).unwrap(), direct);
}
