// tests/decoding_tests.rs

use osq::{
    DecoderConfig, EquationSolverPE, Matrix, MeasurementDecoder, OsqError, Solution, StateEncoder, Symbol,
    SymbolKind, Tolerance, check_normalization,
};
use proptest::prelude::*;

// Helper: the two-oscillator network used throughout the examples.
fn canonical(x_dot: Vec<f64>) -> Result<StateEncoder, OsqError> {
    let k = Matrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 1.0]])?;
    StateEncoder::new(1.0, k, vec![1.0, 1.0], vec![1.0, -1.0], x_dot)
}

// Helper: does any solution assign `expected` to `unknowns` (within `tol`)?
fn contains(solutions: &[Solution], unknowns: &[Symbol], expected: &[f64], tol: f64) -> bool {
    solutions.iter().any(|s| {
        s.values_for(unknowns)
            .is_some_and(|v| v.iter().zip(expected).all(|(a, b)| (a - b).abs() < tol))
    })
}

#[test]
fn test_round_trip_canonical_network() -> Result<(), OsqError> {
    let encoder = canonical(vec![0.0, 0.0])?;
    let probs = encoder.ideal_probabilities()?;

    let kinetic = MeasurementDecoder::new(&encoder).post_process_ke(&probs.out_probs_x, &probs.out_probs_comp)?;
    assert_eq!(kinetic.equations().len(), 2);
    let velocities = kinetic.unique_solution()?;
    assert_eq!(velocities.value(&Symbol::velocity(0)), Some(0.0));
    assert_eq!(velocities.value(&Symbol::velocity(1)), Some(0.0));

    let potential = EquationSolverPE::new(encoder.state()).post_process_pe(&probs.out_probs_comp)?;
    assert_eq!(potential.equations().len(), 3);
    let xs = Symbol::family(SymbolKind::Position, 2);
    assert!(contains(potential.solutions(), &xs, &[1.0, -1.0], 1e-9));
    // The potential branch cannot see the global sign of the positions.
    assert!(contains(potential.solutions(), &xs, &[-1.0, 1.0], 1e-9));
    assert_eq!(potential.solutions().len(), 2);
    Ok(())
}

#[test]
fn test_moving_oscillators_leave_sign_ambiguity() -> Result<(), OsqError> {
    let k = Matrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 1.0]])?;
    let encoder = StateEncoder::new(2.0, k, vec![1.0, 2.0], vec![0.0, 0.0], vec![1.0, 0.5])?;
    let probs = encoder.ideal_probabilities()?;
    let result = MeasurementDecoder::new(&encoder).post_process_ke(&probs.out_probs_x, &probs.out_probs_comp)?;

    // Four sign patterns solve the Hadamard equations; filtering keeps v and -v.
    let vs = Symbol::family(SymbolKind::Velocity, 2);
    assert_eq!(result.solutions().len(), 2);
    assert!(contains(result.solutions(), &vs, &[1.0, 0.5], 1e-9));
    assert!(contains(result.solutions(), &vs, &[-1.0, -0.5], 1e-9));
    assert!(matches!(
        result.unique_solution(),
        Err(OsqError::AmbiguousSolution { candidates: 2, .. })
    ));
    Ok(())
}

#[test]
fn test_eliminate_solution_is_idempotent() -> Result<(), OsqError> {
    let encoder = canonical(vec![0.5, -0.25])?;
    let probs = encoder.ideal_probabilities()?;
    let decoder = MeasurementDecoder::new(&encoder);
    let result = decoder.post_process_ke(&probs.out_probs_x, &probs.out_probs_comp)?;

    let once = result.solutions().to_vec();
    let twice = decoder.eliminate_solution(&probs.out_probs_comp, once.clone())?;
    assert_eq!(once, twice);
    let thrice = decoder.eliminate_solution(&probs.out_probs_comp, twice.clone())?;
    assert_eq!(twice, thrice);
    Ok(())
}

#[test]
fn test_zero_couplings_never_produce_equations() -> Result<(), OsqError> {
    // Ring of four with no self couplings and no (0,2), (1,3) springs.
    let k = Matrix::from_rows(vec![
        vec![0.0, 1.0, 0.0, 1.0],
        vec![1.0, 0.0, 1.0, 0.0],
        vec![0.0, 1.0, 0.0, 1.0],
        vec![1.0, 0.0, 1.0, 0.0],
    ])?;
    let encoder = StateEncoder::new(1.0, k.clone(), vec![1.0; 4], vec![0.5, -0.5, 0.25, 1.0], vec![0.0; 4])?;
    let probs = encoder.ideal_probabilities()?;
    let solver = EquationSolverPE::new(encoder.state());
    let result = solver.post_process_pe(&probs.out_probs_comp)?;

    // Only the four ring springs carry information.
    assert_eq!(result.equations().len(), 4);
    for eq in result.equations() {
        let coeffs = eq.lhs().form().coeffs();
        let touched: Vec<usize> = (0..4).filter(|&i| coeffs[i].abs() > 1e-12).collect();
        assert_eq!(touched.len(), 2, "equation {} is not a spring", eq);
        assert!(k.get(touched[0], touched[1]) > 0.0, "equation {} uses a zero coupling", eq);
    }
    // Differences only: a global shift stays free, so every solution is parametric.
    assert!(result.solutions().iter().all(|s| s.len() == 3));
    Ok(())
}

#[test]
fn test_non_power_of_two_rejected_before_equations() {
    let k = Matrix::from_fn(3, 3, |_, _| 1.0);
    let err = StateEncoder::new(1.0, k, vec![1.0; 3], vec![0.0; 3], vec![0.0; 3]).unwrap_err();
    assert!(matches!(err, OsqError::DimensionMismatch { .. }), "got {}", err);
}

#[test]
fn test_inconsistent_measurements_report_no_solution() -> Result<(), OsqError> {
    let encoder = canonical(vec![0.0, 0.0])?;
    let decoder = MeasurementDecoder::new(&encoder);
    // Negative probability: no real root.
    let err = decoder.post_process_ke(&[-0.5, 0.0], &[0.0, 0.0]).unwrap_err();
    assert!(matches!(err, OsqError::NoSolution { .. }));
    // Solvable, but no candidate reproduces the computational probabilities.
    let err = decoder.post_process_ke(&[0.5, 0.0], &[0.0, 0.0]).unwrap_err();
    assert!(matches!(err, OsqError::NoSolution { .. }));

    let solver = EquationSolverPE::new(encoder.state());
    // x0^2 / 2 = 0.5 and x1^2 / 2 = 0.5 contradict (x0 - x1)^2 / 2 = 8.
    let err = solver.post_process_pe(&[0.0, 0.0, 0.5, 8.0, 0.5, 0.0, 0.0, 0.0]).unwrap_err();
    assert!(matches!(err, OsqError::NoSolution { .. }));
    Ok(())
}

#[test]
fn test_non_finite_measurements_rejected() -> Result<(), OsqError> {
    let encoder = canonical(vec![0.0, 0.0])?;
    let decoder = MeasurementDecoder::new(&encoder);
    let solver = EquationSolverPE::new(encoder.state());

    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = decoder.post_process_ke(&[bad, bad], &[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, OsqError::InvalidProbability { index: 0, .. }), "got {}", err);
        let err = decoder.post_process_ke(&[0.0, 0.0], &[0.0, bad]).unwrap_err();
        assert!(matches!(err, OsqError::InvalidProbability { index: 1, .. }), "got {}", err);

        // Slot 3 is the (0, 1) spring term of the potential slice.
        let err = solver
            .post_process_pe(&[0.0, 0.0, 0.5, bad, 0.5, 0.0, 0.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, OsqError::InvalidProbability { index: 3, .. }), "got {}", err);
        let err = solver.eq_association(&[0.5, 2.0, bad]).unwrap_err();
        assert!(matches!(err, OsqError::InvalidProbability { index: 2, .. }), "got {}", err);
    }
    // Entries past the slices the decoders read are ignored.
    let probs = encoder.ideal_probabilities()?;
    let mut comp = probs.out_probs_comp.clone();
    comp[7] = f64::NAN;
    solver.post_process_pe(&comp)?;
    Ok(())
}

#[test]
fn test_configured_tolerance_accepts_noisy_data() -> Result<(), OsqError> {
    let encoder = canonical(vec![0.5, -0.25])?;
    let probs = encoder.ideal_probabilities()?;
    let noisy: Vec<f64> = probs.out_probs_comp.iter().map(|p| p * 1.001).collect();

    let strict = MeasurementDecoder::new(&encoder);
    assert!(matches!(
        strict.post_process_ke(&probs.out_probs_x, &noisy),
        Err(OsqError::NoSolution { .. })
    ));

    let loose = MeasurementDecoder::with_config(&encoder, DecoderConfig::with_tolerance(Tolerance::new(1e-2, 1e-6)));
    let result = loose.post_process_ke(&probs.out_probs_x, &noisy)?;
    assert!(contains(result.solutions(), &Symbol::family(SymbolKind::Velocity, 2), &[0.5, -0.25], 1e-9));
    Ok(())
}

#[test]
fn test_energy_normalization() -> Result<(), OsqError> {
    let k = Matrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 1.0]])?;
    let unscaled = StateEncoder::new(1.0, k.clone(), vec![1.0, 1.0], vec![1.0, -1.0], vec![0.0, 0.0])?;
    let total = unscaled.total_energy();
    assert!((total - 3.0).abs() < 1e-12);
    assert!(check_normalization(&unscaled.evaluate(), None).is_err());

    let scaled = StateEncoder::new(total, k, vec![1.0, 1.0], vec![1.0, -1.0], vec![0.0, 0.0])?;
    check_normalization(&scaled.evaluate(), None)?;
    Ok(())
}

#[test]
fn test_result_serializes_with_named_keys() -> Result<(), Box<dyn std::error::Error>> {
    let encoder = canonical(vec![0.0, 0.0])?;
    let probs = encoder.ideal_probabilities()?;
    let result = MeasurementDecoder::new(&encoder).post_process_ke(&probs.out_probs_x, &probs.out_probs_comp)?;

    let json = serde_json::to_value(&result)?;
    assert_eq!(json["Equations"].as_array().map(Vec::len), Some(2));
    assert!(json["Equations"][0].as_str().is_some_and(|s| s.contains("v0")));
    assert_eq!(json["Solutions"][0]["v0"].as_f64(), Some(0.0));
    assert_eq!(json["Solutions"][0]["v1"].as_f64(), Some(0.0));

    let config: DecoderConfig = serde_json::from_str(r#"{"tolerance": {"rtol": 0.001}}"#)?;
    assert_eq!(config.tolerance.rtol, 0.001);
    assert_eq!(config.tolerance.atol, Tolerance::default().atol);
    Ok(())
}

// Helper: (qubits, raw couplings, masses, positions, velocities, energy).
fn system() -> impl Strategy<Value = (u32, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, f64)> {
    (1u32..3).prop_flat_map(|q| {
        let n = 1usize << q;
        (
            Just(q),
            prop::collection::vec(0.5f64..3.0, n * n),
            prop::collection::vec(0.5f64..4.0, n),
            prop::collection::vec(-2.0f64..2.0, n),
            prop::collection::vec(-2.0f64..2.0, n),
            0.5f64..5.0,
        )
    })
}

proptest! {
    #[test]
    fn decoders_recover_initial_conditions((q, raw, masses, x, v, energy) in system()) {
        let n = 1usize << q;
        let k = Matrix::from_fn(n, n, |r, c| (raw[r * n + c] + raw[c * n + r]) / 2.0);
        let encoder = StateEncoder::new(energy, k, masses, x.clone(), v.clone()).unwrap();
        let probs = encoder.ideal_probabilities().unwrap();
        // Probabilities below atol are read as exact zeros; keep clear of that band.
        prop_assume!(probs.out_probs_x[..n].iter().all(|p| *p > 1e-6));
        prop_assume!(probs.out_probs_comp[..n * (n + 3) / 2].iter().all(|p| *p > 1e-6));

        let kinetic = MeasurementDecoder::new(&encoder)
            .post_process_ke(&probs.out_probs_x, &probs.out_probs_comp)
            .unwrap();
        let vs = Symbol::family(SymbolKind::Velocity, n);
        prop_assert!(contains(kinetic.solutions(), &vs, &v, 1e-3));

        let potential = EquationSolverPE::new(encoder.state())
            .post_process_pe(&probs.out_probs_comp)
            .unwrap();
        let xs = Symbol::family(SymbolKind::Position, n);
        prop_assert!(contains(potential.solutions(), &xs, &x, 1e-3));
    }
}
