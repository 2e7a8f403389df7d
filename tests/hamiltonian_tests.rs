// tests/hamiltonian_tests.rs

use osq::hamiltonian::{coupling_matrix, hamiltonian_matrix, incidence_matrix};
use osq::{HamiltonianBuilder, Matrix, OsqError, check_hermitian};
use proptest::prelude::*;

// Helper: symmetric K from an arbitrary n*n sample.
fn symmetric(n: usize, raw: &[f64]) -> Matrix<f64> {
    Matrix::from_fn(n, n, |r, c| (raw[r * n + c] + raw[c * n + r]) / 2.0)
}

// Helper: (qubits, raw couplings, masses) for N = 1, 2 or 4 oscillators.
fn network() -> impl Strategy<Value = (u32, Vec<f64>, Vec<f64>)> {
    (0u32..3).prop_flat_map(|q| {
        let n = 1usize << q;
        (
            Just(q),
            prop::collection::vec(0.0f64..5.0, n * n),
            prop::collection::vec(0.1f64..10.0, n),
        )
    })
}

proptest! {
    #[test]
    fn hamiltonian_is_hermitian_with_zero_diagonal_blocks((q, raw, masses) in network()) {
        let n = 1usize << q;
        let builder = HamiltonianBuilder::new(q, symmetric(n, &raw), masses).unwrap();
        let h = builder.compute_hamiltonian().unwrap();
        let half = n * n;

        prop_assert_eq!(h.rows(), 2 * half);
        prop_assert!(check_hermitian(&h, None).is_ok());
        prop_assert!(h.block(0, 0, half, half).is_zero());
        prop_assert!(h.block(half, half, half, half).is_zero());
    }

    #[test]
    fn incidence_factorizes_mass_weighted_laplacian((q, raw, masses) in network()) {
        // B B^H = M^-1/2 F M^-1/2
        let n = 1usize << q;
        let k = symmetric(n, &raw);
        let incidence = incidence_matrix(&k, &masses).unwrap();
        let product = incidence.b().matmul(incidence.b_dagger()).unwrap();
        let f = coupling_matrix(&k);
        for r in 0..n {
            for c in 0..n {
                let expected = f.get(r, c) / (masses[r] * masses[c]).sqrt();
                prop_assert!((product.get(r, c).re - expected).abs() < 1e-9);
                prop_assert!(product.get(r, c).im.abs() < 1e-12);
            }
        }
    }
}

#[test]
fn test_four_oscillator_chain() -> Result<(), OsqError> {
    // Nearest-neighbour chain with walls at both ends.
    let k = Matrix::from_rows(vec![
        vec![1.0, 1.0, 0.0, 0.0],
        vec![1.0, 0.0, 1.0, 0.0],
        vec![0.0, 1.0, 0.0, 1.0],
        vec![0.0, 0.0, 1.0, 1.0],
    ])?;
    let builder = HamiltonianBuilder::new(2, k, vec![1.0, 2.0, 1.0, 2.0])?;
    assert_eq!(builder.num_oscillators(), 4);
    assert_eq!(builder.dimension(), 32);

    let incidence = builder.compute_b()?;
    assert_eq!((incidence.b().rows(), incidence.b().cols()), (4, 10));
    let h = builder.compute_hamiltonian()?;
    assert_eq!(h, hamiltonian_matrix(incidence.b())?);
    check_hermitian(&h, None)?;

    // Rows of the padded B beyond N are structural zeros.
    assert!(h.block(4, 16, 12, 16).is_zero());
    Ok(())
}

#[test]
fn test_invalid_mass_detected_before_assembly() {
    let k = Matrix::from_fn(2, 2, |_, _| 1.0);
    for bad in [0.0, -1.0, f64::INFINITY] {
        match HamiltonianBuilder::new(1, k.clone(), vec![1.0, bad]) {
            Err(OsqError::InvalidMass { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidMass for m = {}, got {:?}", bad, other),
        }
    }
}

#[test]
fn test_asymmetric_coupling_rejected() -> Result<(), OsqError> {
    let k = Matrix::from_rows(vec![vec![1.0, 0.5], vec![0.25, 1.0]])?;
    let err = HamiltonianBuilder::new(1, k, vec![1.0, 1.0]).unwrap_err();
    assert!(matches!(err, OsqError::InvalidCoupling { .. }), "got {}", err);
    Ok(())
}
