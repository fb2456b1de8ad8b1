use approx::assert_abs_diff_eq;
use fslinalg::{cross, outer, transpose, Dense, DenseExt, Unit};
use num_complex::Complex64;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn matrix(rows: usize, cols: usize, data: &[f64]) -> Dense<f64> {
    Dense::from_row_major(rows, cols, data.to_vec()).unwrap()
}

fn a6() -> Dense<f64> {
    matrix(
        6,
        6,
        &[
            2., 1., 3., 4., 6., 5., //
            7., 8., 4., 8., 5., 9., //
            2., 4., 2., 2., 0., 5., //
            1., 8., 4., 5., 2., 0., //
            1., 9., 5., 4., 6., 9., //
            3., 5., 2., 6., 8., 9.,
        ],
    )
}

fn b6() -> Dense<f64> {
    matrix(
        6,
        6,
        &[
            6., 2., 3., 4., 7., 1., //
            7., 6., 7., 9., 6., 3., //
            7., 2., 6., 1., 4., 5., //
            2., 4., 0., 7., 1., 5., //
            3., 2., 5., 8., 2., 0., //
            7., 0., 9., 3., 3., 7.,
        ],
    )
}

#[test]
fn test_cross_into_operand() {
    let a = Dense::vector(vec![2., 3., 1.]);
    let b = Dense::vector(vec![4., 6., 5.]);
    let expected = Dense::vector(vec![-18., 12., 0.]);

    let c = Dense::zeros(3, 1);
    c.assign(-2.0_f64 * cross(&a, &b).unwrap()).unwrap();
    assert_eq!(c, expected);

    a.assign(-2.0_f64 * cross(&a, &b).unwrap()).unwrap();
    assert_eq!(a, expected);
}

#[test]
fn test_outer_times_vector_into_operand() {
    let e0 = Unit::vector(3, 0).unwrap();
    let a = Dense::vector(vec![2., 3., 0.]);
    let expected = Dense::vector(vec![6.5, 0., 0.]);

    let e = (0.5_f64 * outer(e0, &a).unwrap() * &a).unwrap();
    assert_eq!(e, expected);

    a.assign(e).unwrap();
    assert_eq!(a, expected);
}

#[test]
fn test_outer_times_vector_size_four() {
    let e0 = Unit::vector(4, 0).unwrap();
    let a = Dense::vector(vec![2., 3., 0.]);
    let y = Dense::zeros(4, 1);
    y.assign((0.5_f64 * outer(e0, &a).unwrap() * &a).unwrap()).unwrap();
    assert_eq!(y.to_vec(), vec![6.5, 0., 0., 0.]);
}

#[test]
fn test_transpose_into_operand() {
    let a = a6();
    let expected = matrix(
        6,
        6,
        &[
            2., 7., 2., 1., 1., 3., //
            1., 8., 4., 8., 9., 5., //
            3., 4., 2., 4., 5., 2., //
            4., 8., 2., 5., 4., 6., //
            6., 5., 0., 2., 6., 8., //
            5., 9., 5., 0., 9., 9.,
        ],
    );

    assert_eq!(transpose(&a), expected);
    a.assign(transpose(&a)).unwrap();
    assert_eq!(a, expected);
}

#[test]
fn test_product_into_operand() {
    let a = a6();
    let b = b6();
    let expected = matrix(
        6,
        6,
        &[
            101., 44., 106., 111., 63., 75., //
            220., 112., 207., 227., 158., 154., //
            93., 40., 91., 75., 63., 69., //
            106., 82., 93., 131., 80., 70., //
            193., 94., 207., 193., 124., 136., //
            166., 80., 177., 192., 108., 121.,
        ],
    );

    a.assign((a.expr() * &b).unwrap()).unwrap();
    assert_eq!(a, expected);
}

#[test]
fn test_product_into_right_operand() {
    let a = a6();
    let b = b6();
    let expected = (a.expr() * &b).unwrap().evaluate();
    b.assign((a.expr() * &b).unwrap()).unwrap();
    assert_eq!(b, expected);
}

#[test]
fn test_sum_of_product_and_destination() {
    let a = a6();
    let b = b6();
    let expected = ((a.expr() * &b).unwrap() + &a).unwrap().evaluate();
    a.assign(((a.expr() * &b).unwrap() + &a).unwrap()).unwrap();
    assert_eq!(a, expected);

    // the destination on the left of the sum is safe as well
    let a = a6();
    let expected = (a.expr() - (a.expr() * &b).unwrap()).unwrap().evaluate();
    a.assign((a.expr() - (a.expr() * &b).unwrap()).unwrap()).unwrap();
    assert_eq!(a, expected);
}

#[test]
fn test_increment_through_transposed_product() {
    let a = a6();
    let b = b6();
    let before = a.clone();
    let ab_t = (a.expr() * &b).unwrap().evaluate();
    a.incr(transpose((a.expr() * &b).unwrap())).unwrap();
    for i in 0..6 {
        for j in 0..6 {
            assert_eq!(a.get(i, j), before.get(i, j) + ab_t.get(j, i));
        }
    }
}

/// Evaluating into a leaf the expression reads must match evaluating into a
/// fresh temporary.
#[test]
fn test_self_assignment_matches_temporary() {
    let mut rng = StdRng::seed_from_u64(7);
    let random = |rng: &mut StdRng, r: usize, c: usize| {
        Dense::from_fn(r, c, |_, _| rng.gen_range(-4..=4) as f64)
    };

    for _ in 0..20 {
        let n = rng.gen_range(1..=5);
        let b = random(&mut rng, n, n);
        let x = random(&mut rng, n, 1);
        // X := X * B
        let dst = random(&mut rng, n, n);
        let want = (dst.expr() * &b).unwrap().evaluate();
        dst.assign((dst.expr() * &b).unwrap()).unwrap();
        assert_eq!(dst, want);

        // X := B^T * X^T + X
        let dst = random(&mut rng, n, n);
        let e = || ((b.expr().transpose() * transpose(&dst)).unwrap() + &dst).unwrap();
        let want = e().evaluate();
        dst.assign(e()).unwrap();
        assert_eq!(dst, want);

        // x := 2 B x - x
        let dst = x.clone();
        let e = || ((2.0_f64 * b.expr() * &dst).unwrap() - &dst).unwrap();
        let want = e().evaluate();
        dst.assign(e()).unwrap();
        assert_eq!(dst, want);
    }
}

#[test]
fn test_adjoint_product_complex() {
    let a = Dense::from_fn(3, 2, |i, j| Complex64::new(i as f64, j as f64 - 1.0));
    let c = Dense::zeros(2, 2);
    c.assign((a.expr().adjoint() * &a).unwrap()).unwrap();
    // a^H a is Hermitian with a real diagonal
    for i in 0..2 {
        assert_abs_diff_eq!(c.get(i, i).im, 0.0);
        for j in 0..2 {
            assert_eq!(c.get(i, j), c.get(j, i).conj());
        }
    }
    // column 0 of a is [-i, 1 - i, 2 - i]: |.|^2 = 1 + 2 + 5
    assert_abs_diff_eq!(c.get(0, 0).re, 8.0);
}
