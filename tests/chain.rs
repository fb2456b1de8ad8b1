use fslinalg::{keep_brackets, outer, transpose, Bracketing, Dense, DenseExt, Expr, Unit};

fn matrix(rows: usize, cols: usize, data: &[f64]) -> Dense<f64> {
    Dense::from_row_major(rows, cols, data.to_vec()).unwrap()
}

struct General {
    a: Dense<f64>,
    b: Dense<f64>,
    c: Dense<f64>,
    d: Dense<f64>,
    expected: Dense<f64>,
}

fn general() -> General {
    let a = matrix(
        12,
        3,
        &[
            2., 7., 0., 3., 3., 4., 9., 3., 7., 9., 6., 4., 7., 1., 1., 9., 0., 4., //
            8., 8., 7., 1., 1., 9., 4., 1., 3., 7., 4., 2., 4., 2., 2., 2., 3., 8.,
        ],
    );
    let b = matrix(
        3,
        8,
        &[
            9., 0., 4., 4., 2., 0., 6., 5., //
            7., 0., 6., 4., 1., 4., 1., 3., //
            3., 9., 2., 2., 5., 4., 2., 9.,
        ],
    );
    let c = matrix(
        8,
        5,
        &[
            8., 1., 4., 3., 5., //
            0., 3., 0., 7., 2., //
            5., 2., 3., 1., 9., //
            1., 7., 5., 0., 5., //
            7., 7., 3., 8., 2., //
            1., 6., 6., 1., 2., //
            6., 4., 1., 7., 3., //
            2., 4., 5., 4., 8.,
        ],
    );
    let d = matrix(5, 2, &[2., 4., 1., 8., 6., 1., 2., 9., 1., 9.]);
    let expected = matrix(
        12,
        2,
        &[
            11504., 30045., 14138., 40118., 27308., 78125., 26402., 73571., //
            12756., 35823., 18986., 54677., 32062., 89869., 16504., 49153., //
            11554., 33154., 18002., 49937., 11252., 31636., 18864., 54785.,
        ],
    );
    General { a, b, c, d, expected }
}

fn abcd(g: &General) -> Expr<'_, f64> {
    (((g.a.expr() * &g.b).unwrap() * &g.c).unwrap() * &g.d).unwrap()
}

#[test]
fn test_general_chain() {
    let g = general();
    let expr = abcd(&g);

    assert_eq!(expr.chain_dims(), Some(vec![12, 3, 8, 5, 2]));
    assert_eq!(expr.optimal_cost(), Some(200));
    assert_eq!(expr.optimal_split(), Some(1));
    assert!(!expr.is_optimally_bracketed());

    let result = Dense::zeros(12, 2);
    result.assign(&expr).unwrap();
    assert_eq!(result, g.expected);

    let rebracketed = expr.rebracketed().unwrap();
    assert!(rebracketed.is_optimally_bracketed());
    assert_eq!(rebracketed, g.expected);

    let pinned = keep_brackets(abcd(&g)).unwrap();
    assert_eq!(pinned, g.expected);
}

#[test]
fn test_pinned_subchain_is_one_operand() {
    let g = general();
    let bc = keep_brackets((g.b.expr() * &g.c).unwrap()).unwrap();
    let expr = ((g.a.expr() * bc).unwrap() * &g.d).unwrap();
    assert_eq!(expr.chain_dims(), Some(vec![12, 3, 5, 2]));
    assert_eq!(expr, g.expected);
}

#[test]
fn test_matrix_vector_chains() {
    let a = matrix(
        6,
        5,
        &[
            2., 1., 3., 4., 6., 7., 8., 4., 8., 5., 2., 4., 2., 2., 0., //
            1., 8., 4., 5., 2., 1., 9., 5., 4., 6., 3., 5., 2., 6., 8.,
        ],
    );
    let x = Dense::vector(vec![2., 6., 3., 7., 5.]);
    let expr = (a.expr() * &x).unwrap();
    assert_eq!(expr.chain_dims(), Some(vec![6, 5, 1]));
    assert_eq!(expr.optimal_cost(), Some(30));
    assert_eq!(expr.optimal_split(), Some(1));
    assert!(expr.is_optimally_bracketed());

    let y = Dense::vector(vec![2., 6., 3., 7., 5., 1.]);
    let expr = (0.5_f64 * transpose(&a) * &y).unwrap();
    assert_eq!(expr.chain_dims(), Some(vec![5, 6, 1]));
    assert_eq!(expr.optimal_cost(), Some(30));
    assert!(expr.is_optimally_bracketed());
}

fn outer_chain_case(grouped: bool) {
    let e0 = Unit::vector(4, 0).unwrap();
    let a = Dense::vector(vec![2., 3., 0.]);

    let ae = || outer(&a, e0).unwrap();
    let ea = || outer(e0, &a).unwrap();
    let expr = if grouped {
        ((transpose(&a) * (ae() * ea()).unwrap()).unwrap() * &a).unwrap()
    } else {
        (((transpose(&a) * ae()).unwrap() * ea()).unwrap() * &a).unwrap()
    };

    assert_eq!(expr.chain_dims(), Some(vec![1, 3, 1, 4, 1, 3, 1]));
    assert_eq!(expr.optimal_cost(), Some(12));
    assert_eq!(expr.optimal_split(), Some(2));
    assert!(!expr.is_optimally_bracketed());

    let rebracketed = expr.rebracketed().unwrap();
    let explicit = ((transpose(&a) * &a).unwrap()
        * ((transpose(e0) * e0).unwrap() * (transpose(&a) * &a).unwrap()).unwrap())
    .unwrap();
    assert!(explicit.is_optimally_bracketed());
    assert_eq!(rebracketed.chain_dims(), explicit.chain_dims());
    assert_eq!(rebracketed, matrix(1, 1, &[169.]));
    assert_eq!(expr, matrix(1, 1, &[169.]));
}

#[test]
fn test_outer_products_without_brackets() {
    outer_chain_case(false);
}

#[test]
fn test_outer_products_with_wrong_brackets() {
    outer_chain_case(true);
}

#[test]
fn test_literal_and_rebracketed_agree_on_integers() {
    let dims = [3, 7, 1, 6, 2, 5];
    let mats: Vec<Dense<f64>> = dims
        .windows(2)
        .enumerate()
        .map(|(k, w)| Dense::from_fn(w[0], w[1], |i, j| ((i * 3 + j * 5 + k) % 7) as f64 - 3.))
        .collect();

    let mut literal = mats[0].expr();
    let mut free = mats[0].expr();
    for m in &mats[1..] {
        literal = keep_brackets((literal * m).unwrap()).unwrap();
        free = (free * m).unwrap();
    }
    assert_eq!(
        free.optimal_cost().unwrap(),
        fslinalg::ChainPlan::new(&dims).unwrap().optimal_cost()
    );
    assert!(free.optimal_cost().unwrap() < Bracketing::left_associative(5).cost(&dims));
    assert_eq!(literal.evaluate(), free.evaluate());
}

/// 1x1 factors whose two bracketings round differently.
fn rounding_chain() -> [Dense<f64>; 3] {
    [
        Dense::vector(vec![0.1]),
        Dense::vector(vec![0.2]),
        Dense::vector(vec![0.3]),
    ]
}

#[test]
fn test_evaluation_with_rebracketing_switched_off() {
    let [a, b, c] = rounding_chain();
    let literal = || ((a.expr() * &b).unwrap() * &c).unwrap();
    // equal-cost ties go to the lowest split, so the optimizer picks a (b c)
    assert_eq!(literal().optimal_split(), Some(1));
    assert!(!literal().is_optimally_bracketed());

    let ab = keep_brackets((a.expr() * &b).unwrap()).unwrap();
    let pinned = keep_brackets((ab * &c).unwrap()).unwrap().evaluate();
    let regrouped = (a.expr() * (b.expr() * &c).unwrap()).unwrap().evaluate();
    assert_eq!(pinned.at(0), 0.1 * 0.2 * 0.3);
    assert_eq!(regrouped.at(0), 0.1 * (0.2 * 0.3));
    assert_ne!(pinned.at(0), regrouped.at(0));

    let y = Dense::zeros(1, 1);
    fslinalg::config::with_rebracketing(false, || y.assign(literal())).unwrap();
    assert_eq!(y.at(0), pinned.at(0));
    // introspection still reports the plan
    fslinalg::config::with_rebracketing(false, || {
        assert_eq!(literal().optimal_cost(), Some(2));
        assert!(!literal().is_optimally_bracketed());
    });

    fslinalg::config::with_rebracketing(true, || y.assign(literal())).unwrap();
    assert_eq!(y.at(0), regrouped.at(0));
}
