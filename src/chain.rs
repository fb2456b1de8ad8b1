//! Matrix-chain analysis of product trees.
//!
//! A product tree is flattened into its ordered operands and `n + 1`
//! dimension sequence. Free product nodes are descended into, and so are
//! outer products, which contribute `u` and `v^T` as two operands. Every
//! other node, pinned products included, is a single opaque operand. The
//! optimizer's bracketing is then compared structurally against the tree's
//! own, and the tree is rebuilt when they differ.

use log::debug;
use smallvec::SmallVec;

use fslinalg_chain::{cached_plan, Bracketing, ChainPlan};
use fslinalg_traits::Scalar;

use crate::config::rebracketing_enabled;
use crate::expr::{Brackets, Expr, ExprKind};

type SVec<T> = SmallVec<[T; 8]>;

/// One flattened chain operand.
enum Link<'s, T> {
    Plain(&'s Expr<'s, T>),
    /// Right factor of an outer product, used as a row vector.
    Transposed(&'s Expr<'s, T>),
}

impl<T> Clone for Link<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Link<'_, T> {}

impl<'s, T> Link<'s, T> {
    fn rows(&self) -> usize {
        match self {
            Link::Plain(e) => e.rows(),
            Link::Transposed(e) => e.cols(),
        }
    }

    fn cols(&self) -> usize {
        match self {
            Link::Plain(e) => e.cols(),
            Link::Transposed(e) => e.rows(),
        }
    }

    fn rebuild(self) -> Expr<'s, T> {
        match self {
            Link::Plain(e) => Expr::reference(e),
            Link::Transposed(e) => Expr::reference(e).transpose(),
        }
    }
}

/// Flattened product chain.
pub(crate) struct Chain<'s, T> {
    links: SVec<Link<'s, T>>,
    dims: SVec<usize>,
    /// Bracketing of the tree as written.
    bracketing: Bracketing,
}

impl<'s, T> Chain<'s, T> {
    /// Flatten a product node; `None` for any other node.
    pub(crate) fn of(root: &'s Expr<'s, T>) -> Option<Self> {
        let (lhs, rhs) = match &root.kind {
            ExprKind::Ref(e) => return Self::of(e),
            ExprKind::Product { lhs, rhs, .. } | ExprKind::MatVec { lhs, rhs, .. } => (lhs, rhs),
            _ => return None,
        };
        let mut links = SVec::new();
        let left = flatten(lhs, &mut links);
        let right = flatten(rhs, &mut links);

        let mut dims = SVec::with_capacity(links.len() + 1);
        dims.push(links[0].rows());
        dims.extend(links.iter().map(Link::cols));

        Some(Self {
            links,
            dims,
            bracketing: Bracketing::product(left, right),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    pub(crate) fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub(crate) fn plan(&self) -> Option<std::rc::Rc<ChainPlan>> {
        cached_plan(&self.dims).ok()
    }

    /// Rebuild the chain in the shape of `bracketing`. The rebuilt tree
    /// borrows the operands of the flattened tree.
    pub(crate) fn rebuild(&self, bracketing: &Bracketing) -> Expr<'s, T> {
        match bracketing {
            Bracketing::Operand(i) => self.links[*i].rebuild(),
            Bracketing::Product(l, r) => {
                Expr::product_node(self.rebuild(l), self.rebuild(r), Brackets::Planned)
            }
        }
    }
}

/// Append the operands of `e` to `links`; returns the bracketing they form.
fn flatten<'s, T>(e: &'s Expr<'s, T>, links: &mut SVec<Link<'s, T>>) -> Bracketing {
    match &e.kind {
        ExprKind::Product { lhs, rhs, brackets }
        | ExprKind::MatVec { lhs, rhs, brackets }
            if *brackets != Brackets::Pinned =>
        {
            let l = flatten(lhs, links);
            let r = flatten(rhs, links);
            Bracketing::product(l, r)
        }
        ExprKind::Outer(u, v) => {
            let i = links.len();
            links.push(Link::Plain(u));
            links.push(Link::Transposed(v));
            Bracketing::product(Bracketing::Operand(i), Bracketing::Operand(i + 1))
        }
        _ => {
            links.push(Link::Plain(e));
            Bracketing::Operand(links.len() - 1)
        }
    }
}

/// Optimally bracketed replacement for a free product node, or `None` when
/// the node is already optimal, too short to re-associate or rebracketing
/// is switched off.
pub(crate) fn rebracket<'s, T: Scalar>(node: &'s Expr<'_, T>) -> Option<Expr<'s, T>> {
    if !rebracketing_enabled() {
        return None;
    }
    let chain = Chain::of(node)?;
    if chain.len() < 3 {
        return None;
    }
    let plan = chain.plan()?;
    let optimal = plan.bracketing();
    if optimal == chain.bracketing {
        return None;
    }
    debug!(
        "rebracketing chain {:?}: {} -> {} (cost {} -> {})",
        chain.dims(),
        chain.bracketing,
        optimal,
        chain.bracketing.cost(chain.dims()),
        plan.optimal_cost(),
    );
    Some(chain.rebuild(&optimal))
}

impl<T> Expr<'_, T> {
    /// `n + 1` dimensions of the product chain rooted here; `None` unless
    /// this is a product.
    pub fn chain_dims(&self) -> Option<Vec<usize>> {
        Chain::of(self).map(|c| c.dims().to_vec())
    }

    /// Minimal multiplication count over all bracketings of the chain.
    pub fn optimal_cost(&self) -> Option<u64> {
        Some(Chain::of(self)?.plan()?.optimal_cost())
    }

    /// Top-level split of the optimal bracketing.
    pub fn optimal_split(&self) -> Option<usize> {
        Some(Chain::of(self)?.plan()?.optimal_split())
    }

    /// Whether the tree as written is the optimizer's bracketing. Anything
    /// that is not a product is trivially optimal.
    pub fn is_optimally_bracketed(&self) -> bool {
        let Some(chain) = Chain::of(self) else {
            return true;
        };
        match chain.plan() {
            Some(plan) => plan.bracketing() == chain.bracketing,
            None => true,
        }
    }

    /// The chain rebuilt in its optimal bracketing, borrowing this tree's
    /// operands; `None` unless this is a product.
    pub fn rebracketed(&self) -> Option<Expr<'_, T>> {
        let chain = Chain::of(self)?;
        let plan = chain.plan()?;
        Some(chain.rebuild(&plan.bracketing()))
    }
}
