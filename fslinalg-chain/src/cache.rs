//! Per-thread memoization of chain plans.
//!
//! Expressions are evaluated on the thread that built them and a plan depends
//! only on the dimension sequence, so the cache is a plain thread-local map
//! keyed by `dims`. With the `plan-cache` feature disabled every lookup
//! recomputes the plan.

use std::rc::Rc;

use crate::plan::ChainPlan;
use crate::Result;

#[cfg(feature = "plan-cache")]
use std::{cell::RefCell, collections::HashMap};

/// The cache is cleared when it grows past this many distinct chains.
#[cfg(feature = "plan-cache")]
const MAX_CACHED_PLANS: usize = 1024;

#[cfg(feature = "plan-cache")]
thread_local! {
    static PLAN_CACHE: RefCell<HashMap<Vec<usize>, Rc<ChainPlan>>> = RefCell::new(HashMap::new());
}

/// Plan for `dims`, computed at most once per thread.
#[cfg(feature = "plan-cache")]
pub fn cached_plan(dims: &[usize]) -> Result<Rc<ChainPlan>> {
    if let Some(plan) = PLAN_CACHE.with(|cache| cache.borrow().get(dims).cloned()) {
        return Ok(plan);
    }
    let plan = Rc::new(ChainPlan::new(dims)?);
    PLAN_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if cache.len() >= MAX_CACHED_PLANS {
            cache.clear();
        }
        cache.insert(dims.to_vec(), Rc::clone(&plan));
    });
    Ok(plan)
}

#[cfg(not(feature = "plan-cache"))]
pub fn cached_plan(dims: &[usize]) -> Result<Rc<ChainPlan>> {
    Ok(Rc::new(ChainPlan::new(dims)?))
}

/// Drop every cached plan of the current thread.
pub fn clear_plan_cache() {
    #[cfg(feature = "plan-cache")]
    PLAN_CACHE.with(|cache| cache.borrow_mut().clear());
}

/// Number of plans cached on the current thread.
pub fn plan_cache_len() -> usize {
    #[cfg(feature = "plan-cache")]
    {
        PLAN_CACHE.with(|cache| cache.borrow().len())
    }
    #[cfg(not(feature = "plan-cache"))]
    {
        0
    }
}
