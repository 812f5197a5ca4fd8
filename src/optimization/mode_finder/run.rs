//! Execution helper that drives an `argmin` Newton–CG solver on a
//! negative log-density and returns a crate-friendly [`ModeOutcome`].
use crate::optimization::{
    errors::{OptError, OptResult},
    mode_finder::{
        adapter::ArgMinAdapter,
        traits::{ModeOptions, ModeOutcome, NegLogDensity},
        types::{FnEvalMap, Grad, Hessian, Theta},
        validation::validate_mode,
    },
};
use argmin::core::{Executor, IterState, Solver, State};
use argmin_math::ArgminL2Norm;

/// Solver state used by Newton–CG over the crate's numeric types.
pub type NewtonState = IterState<Theta, Grad, (), Hessian, (), f64>;

/// Run a Newton–CG search for the minimizer of `problem`.
///
/// The solver is executed one Newton step at a time so the stopping rules
/// are evaluated on the crate's terms before every step:
/// - **gradient rule**: `‖∇n(x)‖ ≤ tol_grad` (an exactly zero gradient always
///   stops, since no descent direction exists);
/// - **cost rule**: `|n(x_k) − n(x_{k+1})| ≤ tol_cost`;
/// - **stall rule**: a step that changes the cost by no more than machine
///   precision relative to its magnitude ends the search; the objective
///   cannot be resolved any further in floating point.
///
/// # Feature flags
/// With `obs_slog` enabled and `opts.verbose == true`, a terminal slog
/// observer is attached to every step.
///
/// # Errors
/// - [`OptError::NotConverged`] when `opts.iteration_cap()` steps elapse
///   without a stopping rule firing.
/// - Objective failures (domain violations, non-finite values) and
///   backend errors (line-search failures) converted through
///   `From<argmin::core::Error>`.
pub fn run_newton_cg<'a, F, S>(
    x0: Theta, opts: &ModeOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<ModeOutcome>
where
    F: NegLogDensity,
    S: Solver<ArgMinAdapter<'a, F>, NewtonState> + Clone + Send + 'static,
{
    let max_iter = opts.iteration_cap();
    let tol_grad = opts.tols.tol_grad.unwrap_or(0.0);
    let mut fn_evals = FnEvalMap::new();

    let mut x = x0;
    let mut cost = problem.eval_cost(&x)?;
    let mut grad = problem.eval_gradient(&x)?;
    let mut grad_norm = grad.l2_norm();

    for iter in 0..max_iter {
        if grad_norm <= tol_grad {
            log::debug!("mode found after {iter} steps: n = {cost:.6e}, |g| = {grad_norm:.3e}");
            return ModeOutcome::new(
                Some(x),
                cost,
                "gradient tolerance reached",
                iter,
                fn_evals,
                grad_norm,
            );
        }

        let mut state = newton_step(x.clone(), cost, grad, opts, problem, solver.clone())?;
        for (name, count) in state.get_func_counts() {
            *fn_evals.entry(name.clone()).or_insert(0) += count;
        }
        let next = validate_mode(state.take_best_param())?;
        let next_cost = problem.eval_cost(&next)?;
        let change = (cost - next_cost).abs();

        x = next;
        cost = next_cost;
        grad = problem.eval_gradient(&x)?;
        grad_norm = grad.l2_norm();
        log::debug!("newton step {}: n = {cost:.6e}, |g| = {grad_norm:.3e}", iter + 1);

        if let Some(tol_cost) = opts.tols.tol_cost {
            if change <= tol_cost {
                return ModeOutcome::new(
                    Some(x),
                    cost,
                    "cost tolerance reached",
                    iter + 1,
                    fn_evals,
                    grad_norm,
                );
            }
        }
        if grad_norm > tol_grad && change <= f64::EPSILON * cost.abs().max(1.0) {
            log::debug!("mode search stalled at machine precision, |g| = {grad_norm:.3e}");
            return ModeOutcome::new(
                Some(x),
                cost,
                "stalled at machine precision",
                iter + 1,
                fn_evals,
                grad_norm,
            );
        }
    }

    if grad_norm <= tol_grad {
        return ModeOutcome::new(
            Some(x),
            cost,
            "gradient tolerance reached",
            max_iter,
            fn_evals,
            grad_norm,
        );
    }
    Err(OptError::NotConverged { iterations: max_iter, grad_norm })
}

// ---- Helper Methods ----

/// Execute a single Newton–CG iteration from `x` and return the final state.
///
/// The state is seeded with the already-known cost and gradient so the line
/// search starts from consistent values.
#[cfg_attr(not(feature = "obs_slog"), allow(unused_variables, unused_mut))]
fn newton_step<'a, F, S>(
    x: Theta, cost: f64, grad: Grad, opts: &ModeOptions, problem: ArgMinAdapter<'a, F>,
    solver: S,
) -> OptResult<NewtonState>
where
    F: NegLogDensity,
    S: Solver<ArgMinAdapter<'a, F>, NewtonState> + Send + 'static,
{
    let mut optimizer = Executor::new(problem, solver)
        .configure(|state| state.param(x).cost(cost).gradient(grad).max_iters(1));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    Ok(optimizer.run()?.state().clone())
}
