//! Minimum-cost bipartite assignment
//!
//! Both solvers take a cost matrix with one row per item to place and one
//! column per slot, with `rows <= cols`, and return the column chosen for
//! every row. No column is used twice.
//!
//! * [`HungarianSolver`] - exact minimum total cost, O(rows² × cols)
//! * [`GreedySolver`] - repeatedly takes the cheapest remaining (row, col)
//!   pair; much faster in practice, not optimal

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thiserror::Error;

/// Errors from assignment solvers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssignmentError {
    #[error("cannot assign {rows} rows to {cols} columns without reusing a column")]
    TooManyRows { rows: usize, cols: usize },
    #[error("cost at ({row}, {col}) is not finite")]
    NonFiniteCost { row: usize, col: usize },
    #[error("solver failed to complete the assignment for row {0}")]
    Incomplete(usize),
}

/// Solve a rectangular assignment problem
pub trait AssignmentSolver {
    /// Column index per row
    fn solve(&self, cost: ArrayView2<f64>) -> Result<Vec<usize>, AssignmentError>;
}

fn validate(cost: &ArrayView2<f64>) -> Result<(), AssignmentError> {
    let (rows, cols) = cost.dim();
    if rows > cols {
        return Err(AssignmentError::TooManyRows { rows, cols });
    }
    if let Some(((row, col), _)) = cost.indexed_iter().find(|(_, c)| !c.is_finite()) {
        return Err(AssignmentError::NonFiniteCost { row, col });
    }
    Ok(())
}

/// Exact solver using the Hungarian method with row/column potentials
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianSolver;

impl AssignmentSolver for HungarianSolver {
    fn solve(&self, cost: ArrayView2<f64>) -> Result<Vec<usize>, AssignmentError> {
        validate(&cost)?;
        let (n, m) = cost.dim();

        // 1-based potentials; index 0 is the virtual source column/row
        let mut u = vec![0.0; n + 1];
        let mut v = vec![0.0; m + 1];
        let mut owner = vec![0usize; m + 1];
        let mut way = vec![0usize; m + 1];

        for i in 1..=n {
            owner[0] = i;
            let mut j0 = 0;
            let mut min_v = vec![f64::INFINITY; m + 1];
            let mut used = vec![false; m + 1];

            loop {
                used[j0] = true;
                let i0 = owner[j0];
                let mut delta = f64::INFINITY;
                let mut j1 = 0;

                for j in 1..=m {
                    if used[j] {
                        continue;
                    }
                    let reduced = cost[[i0 - 1, j - 1]] - u[i0] - v[j];
                    if reduced < min_v[j] {
                        min_v[j] = reduced;
                        way[j] = j0;
                    }
                    if min_v[j] < delta {
                        delta = min_v[j];
                        j1 = j;
                    }
                }
                if j1 == 0 {
                    return Err(AssignmentError::Incomplete(i - 1));
                }

                for j in 0..=m {
                    if used[j] {
                        u[owner[j]] += delta;
                        v[j] -= delta;
                    } else {
                        min_v[j] -= delta;
                    }
                }

                j0 = j1;
                if owner[j0] == 0 {
                    break;
                }
            }

            // Flip the augmenting path
            loop {
                let j1 = way[j0];
                owner[j0] = owner[j1];
                j0 = j1;
                if j0 == 0 {
                    break;
                }
            }
        }

        let mut solution = vec![usize::MAX; n];
        for j in 1..=m {
            if owner[j] != 0 {
                solution[owner[j] - 1] = j - 1;
            }
        }
        if let Some(row) = solution.iter().position(|&c| c == usize::MAX) {
            return Err(AssignmentError::Incomplete(row));
        }
        Ok(solution)
    }
}

/// Greedy solver: cheapest remaining pair first
///
/// Row and column visiting order is shuffled with a seeded RNG so equal
/// costs do not systematically favour low indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySolver {
    pub seed: u64,
}

impl GreedySolver {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

/// Candidate pair ordered so that `BinaryHeap` pops the cheapest first
#[derive(Debug, PartialEq)]
struct Candidate {
    cost: f64,
    rank: usize,
    row: usize,
    col: usize,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.rank.cmp(&self.rank))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cheapest free column for `row`, scanning columns in `col_order`
fn best_free_column(
    cost: &ArrayView2<f64>,
    row: usize,
    col_order: &[usize],
    col_taken: &[bool],
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for &col in col_order {
        if col_taken[col] {
            continue;
        }
        let c = cost[[row, col]];
        if best.map_or(true, |(_, b)| c < b) {
            best = Some((col, c));
        }
    }
    best
}

impl AssignmentSolver for GreedySolver {
    fn solve(&self, cost: ArrayView2<f64>) -> Result<Vec<usize>, AssignmentError> {
        validate(&cost)?;
        let (n, m) = cost.dim();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut row_order: Vec<usize> = (0..n).collect();
        let mut col_order: Vec<usize> = (0..m).collect();
        row_order.shuffle(&mut rng);
        col_order.shuffle(&mut rng);

        let mut col_taken = vec![false; m];
        let mut heap = BinaryHeap::with_capacity(n);
        for (rank, &row) in row_order.iter().enumerate() {
            if let Some((col, c)) = best_free_column(&cost, row, &col_order, &col_taken) {
                heap.push(Candidate {
                    cost: c,
                    rank,
                    row,
                    col,
                });
            }
        }

        // Heap entries are lower bounds on each row's current best, so a
        // popped entry whose column is still free is the global minimum.
        let mut solution = vec![usize::MAX; n];
        while let Some(candidate) = heap.pop() {
            if !col_taken[candidate.col] {
                col_taken[candidate.col] = true;
                solution[candidate.row] = candidate.col;
                continue;
            }
            match best_free_column(&cost, candidate.row, &col_order, &col_taken) {
                Some((col, c)) => heap.push(Candidate {
                    cost: c,
                    col,
                    ..candidate
                }),
                None => return Err(AssignmentError::Incomplete(candidate.row)),
            }
        }

        if let Some(row) = solution.iter().position(|&c| c == usize::MAX) {
            return Err(AssignmentError::Incomplete(row));
        }
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};
    use rand::Rng;
    use std::collections::HashSet;

    fn total_cost(cost: ArrayView2<f64>, solution: &[usize]) -> f64 {
        solution
            .iter()
            .enumerate()
            .map(|(row, &col)| cost[[row, col]])
            .sum()
    }

    fn is_injective(solution: &[usize]) -> bool {
        solution.iter().collect::<HashSet<_>>().len() == solution.len()
    }

    /// Exhaustive minimum over all injections (small problems only)
    fn brute_force_min(cost: &Array2<f64>) -> f64 {
        fn recurse(cost: &Array2<f64>, row: usize, used: &mut Vec<bool>, acc: f64, best: &mut f64) {
            if row == cost.nrows() {
                *best = best.min(acc);
                return;
            }
            for col in 0..cost.ncols() {
                if !used[col] {
                    used[col] = true;
                    recurse(cost, row + 1, used, acc + cost[[row, col]], best);
                    used[col] = false;
                }
            }
        }
        let mut best = f64::INFINITY;
        recurse(cost, 0, &mut vec![false; cost.ncols()], 0.0, &mut best);
        best
    }

    #[test]
    fn test_hungarian_square() {
        let cost = array![[4.0, 1.0, 3.0], [2.0, 0.0, 5.0], [3.0, 2.0, 2.0]];
        let solution = HungarianSolver.solve(cost.view()).unwrap();

        assert_eq!(solution, vec![1, 0, 2]);
        assert_relative_eq!(total_cost(cost.view(), &solution), 5.0);
    }

    #[test]
    fn test_hungarian_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let rows = rng.gen_range(1..5);
            let cols = rng.gen_range(rows..7);
            let cost = Array2::from_shape_fn((rows, cols), |_| rng.gen_range(0.0..10.0));

            let solution = HungarianSolver.solve(cost.view()).unwrap();
            assert!(is_injective(&solution));
            assert_relative_eq!(
                total_cost(cost.view(), &solution),
                brute_force_min(&cost),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_greedy_takes_cheapest_first() {
        // Greedy picks (0,0)=1 then row 1 must take col 1 (cost 10);
        // the optimum would be (0,1)+(1,0) = 4.
        let cost = array![[1.0, 2.0], [2.0, 10.0]];
        let solution = GreedySolver::new(0).solve(cost.view()).unwrap();

        assert_eq!(solution, vec![0, 1]);
        let optimal = HungarianSolver.solve(cost.view()).unwrap();
        assert_eq!(optimal, vec![1, 0]);
    }

    #[test]
    fn test_greedy_is_injective_and_complete() {
        let mut rng = StdRng::seed_from_u64(5);
        let cost = Array2::from_shape_fn((40, 49), |_| rng.gen_range(0.0..1.0));
        let solution = GreedySolver::new(9).solve(cost.view()).unwrap();

        assert_eq!(solution.len(), 40);
        assert!(is_injective(&solution));
        assert!(solution.iter().all(|&c| c < 49));
    }

    #[test]
    fn test_greedy_ties_are_resolved_injectively() {
        let cost = Array2::<f64>::zeros((5, 6));
        let solution = GreedySolver::new(1).solve(cost.view()).unwrap();
        assert!(is_injective(&solution));
    }

    #[test]
    fn test_greedy_deterministic_for_seed() {
        let cost = Array2::<f64>::ones((6, 6));
        let a = GreedySolver::new(4).solve(cost.view()).unwrap();
        let b = GreedySolver::new(4).solve(cost.view()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_many_rows() {
        let cost = Array2::<f64>::zeros((3, 2));
        assert_eq!(
            HungarianSolver.solve(cost.view()).unwrap_err(),
            AssignmentError::TooManyRows { rows: 3, cols: 2 }
        );
        assert!(GreedySolver::default().solve(cost.view()).is_err());
    }

    #[test]
    fn test_non_finite_cost() {
        let cost = array![[0.0, f64::NAN]];
        assert_eq!(
            HungarianSolver.solve(cost.view()).unwrap_err(),
            AssignmentError::NonFiniteCost { row: 0, col: 1 }
        );
    }

    #[test]
    fn test_empty_problem() {
        let cost = Array2::<f64>::zeros((0, 4));
        assert!(HungarianSolver.solve(cost.view()).unwrap().is_empty());
        assert!(GreedySolver::default().solve(cost.view()).unwrap().is_empty());
    }
}
