//! Search for the cheapest rectangle covering at least `k` buildings.
//!
//! Every building is either left of, inside of or right of the x-range
//! of a rectangle, and either below, inside of or above its y-range.
//! The eight outside combinations are priced from tables indexed by
//! candidate boundaries, so the cost of any candidate rectangle is a
//! constant number of lookups plus running sums over the covered band.
//!
//! With the x-boundaries fixed, the y-boundaries are swept with a
//! two-pointer window when the policy's cost is monotone under growth,
//! giving O(n^3) overall. Policies without that property are searched
//! exhaustively at O(1) per rectangle.
//!
//! Table prices only filter candidates. Whenever a table price is within
//! rounding distance of a decision, the rectangle is evaluated directly,
//! and the winner is always ranked by its directly evaluated cost.

use crate::candidates::CandidateAxes;
use crate::coverage::{cmp_area, cmp_cost, evaluate, CostPolicy, Growth, Tolerance};
use crate::error::InvariantError;
use crate::models::{Building, OptimizationResult, Problem, Rectangle};
use log::debug;
use std::cmp::Ordering;

/// Finds the rectangle of minimal cost covering at least
/// `problem.required` buildings.
///
/// Ties in cost are broken by the smaller area, then by the
/// lexicographically smallest `(x1, y1, x2, y2)`.
pub fn optimize<P>(problem: &Problem, policy: &P) -> Result<OptimizationResult, InvariantError>
where
    P: CostPolicy + ?Sized,
{
    let required = problem.required;
    let invariant = || InvariantError::new(required, problem.buildings.len());

    let mut buildings = problem.buildings.clone();
    buildings.sort_by(Building::canonical_cmp);

    let axes = CandidateAxes::from_buildings(&buildings);
    let cells = buildings
        .iter()
        .map(|b| Some((axes.x_index(b.x)?, axes.y_index(b.y)?)))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invariant)?;

    let tables = Tables::build(&buildings, &cells, &axes, policy);
    let mut best = Best::new(&buildings, policy);

    let growth = policy.growth(&buildings);
    let target = match growth {
        // Nothing is cheaper than the rectangle enclosing everything.
        Growth::NeverIncreases => {
            let bounds = Rectangle::bounding(&buildings).ok_or_else(invariant)?;
            Some(evaluate(&bounds, &buildings, policy).cost)
        }
        _ => None,
    };

    debug!(
        "Searching {}x{} candidate boundaries for {} of {} buildings ({}, {:?}, slack {:e})",
        axes.xs.len(),
        axes.ys.len(),
        required,
        buildings.len(),
        policy.name(),
        growth,
        best.tol.slack()
    );

    let (mx, my) = (axes.xs.len(), axes.ys.len());
    let mut offered = 0usize;
    for ix1 in 0..mx {
        let mut band = BandRows::new(my);
        for ix2 in ix1..mx {
            band.add_column(&tables, ix2);
            if band.total < required {
                continue;
            }

            let sweep = Sweep {
                tables: &tables,
                axes: &axes,
                band: &band,
                policy,
                ix1,
                ix2,
            };

            match target {
                Some(target) => sweep.minimal_windows(|c| {
                    let feasible = c.covered >= required && best.reaches(&c, target);
                    if feasible {
                        offered += 1;
                        best.offer(c);
                    }
                    feasible
                }),
                None if growth == Growth::NeverDecreases => sweep.minimal_windows(|c| {
                    let feasible = c.covered >= required;
                    if feasible {
                        offered += 1;
                        best.offer(c);
                    }
                    feasible
                }),
                None => sweep.all_windows(required, |c| {
                    offered += 1;
                    best.offer(c);
                }),
            }
        }
    }

    let evaluated = best.evaluated;
    let winner = best.into_inner().ok_or_else(invariant)?;
    debug!(
        "Offered {offered} feasible rectangles, evaluated {evaluated}, best {:?} at {}",
        winner.rect, winner.cost
    );

    let coverage = evaluate(&winner.rect, &buildings, policy);
    if coverage.covered < required {
        return Err(invariant());
    }

    Ok(OptimizationResult {
        cost: coverage.cost,
        rectangle: winner.rect,
        covered: coverage.covered,
    })
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    rect: Rectangle,
    cost: f64,
    covered: usize,
}

/// Keeps the best candidate seen so far, holding its directly
/// evaluated cost.
struct Best<'a, P: ?Sized> {
    buildings: &'a [Building],
    policy: &'a P,
    tol: Tolerance,
    current: Option<Candidate>,
    evaluated: usize,
}

impl<'a, P> Best<'a, P>
where
    P: CostPolicy + ?Sized,
{
    fn new(buildings: &'a [Building], policy: &'a P) -> Self {
        Self {
            buildings,
            policy,
            tol: Tolerance::for_buildings(buildings),
            current: None,
            evaluated: 0,
        }
    }

    fn exact(&mut self, rect: &Rectangle) -> f64 {
        self.evaluated += 1;
        evaluate(rect, self.buildings, self.policy).cost
    }

    /// Whether the rectangle of `c` costs no more than `target`.
    fn reaches(&mut self, c: &Candidate, target: f64) -> bool {
        let ord = match self.tol.settle(c.cost, target) {
            Some(ord) => ord,
            None => cmp_cost(self.exact(&c.rect), target),
        };
        ord != Ordering::Greater
    }

    fn offer(&mut self, c: Candidate) {
        if let Some(cur) = &self.current {
            match self.tol.settle(c.cost, cur.cost) {
                Some(Ordering::Greater) => return,
                Some(Ordering::Equal) if tie_break(&c.rect, &cur.rect) != Ordering::Less => return,
                _ => {}
            }
        }

        let c = Candidate {
            cost: self.exact(&c.rect),
            ..c
        };
        let replace = match &self.current {
            None => true,
            Some(cur) => {
                cmp_cost(c.cost, cur.cost).then_with(|| tie_break(&c.rect, &cur.rect))
                    == Ordering::Less
            }
        };
        if replace {
            self.current = Some(c);
        }
    }

    fn into_inner(self) -> Option<Candidate> {
        self.current
    }
}

/// Smaller area first, then the lexicographically smallest corners.
fn tie_break(a: &Rectangle, b: &Rectangle) -> Ordering {
    cmp_area(a.area(), b.area()).then_with(|| a.lex_cmp(b))
}

/// A dense `mx * my` table indexed by candidate boundary indices.
struct Grid<T> {
    my: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    fn new(mx: usize, my: usize) -> Self {
        Self {
            my,
            data: vec![T::default(); mx * my],
        }
    }

    fn get(&self, ix: usize, iy: usize) -> T {
        self.data[ix * self.my + iy]
    }

    fn at(&mut self, ix: usize, iy: usize) -> &mut T {
        &mut self.data[ix * self.my + iy]
    }
}

/// Precomputed cost of buildings relative to a boundary pair
/// `(xs[ix], ys[iy])`. "left" means the building's x is below `xs[ix]`,
/// "below" means its y is below `ys[iy]`; rows and columns hold the
/// buildings sharing the boundary's y or x exactly.
struct Tables {
    below_left: Grid<f64>,
    above_left: Grid<f64>,
    below_right: Grid<f64>,
    above_right: Grid<f64>,
    row_left: Grid<f64>,
    row_right: Grid<f64>,
    col_below: Grid<f64>,
    col_above: Grid<f64>,
    cell_count: Grid<usize>,
    cell_cost: Grid<f64>,
}

impl Tables {
    fn build<P>(
        buildings: &[Building],
        cells: &[(usize, usize)],
        axes: &CandidateAxes,
        policy: &P,
    ) -> Self
    where
        P: CostPolicy + ?Sized,
    {
        let (mx, my) = (axes.xs.len(), axes.ys.len());
        let mut t = Self {
            below_left: Grid::new(mx, my),
            above_left: Grid::new(mx, my),
            below_right: Grid::new(mx, my),
            above_right: Grid::new(mx, my),
            row_left: Grid::new(mx, my),
            row_right: Grid::new(mx, my),
            col_below: Grid::new(mx, my),
            col_above: Grid::new(mx, my),
            cell_count: Grid::new(mx, my),
            cell_cost: Grid::new(mx, my),
        };

        for (b, &(bx, by)) in buildings.iter().zip(cells) {
            *t.cell_count.at(bx, by) += 1;
            *t.cell_cost.at(bx, by) += policy.covered_cost(b);

            for (ix, &x) in axes.xs.iter().enumerate() {
                let gap_x = (x - b.x).abs();
                for (iy, &y) in axes.ys.iter().enumerate() {
                    let gap_y = (y - b.y).abs();
                    let table = match (bx.cmp(&ix), by.cmp(&iy)) {
                        (Ordering::Less, Ordering::Less) => &mut t.below_left,
                        (Ordering::Less, Ordering::Greater) => &mut t.above_left,
                        (Ordering::Less, Ordering::Equal) => &mut t.row_left,
                        (Ordering::Greater, Ordering::Less) => &mut t.below_right,
                        (Ordering::Greater, Ordering::Greater) => &mut t.above_right,
                        (Ordering::Greater, Ordering::Equal) => &mut t.row_right,
                        (Ordering::Equal, Ordering::Less) => &mut t.col_below,
                        (Ordering::Equal, Ordering::Greater) => &mut t.col_above,
                        (Ordering::Equal, Ordering::Equal) => continue,
                    };
                    *table.at(ix, iy) += policy.excluded_cost(b, gap_x, gap_y);
                }
            }
        }

        t
    }
}

/// Per row sums over the columns `ix1..=ix2` of the current x-pair.
struct BandRows {
    below: Vec<f64>,
    above: Vec<f64>,
    count: Vec<usize>,
    cost: Vec<f64>,
    total: usize,
}

impl BandRows {
    fn new(my: usize) -> Self {
        Self {
            below: vec![0.0; my],
            above: vec![0.0; my],
            count: vec![0; my],
            cost: vec![0.0; my],
            total: 0,
        }
    }

    fn add_column(&mut self, t: &Tables, ix: usize) {
        for iy in 0..self.count.len() {
            self.below[iy] += t.col_below.get(ix, iy);
            self.above[iy] += t.col_above.get(ix, iy);
            self.count[iy] += t.cell_count.get(ix, iy);
            self.cost[iy] += t.cell_cost.get(ix, iy);
            self.total += t.cell_count.get(ix, iy);
        }
    }
}

/// Running sums over the rows between the two y-boundaries.
#[derive(Default)]
struct Window {
    covered: usize,
    cost: f64,
}

struct Sweep<'a, P: ?Sized> {
    tables: &'a Tables,
    axes: &'a CandidateAxes,
    band: &'a BandRows,
    policy: &'a P,
    ix1: usize,
    ix2: usize,
}

impl<P> Sweep<'_, P>
where
    P: CostPolicy + ?Sized,
{
    fn push(&self, w: &mut Window, iy: usize) {
        w.covered += self.band.count[iy];
        w.cost += self.row_cost(iy);
    }

    fn pop(&self, w: &mut Window, iy: usize) {
        w.covered -= self.band.count[iy];
        w.cost -= self.row_cost(iy);
    }

    fn row_cost(&self, iy: usize) -> f64 {
        self.band.cost[iy]
            + self.tables.row_left.get(self.ix1, iy)
            + self.tables.row_right.get(self.ix2, iy)
    }

    fn candidate(&self, w: &Window, iy1: usize, iy2: usize) -> Candidate {
        let t = self.tables;
        let rect = Rectangle {
            x1: self.axes.xs[self.ix1],
            y1: self.axes.ys[iy1],
            x2: self.axes.xs[self.ix2],
            y2: self.axes.ys[iy2],
        };
        let outside = t.below_left.get(self.ix1, iy1)
            + t.above_left.get(self.ix1, iy2)
            + t.below_right.get(self.ix2, iy1)
            + t.above_right.get(self.ix2, iy2)
            + self.band.below[iy1]
            + self.band.above[iy2];

        Candidate {
            rect,
            cost: self.policy.frame_cost(&rect) + outside + w.cost,
            covered: w.covered,
        }
    }

    /// Hands `take` the window of every bottom boundary, growing the top
    /// boundary until `take` accepts it. Acceptance must be preserved when
    /// the window grows.
    fn minimal_windows<F>(&self, mut take: F)
    where
        F: FnMut(Candidate) -> bool,
    {
        let my = self.axes.ys.len();
        let mut w = Window::default();
        // rows iy1..hi are inside the window
        let mut hi = 0;

        for iy1 in 0..my {
            if hi == iy1 {
                self.push(&mut w, hi);
                hi += 1;
            }
            loop {
                if take(self.candidate(&w, iy1, hi - 1)) {
                    break;
                }
                if hi == my {
                    return;
                }
                self.push(&mut w, hi);
                hi += 1;
            }
            self.pop(&mut w, iy1);
        }
    }

    fn all_windows<O>(&self, required: usize, mut offer: O)
    where
        O: FnMut(Candidate),
    {
        let my = self.axes.ys.len();
        for iy1 in 0..my {
            let mut w = Window::default();
            for iy2 in iy1..my {
                self.push(&mut w, iy2);
                if w.covered >= required {
                    offer(self.candidate(&w, iy1, iy2));
                }
            }
        }
    }
}

/// Reference search evaluating every candidate rectangle directly and
/// ranking them by exact cost, then area, then corners.
#[cfg(test)]
pub(crate) fn brute_force<P>(problem: &Problem, policy: &P) -> Option<OptimizationResult>
where
    P: CostPolicy + ?Sized,
{
    let b = &problem.buildings;
    let axes = CandidateAxes::from_buildings(b);
    let mut best: Option<OptimizationResult> = None;

    for (i, &x1) in axes.xs.iter().enumerate() {
        for &x2 in &axes.xs[i..] {
            for (j, &y1) in axes.ys.iter().enumerate() {
                for &y2 in &axes.ys[j..] {
                    let rect = Rectangle { x1, y1, x2, y2 };
                    let cov = evaluate(&rect, b, policy);
                    if cov.covered < problem.required {
                        continue;
                    }
                    let better = best.as_ref().map_or(true, |cur| {
                        cov.cost
                            .total_cmp(&cur.cost)
                            .then_with(|| rect.area().total_cmp(&cur.rectangle.area()))
                            .then_with(|| rect.lex_cmp(&cur.rectangle))
                            == Ordering::Less
                    });
                    if better {
                        best = Some(OptimizationResult {
                            cost: cov.cost,
                            rectangle: rect,
                            covered: cov.covered,
                        });
                    }
                }
            }
        }
    }

    best
}
