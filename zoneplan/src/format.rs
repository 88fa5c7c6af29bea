use crate::models::OptimizationResult;
use std::fmt::Write;

/// Renders the result as the cost line followed by the
/// `x1 y1 x2 y2` line.
pub fn render(res: &OptimizationResult) -> String {
    let r = &res.rectangle;
    let mut out = String::new();
    // Writing into a String never fails.
    let _ = writeln!(out, "{:.6}", unsigned_zero(res.cost));
    let _ = writeln!(
        out,
        "{} {} {} {}",
        unsigned_zero(r.x1),
        unsigned_zero(r.y1),
        unsigned_zero(r.x2),
        unsigned_zero(r.y2)
    );
    out
}

fn unsigned_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rectangle;

    #[test]
    fn test_render() {
        let res = OptimizationResult {
            cost: 12.3456789,
            rectangle: Rectangle::new(-1.5, 0.1, 20.0, 3e-7),
            covered: 2,
        };
        assert_eq!(render(&res), "12.345679\n-1.5 0.0000003 20 0.1\n");
    }

    #[test]
    fn test_render_negative_zero() {
        let res = OptimizationResult {
            cost: -0.0,
            rectangle: Rectangle::new(-0.0, 0.0, -0.0, 4.0),
            covered: 1,
        };
        assert_eq!(render(&res), "0.000000\n0 0 0 4\n");
    }

    #[test]
    fn test_render_round_trips_coordinates() {
        let x = 0.1 + 0.2;
        let res = OptimizationResult {
            cost: 0.0,
            rectangle: Rectangle::new(x, x, x, x),
            covered: 1,
        };
        let out = render(&res);
        let second = out.lines().nth(1).unwrap();
        for token in second.split(' ') {
            assert_eq!(token.parse::<f64>().unwrap(), x);
        }
    }
}
