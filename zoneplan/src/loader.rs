use crate::error::ParseError;
use crate::models::{Building, Problem};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Admit buildings with a negative weight.
    pub allow_negative_weights: bool,
}

/// Parses a payload consisting of a `n k` header line followed
/// by exactly `n` lines of `x y w`. Blank lines are skipped.
pub fn parse(input: &str) -> Result<Problem, ParseError> {
    parse_with(input, &ParseOptions::default())
}

pub fn parse_with(input: &str, opts: &ParseOptions) -> Result<Problem, ParseError> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (header_no, header) = lines
        .next()
        .ok_or_else(|| ParseError::new(1, "empty input, expected header `n k`"))?;

    let [count, required] = fields::<usize, 2>(header_no, header)?;
    if count == 0 {
        return Err(ParseError::new(header_no, "building count must be at least 1"));
    }
    if required == 0 {
        return Err(ParseError::new(header_no, "required coverage must be at least 1"));
    }
    if required > count {
        return Err(ParseError::new(
            header_no,
            format!("required coverage {required} exceeds building count {count}"),
        ));
    }

    let mut buildings = Vec::with_capacity(count);
    let mut last_no = header_no;
    for (no, line) in lines {
        if buildings.len() == count {
            return Err(ParseError::new(
                no,
                format!("unexpected line, header announced {count} buildings"),
            ));
        }

        let [x, y, weight] = fields::<f64, 3>(no, line)?;
        if !opts.allow_negative_weights && weight < 0.0 {
            return Err(ParseError::new(no, format!("negative weight {weight}")));
        }

        buildings.push(Building::new(x, y, weight));
        last_no = no;
    }

    if buildings.len() < count {
        return Err(ParseError::new(
            last_no,
            format!(
                "header announced {count} buildings but only {} were given",
                buildings.len()
            ),
        ));
    }

    Ok(Problem {
        buildings,
        required,
    })
}

fn fields<T: FromStr + Finite + Copy + Default, const N: usize>(
    no: usize,
    line: &str,
) -> Result<[T; N], ParseError> {
    let tokens: Vec<_> = line.split_whitespace().collect();
    if tokens.len() != N {
        return Err(ParseError::new(
            no,
            format!("expected {N} fields, found {}", tokens.len()),
        ));
    }

    let mut res = [T::default(); N];
    for (slot, token) in res.iter_mut().zip(tokens) {
        let v: T = token
            .parse()
            .map_err(|_| ParseError::new(no, format!("`{token}` is not a valid number")))?;
        if !v.is_finite() {
            return Err(ParseError::new(no, format!("`{token}` is not a finite number")));
        }
        *slot = v;
    }

    Ok(res)
}

trait Finite {
    fn is_finite(&self) -> bool;
}

impl Finite for f64 {
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl Finite for usize {
    fn is_finite(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let p = parse("3 2\n0 0 1\n10 0 1\n0 10 5\n").unwrap();
        assert_eq!(p.required, 2);
        assert_eq!(
            p.buildings,
            vec![
                Building::new(0.0, 0.0, 1.0),
                Building::new(10.0, 0.0, 1.0),
                Building::new(0.0, 10.0, 5.0),
            ]
        );
    }

    #[test]
    fn test_parse_skips_blank_lines_and_whitespace() {
        let p = parse("\n  2 1 \r\n\n-1.5\t2e1 0.25\n\n3 4 0\n\n").unwrap();
        assert_eq!(p.required, 1);
        assert_eq!(p.buildings[0], Building::new(-1.5, 20.0, 0.25));
        assert_eq!(p.buildings[1], Building::new(3.0, 4.0, 0.0));
    }

    #[test]
    fn test_parse_header_errors() {
        let err = parse("").unwrap_err();
        assert_eq!(err.line(), 1);

        let err = parse("3\n").unwrap_err();
        assert_eq!(err.line(), 1);
        assert_eq!(err.message(), "expected 2 fields, found 1");

        let err = parse("\n2 x\n0 0 1\n0 0 1").unwrap_err();
        assert_eq!(err.line(), 2);

        let err = parse("2 -1\n0 0 1\n0 0 1").unwrap_err();
        assert_eq!(err.line(), 1);

        assert!(parse("0 0\n").is_err());
        assert!(parse("1 0\n0 0 1").is_err());

        let err = parse("1 2\n0 0 1").unwrap_err();
        assert_eq!(err.message(), "required coverage 2 exceeds building count 1");
    }

    #[test]
    fn test_parse_building_errors() {
        let err = parse("2 1\n0 0 1\n0 0").unwrap_err();
        assert_eq!(err.line(), 3);

        let err = parse("2 1\n0 a 1\n0 0 1").unwrap_err();
        assert_eq!(err.line(), 2);
        assert_eq!(err.message(), "`a` is not a valid number");

        let err = parse("1 1\n0 NaN 1").unwrap_err();
        assert_eq!(err.message(), "`NaN` is not a finite number");

        let err = parse("1 1\ninf 0 1").unwrap_err();
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_parse_count_mismatch() {
        let err = parse("3 1\n0 0 1\n\n1 1 1\n").unwrap_err();
        assert_eq!(err.line(), 4);
        assert_eq!(
            err.message(),
            "header announced 3 buildings but only 2 were given"
        );

        let err = parse("1 1\n0 0 1\n1 1 1\n").unwrap_err();
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn test_parse_negative_weights() {
        let input = "2 1\n0 0 -1\n1 1 2";
        let err = parse(input).unwrap_err();
        assert_eq!(err.line(), 2);

        let p = parse_with(
            input,
            &ParseOptions {
                allow_negative_weights: true,
            },
        )
        .unwrap();
        assert_eq!(p.buildings[0].weight, -1.0);
    }
}
