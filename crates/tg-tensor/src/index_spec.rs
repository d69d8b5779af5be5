//! Axis specifications for [`GriddedTensor::rearrange_and_copy`].
//!
//! Each entry says what happens to one (or, for a trace, two) source axes.
//! The text form used by [`Display`](std::fmt::Display) and
//! [`FromStr`](std::str::FromStr) is
//!
//! ```text
//! index(a)  reverse(a)  range(a,begin,end)  trace(a,b)  sum(a)
//! fixed(a,i)  interp(a,value)  grid(a,begin,end,width)  gridlog(a,begin,end,ratio)
//! ```
//!
//! [`GriddedTensor::rearrange_and_copy`]: crate::GriddedTensor::rearrange_and_copy

use std::{fmt, str::FromStr};

use tg_core::{
    errors::{Error, Result},
    Real,
};

/// What to do with one source axis during a rearrangement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexSpec {
    /// Keep the axis as the next output axis.
    Index(usize),
    /// Keep the axis, reversed.
    Reverse(usize),
    /// Keep the inclusive sub-range `begin..=end`, reversed if `begin > end`.
    Range {
        /// Source axis.
        axis: usize,
        /// First kept index.
        begin: usize,
        /// Last kept index.
        end: usize,
    },
    /// Sum along the diagonal of two axes, over the smaller extent.
    Trace(usize, usize),
    /// Sum the axis away.
    Sum(usize),
    /// Hold the axis at a discrete index.
    Fixed {
        /// Source axis.
        axis: usize,
        /// Index held.
        index: usize,
    },
    /// Hold the axis at a coordinate, by linear interpolation.
    Interp {
        /// Source axis.
        axis: usize,
        /// Coordinate interpolated to.
        value: Real,
    },
    /// Resample the axis onto a new grid, which becomes the next output axis.
    ///
    /// The grid runs from `begin` in steps of `width` (or by factors of
    /// `width` when `log` is set) without passing `end`.
    Grid {
        /// Source axis.
        axis: usize,
        /// First coordinate.
        begin: Real,
        /// Bound on the last coordinate.
        end: Real,
        /// Step, or ratio for a logarithmic grid.
        width: Real,
        /// Geometric spacing.
        log: bool,
    },
}

impl IndexSpec {
    /// Keep `axis`.
    pub fn index(axis: usize) -> Self {
        IndexSpec::Index(axis)
    }

    /// Keep `axis` reversed.
    pub fn reverse(axis: usize) -> Self {
        IndexSpec::Reverse(axis)
    }

    /// Keep `begin..=end` of `axis`.
    pub fn range(axis: usize, begin: usize, end: usize) -> Self {
        IndexSpec::Range { axis, begin, end }
    }

    /// Trace over axes `a` and `b`.
    pub fn trace(a: usize, b: usize) -> Self {
        IndexSpec::Trace(a, b)
    }

    /// Sum over `axis`.
    pub fn sum(axis: usize) -> Self {
        IndexSpec::Sum(axis)
    }

    /// Hold `axis` at `index`.
    pub fn fixed(axis: usize, index: usize) -> Self {
        IndexSpec::Fixed { axis, index }
    }

    /// Interpolate `axis` at `value`.
    pub fn interp(axis: usize, value: Real) -> Self {
        IndexSpec::Interp { axis, value }
    }

    /// Resample `axis` onto `begin, begin + width, …` up to `end`.
    pub fn grid(axis: usize, begin: Real, end: Real, width: Real) -> Self {
        IndexSpec::Grid {
            axis,
            begin,
            end,
            width,
            log: false,
        }
    }

    /// Resample `axis` onto `begin, begin·ratio, …` up to `end`.
    pub fn grid_log(axis: usize, begin: Real, end: Real, ratio: Real) -> Self {
        IndexSpec::Grid {
            axis,
            begin,
            end,
            width: ratio,
            log: true,
        }
    }

    /// Source axes this entry covers (the second only for a trace).
    pub fn source_axes(&self) -> (usize, Option<usize>) {
        match *self {
            IndexSpec::Index(a) | IndexSpec::Reverse(a) | IndexSpec::Sum(a) => (a, None),
            IndexSpec::Trace(a, b) => (a, Some(b)),
            IndexSpec::Range { axis, .. }
            | IndexSpec::Fixed { axis, .. }
            | IndexSpec::Interp { axis, .. }
            | IndexSpec::Grid { axis, .. } => (axis, None),
        }
    }

    /// `true` if the entry produces an output axis.
    pub fn is_output_axis(&self) -> bool {
        matches!(
            self,
            IndexSpec::Index(_)
                | IndexSpec::Reverse(_)
                | IndexSpec::Range { .. }
                | IndexSpec::Grid { .. }
        )
    }

    /// Parse a whitespace, comma or semicolon separated list such as
    /// `"index(1) sum(0); range(2,3,1)"`.
    pub fn parse_list(text: &str) -> Result<Vec<IndexSpec>> {
        let mut out = Vec::new();
        let mut rest = text;
        loop {
            rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == ';');
            if rest.is_empty() {
                return Ok(out);
            }
            let close = rest.find(')').ok_or_else(|| {
                Error::Parse(format!("missing ')' in index specification '{rest}'"))
            })?;
            out.push(rest[..=close].parse()?);
            rest = &rest[close + 1..];
        }
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            IndexSpec::Index(a) => write!(f, "index({a})"),
            IndexSpec::Reverse(a) => write!(f, "reverse({a})"),
            IndexSpec::Range { axis, begin, end } => write!(f, "range({axis},{begin},{end})"),
            IndexSpec::Trace(a, b) => write!(f, "trace({a},{b})"),
            IndexSpec::Sum(a) => write!(f, "sum({a})"),
            IndexSpec::Fixed { axis, index } => write!(f, "fixed({axis},{index})"),
            IndexSpec::Interp { axis, value } => write!(f, "interp({axis},{value})"),
            IndexSpec::Grid {
                axis,
                begin,
                end,
                width,
                log,
            } => {
                let name = if log { "gridlog" } else { "grid" };
                write!(f, "{name}({axis},{begin},{end},{width})")
            }
        }
    }
}

fn parse_usize(name: &str, s: &str) -> Result<usize> {
    s.parse()
        .map_err(|_| Error::Parse(format!("'{s}' is not an index in {name}()")))
}

fn parse_real(name: &str, s: &str) -> Result<Real> {
    s.parse()
        .map_err(|_| Error::Parse(format!("'{s}' is not a number in {name}()")))
}

impl FromStr for IndexSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, args) = s
            .strip_suffix(')')
            .and_then(|body| body.split_once('('))
            .ok_or_else(|| Error::Parse(format!("expected name(args), got '{s}'")))?;
        let name = name.trim();
        let args: Vec<&str> = args.split(',').map(str::trim).collect();
        let want = match name {
            "index" | "reverse" | "sum" => 1,
            "trace" | "fixed" | "interp" => 2,
            "range" => 3,
            "grid" | "gridlog" => 4,
            _ => {
                return Err(Error::Parse(format!(
                    "unknown index specification '{name}'"
                )))
            }
        };
        if args.len() != want {
            return Err(Error::Parse(format!(
                "{name}() takes {want} argument(s), got {}",
                args.len()
            )));
        }
        let axis = parse_usize(name, args[0])?;
        Ok(match name {
            "index" => IndexSpec::Index(axis),
            "reverse" => IndexSpec::Reverse(axis),
            "sum" => IndexSpec::Sum(axis),
            "trace" => IndexSpec::Trace(axis, parse_usize(name, args[1])?),
            "fixed" => IndexSpec::fixed(axis, parse_usize(name, args[1])?),
            "interp" => IndexSpec::interp(axis, parse_real(name, args[1])?),
            "range" => IndexSpec::range(
                axis,
                parse_usize(name, args[1])?,
                parse_usize(name, args[2])?,
            ),
            _ => IndexSpec::Grid {
                axis,
                begin: parse_real(name, args[1])?,
                end: parse_real(name, args[2])?,
                width: parse_real(name, args[3])?,
                log: name == "gridlog",
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_each_form() {
        assert_eq!("index(1)".parse::<IndexSpec>().unwrap(), IndexSpec::index(1));
        assert_eq!(" reverse( 0 ) ".parse::<IndexSpec>().unwrap(), IndexSpec::reverse(0));
        assert_eq!(
            "range(0,3,1)".parse::<IndexSpec>().unwrap(),
            IndexSpec::range(0, 3, 1)
        );
        assert_eq!("trace(0, 2)".parse::<IndexSpec>().unwrap(), IndexSpec::trace(0, 2));
        assert_eq!("sum(2)".parse::<IndexSpec>().unwrap(), IndexSpec::sum(2));
        assert_eq!("fixed(1,3)".parse::<IndexSpec>().unwrap(), IndexSpec::fixed(1, 3));
        assert_eq!(
            "interp(1,0.5)".parse::<IndexSpec>().unwrap(),
            IndexSpec::interp(1, 0.5)
        );
        assert_eq!(
            "grid(1,0,1,0.1)".parse::<IndexSpec>().unwrap(),
            IndexSpec::grid(1, 0.0, 1.0, 0.1)
        );
        assert_eq!(
            "gridlog(1,1,100,2)".parse::<IndexSpec>().unwrap(),
            IndexSpec::grid_log(1, 1.0, 100.0, 2.0)
        );
    }

    #[test]
    fn display_parses_back() {
        for spec in [
            IndexSpec::range(2, 4, 0),
            IndexSpec::interp(0, -1.25),
            IndexSpec::grid_log(3, 0.5, 8.0, 2.0),
            IndexSpec::trace(1, 0),
        ] {
            assert_eq!(spec.to_string().parse::<IndexSpec>().unwrap(), spec);
        }
        assert_eq!(IndexSpec::grid(0, 0.0, 1.0, 0.5).to_string(), "grid(0,0,1,0.5)");
    }

    #[test]
    fn malformed() {
        for bad in ["index", "index(a)", "sum(1,2)", "foo(1)", "range(1,2)", "interp(0,x)"] {
            assert!(matches!(bad.parse::<IndexSpec>(), Err(Error::Parse(_))), "{bad}");
        }
    }

    #[test]
    fn parse_list_of_specs() {
        let specs = IndexSpec::parse_list("index(1) sum(0); range(2, 3, 1),").unwrap();
        assert_eq!(
            specs,
            vec![IndexSpec::index(1), IndexSpec::sum(0), IndexSpec::range(2, 3, 1)]
        );
        assert!(IndexSpec::parse_list("index(1) sum(0").is_err());
        assert!(IndexSpec::parse_list("  ").unwrap().is_empty());
    }

    #[test]
    fn axes_and_kinds() {
        assert_eq!(IndexSpec::trace(3, 1).source_axes(), (3, Some(1)));
        assert_eq!(IndexSpec::interp(2, 0.0).source_axes(), (2, None));
        assert!(IndexSpec::grid(0, 0.0, 1.0, 0.1).is_output_axis());
        assert!(!IndexSpec::fixed(0, 0).is_output_axis());
    }
}
