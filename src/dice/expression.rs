//! Dice expressions used in weapon characteristics: `3`, `D3`, `2D6`, `D6+2`

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::digit1;
use nom::combinator::{all_consuming, map, map_res, opt};
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};

use crate::core::error::RulesError;

/// A characteristic that is either fixed or rolled
///
/// `sides == 0` means the expression is the constant `modifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DiceExprRepr", into = "String")]
pub struct DiceExpr {
    pub count: u8,
    pub sides: u8,
    pub modifier: u8,
}

impl DiceExpr {
    pub const fn fixed(value: u8) -> Self {
        Self { count: 0, sides: 0, modifier: value }
    }

    pub const fn dice(count: u8, sides: u8, modifier: u8) -> Self {
        Self { count, sides, modifier }
    }

    pub const D3: DiceExpr = DiceExpr::dice(1, 3, 0);
    pub const D6: DiceExpr = DiceExpr::dice(1, 6, 0);

    pub fn is_fixed(&self) -> bool {
        self.sides == 0 || self.count == 0
    }

    /// Expected value
    pub fn mean(&self) -> f64 {
        if self.is_fixed() {
            return self.modifier as f64;
        }
        self.count as f64 * (self.sides as f64 + 1.0) / 2.0 + self.modifier as f64
    }

    pub fn min(&self) -> u32 {
        if self.is_fixed() {
            self.modifier as u32
        } else {
            self.count as u32 + self.modifier as u32
        }
    }

    pub fn max(&self) -> u32 {
        if self.is_fixed() {
            self.modifier as u32
        } else {
            self.count as u32 * self.sides as u32 + self.modifier as u32
        }
    }

    pub fn parse(text: &str) -> Result<Self, RulesError> {
        let trimmed = text.trim();
        all_consuming(expression)
            .parse(trimmed)
            .map(|(_, expr)| expr)
            .map_err(|_| RulesError::DiceExpression(text.to_string()))
    }
}

impl std::fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_fixed() {
            return write!(f, "{}", self.modifier);
        }
        if self.count > 1 {
            write!(f, "{}", self.count)?;
        }
        write!(f, "D{}", self.sides)?;
        if self.modifier > 0 {
            write!(f, "+{}", self.modifier)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for DiceExpr {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpr::parse(s)
    }
}

impl From<DiceExpr> for String {
    fn from(expr: DiceExpr) -> Self {
        expr.to_string()
    }
}

/// Accepts either `"D6+1"` or a bare JSON number
#[derive(Deserialize)]
#[serde(untagged)]
enum DiceExprRepr {
    Number(u8),
    Text(String),
}

impl TryFrom<DiceExprRepr> for DiceExpr {
    type Error = RulesError;

    fn try_from(repr: DiceExprRepr) -> Result<Self, Self::Error> {
        match repr {
            DiceExprRepr::Number(n) => Ok(DiceExpr::fixed(n)),
            DiceExprRepr::Text(text) => DiceExpr::parse(&text),
        }
    }
}

fn number(input: &str) -> IResult<&str, u8> {
    map_res(digit1, |digits: &str| digits.parse::<u8>()).parse(input)
}

fn dice_term(input: &str) -> IResult<&str, (u8, u8)> {
    let (input, count) = opt(number).parse(input)?;
    let (input, _) = alt((tag("D"), tag("d"))).parse(input)?;
    let (input, sides) = number(input)?;
    Ok((input, (count.unwrap_or(1), sides)))
}

fn modifier(input: &str) -> IResult<&str, u8> {
    let (input, _) = tag("+").parse(input)?;
    number(input)
}

fn expression(input: &str) -> IResult<&str, DiceExpr> {
    alt((
        map((dice_term, opt(modifier)), |((count, sides), bonus)| {
            DiceExpr::dice(count, sides, bonus.unwrap_or(0))
        }),
        map(number, DiceExpr::fixed),
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(DiceExpr::parse("3").unwrap(), DiceExpr::fixed(3));
        assert_eq!(DiceExpr::parse("D3").unwrap(), DiceExpr::D3);
        assert_eq!(DiceExpr::parse("2D6").unwrap(), DiceExpr::dice(2, 6, 0));
        assert_eq!(DiceExpr::parse("d6+2").unwrap(), DiceExpr::dice(1, 6, 2));
        assert_eq!(DiceExpr::parse(" 2D3+1 ").unwrap(), DiceExpr::dice(2, 3, 1));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(DiceExpr::parse("").is_err());
        assert!(DiceExpr::parse("D").is_err());
        assert!(DiceExpr::parse("D6+").is_err());
        assert!(DiceExpr::parse("lots").is_err());
    }

    #[test]
    fn test_mean_and_bounds() {
        assert_eq!(DiceExpr::D6.mean(), 3.5);
        assert_eq!(DiceExpr::D3.mean(), 2.0);
        assert_eq!(DiceExpr::dice(2, 6, 1).mean(), 8.0);
        assert_eq!(DiceExpr::fixed(4).mean(), 4.0);
        assert_eq!(DiceExpr::dice(2, 3, 1).min(), 3);
        assert_eq!(DiceExpr::dice(2, 3, 1).max(), 7);
    }

    #[test]
    fn test_canonical_display() {
        assert_eq!(DiceExpr::parse("1d6+0").unwrap().to_string(), "D6");
        assert_eq!(DiceExpr::dice(2, 3, 1).to_string(), "2D3+1");
    }

    #[test]
    fn test_json_accepts_number_or_string() {
        let fixed: DiceExpr = serde_json::from_str("2").unwrap();
        assert_eq!(fixed, DiceExpr::fixed(2));
        let rolled: DiceExpr = serde_json::from_str("\"D6+1\"").unwrap();
        assert_eq!(rolled, DiceExpr::dice(1, 6, 1));
        assert_eq!(serde_json::to_string(&rolled).unwrap(), "\"D6+1\"");
    }
}
